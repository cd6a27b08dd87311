use chrono::Utc;
use delve_common::{MessageId, PlayerId, RecordId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// A player profile. `original_name_mid` keeps the name the profile was
/// imported with so later renames stay distinguishable; profiles created
/// fresh start without one and are backfilled on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Whether this profile belongs to this installation, as opposed to a
    /// profile embedded in someone else's exported data.
    pub is_local: bool,
    pub name_mid: MessageId,
    pub email_mid: MessageId,
    pub original_name_mid: Option<MessageId>,
    /// Unix seconds.
    pub created: i64,
    pub last_updated: i64,
    pub settings: Vec<u8>,
}

impl Player {
    /// A fresh local profile stamped with the current time.
    pub fn new(id: PlayerId, name_mid: MessageId, email_mid: MessageId) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id,
            is_local: true,
            name_mid,
            email_mid,
            original_name_mid: None,
            created: now,
            last_updated: now,
            settings: Vec::new(),
        }
    }

    /// Marks the profile as modified now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now().timestamp();
    }
}

impl Record for Player {
    const SPEC: TableSpec = TableSpec {
        name: "Players",
        columns: &[
            "PlayerID",
            "IsLocal",
            "NameMessageID",
            "EMailMessageID",
            "OriginalNameMessageID",
            "Created",
            "LastUpdated",
            "Settings",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
