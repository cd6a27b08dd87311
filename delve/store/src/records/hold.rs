use delve_common::{HoldId, LevelId, MessageId, PlayerId, RecordId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// Who may edit a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditAccess {
    OwnerOnly,
    Conquerors,
    Anyone,
}

impl Default for EditAccess {
    fn default() -> Self {
        EditAccess::OwnerOnly
    }
}

/// A hold: a named set of levels authored by one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub id: HoldId,
    pub name_mid: MessageId,
    pub description_mid: MessageId,
    /// Entrance level, absent while the hold is still empty.
    pub first_level_id: Option<LevelId>,
    pub owner_player_id: PlayerId,
    pub edit_access: EditAccess,
}

impl Record for Hold {
    const SPEC: TableSpec = TableSpec {
        name: "Holds",
        columns: &[
            "HoldID",
            "NameMessageID",
            "DescriptionMessageID",
            "FirstLevelID",
            "OwnerPlayerID",
            "EditAccess",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
