use delve_common::{DemoId, MessageId, RecordId, SavedGameId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// A demo: a replayable slice of a saved game's command log. Multi-room
/// demos chain through `next_demo_id`. `checksum` is the CRC32 of the
/// referenced saved game's packed command buffer, used to detect drift
/// between a demo and the log it replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demo {
    pub id: DemoId,
    pub saved_game_id: SavedGameId,
    pub description_mid: MessageId,
    pub begin_turn: u32,
    pub end_turn: u32,
    pub next_demo_id: Option<DemoId>,
    pub checksum: u32,
}

impl Record for Demo {
    const SPEC: TableSpec = TableSpec {
        name: "Demos",
        columns: &[
            "DemoID",
            "SavedGameID",
            "DescriptionMessageID",
            "BeginTurn",
            "EndTurn",
            "NextDemoID",
            "Checksum",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
