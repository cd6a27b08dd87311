use delve_common::{PlayerId, RecordId, RoomId, SavedGameId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// A saved game: where a player stands and the packed command log that
/// replays the run from the room start. `commands` uses the encoding in
/// [`crate::commands`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub id: SavedGameId,
    pub player_id: PlayerId,
    pub room_id: RoomId,
    pub checkpoint_x: u32,
    pub checkpoint_y: u32,
    pub explored_rooms: Vec<RoomId>,
    pub conquered_rooms: Vec<RoomId>,
    pub commands: Vec<u8>,
}

impl Record for SavedGame {
    const SPEC: TableSpec = TableSpec {
        name: "SavedGames",
        columns: &[
            "SavedGameID",
            "PlayerID",
            "RoomID",
            "CheckpointX",
            "CheckpointY",
            "ExploredRooms",
            "ConqueredRooms",
            "Commands",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
