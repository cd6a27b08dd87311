use delve_common::{HoldId, LevelId, MessageId, Orientation, PlayerId, RecordId, RoomId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// A level: one floor of a hold, entered at a fixed square of its entrance
/// room. Rooms reference their level; the entrance room is addressed by its
/// grid coordinates rather than by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub hold_id: HoldId,
    pub owner_player_id: PlayerId,
    pub name_mid: MessageId,
    pub description_mid: MessageId,
    /// Grid coordinates of the entrance room.
    pub room_x: u32,
    pub room_y: u32,
    /// Entrance square and facing inside that room.
    pub entry_x: u32,
    pub entry_y: u32,
    pub entry_orientation: Orientation,
    /// Rooms that must be conquered before the level exit opens.
    pub required_rooms: Vec<RoomId>,
}

impl Record for Level {
    const SPEC: TableSpec = TableSpec {
        name: "Levels",
        columns: &[
            "LevelID",
            "HoldID",
            "OwnerPlayerID",
            "NameMessageID",
            "DescriptionMessageID",
            "RoomX",
            "RoomY",
            "EntryX",
            "EntryY",
            "EntryOrientation",
            "RequiredRooms",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
