use delve_common::{LevelId, MessageId, Orientation, RecordId, RoomId};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::schema::TableSpec;

/// What an orb strike does to the door squares an agent covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbAgentAction {
    Toggle,
    Open,
    Close,
}

/// One door square controlled by an orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbAgent {
    pub action: OrbAgentAction,
    pub x: u32,
    pub y: u32,
}

/// An orb placed in a room, with the door squares it controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orb {
    pub x: u32,
    pub y: u32,
    pub agents: Vec<OrbAgent>,
}

/// Monster roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Roach,
    RoachQueen,
    RoachEgg,
    Goblin,
    Neather,
    WraithWing,
    Eye,
    Serpent,
    TarMother,
    TarBaby,
    Brain,
    Mimic,
    Spider,
}

/// A monster placed in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterKind,
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

/// A scroll square and the message it shows when stepped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scroll {
    pub x: u32,
    pub y: u32,
    pub text_mid: MessageId,
}

/// A staircase rectangle and the level it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub level_id: LevelId,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// A room: a fixed-size square grid with two tile layers and the pieces
/// placed on it. `squares` holds the opaque layer followed by the
/// transparent layer, `width * height` bytes each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub level_id: LevelId,
    /// Position of this room on the level grid.
    pub room_x: u32,
    pub room_y: u32,
    pub width: u32,
    pub height: u32,
    pub style_id: u32,
    pub squares: Vec<u8>,
    pub orbs: Vec<Orb>,
    pub monsters: Vec<Monster>,
    pub scrolls: Vec<Scroll>,
    pub exits: Vec<Exit>,
}

impl Room {
    /// Expected length of `squares` for this room's dimensions.
    pub fn square_count(&self) -> usize {
        2 * self.width as usize * self.height as usize
    }
}

impl Record for Room {
    const SPEC: TableSpec = TableSpec {
        name: "Rooms",
        columns: &[
            "RoomID",
            "LevelID",
            "RoomX",
            "RoomY",
            "Width",
            "Height",
            "StyleID",
            "Squares",
            "Orbs",
            "Monsters",
            "Scrolls",
            "Exits",
        ],
    };

    fn id(&self) -> RecordId {
        self.id
    }
}
