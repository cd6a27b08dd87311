//! Record identifiers and the routing enums that tie every entity kind to
//! the collection file it lives in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of any stored record. Id `0` is never allocated; it is the
/// placeholder player id in legacy archives and the "absent" value in a few
/// optional references that predate `Option`.
pub type RecordId = u32;

pub type HoldId = RecordId;
pub type LevelId = RecordId;
pub type RoomId = RecordId;
pub type SavedGameId = RecordId;
pub type DemoId = RecordId;
pub type PlayerId = RecordId;
pub type MessageId = RecordId;
pub type MessageTextId = RecordId;

/// Every kind of record the store manages, including the two message kinds
/// that only exist as counter targets and text rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hold,
    Level,
    Room,
    SavedGame,
    Demo,
    Player,
    Message,
    MessageText,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Hold,
        EntityKind::Level,
        EntityKind::Room,
        EntityKind::SavedGame,
        EntityKind::Demo,
        EntityKind::Player,
        EntityKind::Message,
        EntityKind::MessageText,
    ];

    /// The collection file whose counter row issues ids for this kind.
    pub fn collection(self) -> CollectionKind {
        match self {
            EntityKind::Hold
            | EntityKind::Level
            | EntityKind::Room
            | EntityKind::SavedGame
            | EntityKind::Demo => CollectionKind::Hold,
            EntityKind::Player => CollectionKind::Player,
            EntityKind::Message | EntityKind::MessageText => CollectionKind::Text,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Hold => "hold",
            EntityKind::Level => "level",
            EntityKind::Room => "room",
            EntityKind::SavedGame => "saved game",
            EntityKind::Demo => "demo",
            EntityKind::Player => "player",
            EntityKind::Message => "message",
            EntityKind::MessageText => "message text",
        };
        f.write_str(name)
    }
}

/// The three collection files backing a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Hold,
    Player,
    Text,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] =
        [CollectionKind::Hold, CollectionKind::Player, CollectionKind::Text];

    pub fn file_name(self) -> &'static str {
        match self {
            CollectionKind::Hold => "hold.dat",
            CollectionKind::Player => "player.dat",
            CollectionKind::Text => "text.dat",
        }
    }

    /// Byte tag written into the file header.
    pub fn as_u8(self) -> u8 {
        match self {
            CollectionKind::Hold => 0,
            CollectionKind::Player => 1,
            CollectionKind::Text => 2,
        }
    }

    pub fn from_u8(tag: u8) -> Option<CollectionKind> {
        match tag {
            0 => Some(CollectionKind::Hold),
            1 => Some(CollectionKind::Player),
            2 => Some(CollectionKind::Text),
            _ => None,
        }
    }

    /// The entity kinds whose counters this collection's counter row owns.
    pub fn counter_kinds(self) -> &'static [EntityKind] {
        match self {
            CollectionKind::Hold => &[
                EntityKind::Hold,
                EntityKind::Level,
                EntityKind::Room,
                EntityKind::SavedGame,
                EntityKind::Demo,
            ],
            CollectionKind::Player => &[EntityKind::Player],
            CollectionKind::Text => &[EntityKind::Message, EntityKind::MessageText],
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionKind::Hold => "hold",
            CollectionKind::Player => "player",
            CollectionKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// The seven record tables exposed through the name-routed view API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Holds,
    Levels,
    Rooms,
    SavedGames,
    Demos,
    Players,
    MessageTexts,
}

impl ViewKind {
    pub const ALL: [ViewKind; 7] = [
        ViewKind::Holds,
        ViewKind::Levels,
        ViewKind::Rooms,
        ViewKind::SavedGames,
        ViewKind::Demos,
        ViewKind::Players,
        ViewKind::MessageTexts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Holds => "Holds",
            ViewKind::Levels => "Levels",
            ViewKind::Rooms => "Rooms",
            ViewKind::SavedGames => "SavedGames",
            ViewKind::Demos => "Demos",
            ViewKind::Players => "Players",
            ViewKind::MessageTexts => "MessageTexts",
        }
    }

    pub fn from_name(name: &str) -> Option<ViewKind> {
        ViewKind::ALL.into_iter().find(|view| view.name() == name)
    }

    pub fn collection(self) -> CollectionKind {
        match self {
            ViewKind::Holds
            | ViewKind::Levels
            | ViewKind::Rooms
            | ViewKind::SavedGames
            | ViewKind::Demos => CollectionKind::Hold,
            ViewKind::Players => CollectionKind::Player,
            ViewKind::MessageTexts => CollectionKind::Text,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
