//! Record types for the three collections, plus the [`Record`] trait tying
//! each row type to its table description and primary key.

mod counter;
mod demo;
mod hold;
mod level;
mod message;
mod player;
mod room;
mod saved_game;

use delve_common::RecordId;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use counter::{COUNTERS_SPEC, CounterRow};
pub use demo::Demo;
pub use hold::{EditAccess, Hold};
pub use level::Level;
pub use message::MessageTextRow;
pub use player::Player;
pub use room::{Exit, Monster, MonsterKind, Orb, OrbAgent, OrbAgentAction, Room, Scroll};
pub use saved_game::SavedGame;

use crate::schema::TableSpec;

/// A storable row: carries its table description and exposes its primary key.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Table name and columns advertised in the schema description.
    const SPEC: TableSpec;

    /// Primary key of this row.
    fn id(&self) -> RecordId;
}
