//! Shared vocabulary for the Delve data backend: record identifiers, the
//! entity/collection/view routing enums, languages, orientations, and the
//! store configuration.

pub mod config;
pub mod ids;
pub mod language;
pub mod orientation;

pub use config::{StoreConfig, backup_file_name};
pub use ids::{
    CollectionKind, DemoId, EntityKind, HoldId, LevelId, MessageId, MessageTextId, PlayerId,
    RecordId, RoomId, SavedGameId, ViewKind,
};
pub use language::Language;
pub use orientation::Orientation;
