//! Delve's record store: three file-backed collections (hold, player,
//! text) opened and committed as a unit, with structural validation,
//! shadow-backup recovery, primary-key allocation, and language-fallback
//! message resolution.

mod allocator;
pub mod collection;
pub mod commands;
mod datastore;
pub mod error;
pub mod file;
mod messages;
pub mod records;
pub mod schema;
pub mod table;
pub mod tiles;

pub use datastore::Datastore;
pub use error::{OpenStatus, StoreError, StoreResult};
pub use messages::{
    BASIC_MESSAGE_CEILING, MAX_MESSAGE_TEXT_BYTES, decode_utf16le, encode_utf16le,
};
pub use table::Table;
