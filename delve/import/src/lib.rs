//! Legacy data import: one-shot full migration of 1.11c and 1.5 archives,
//! a resumable profile import driven tick by tick from a host UI, and the
//! bracket-tagged text sources the basic interface messages install from.

pub mod engine;
pub mod error;
pub mod legacy;
pub mod patches;
pub mod runner;
pub mod textsource;

pub use engine::{ImportStep, Importer};
pub use error::{ImportError, ImportResult};
pub use legacy::{LegacyArchive, SourceVersion};
pub use runner::{ImportTask, TaskStatus, TickReport};
pub use textsource::{IdManifest, MessageGroup, TextSourceError, parse_text_source};
