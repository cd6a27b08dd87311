//! Import-level error taxonomy.
//!
//! Step failures wrap the underlying cause so callers can report which
//! pipeline stage broke; by the time a [`ImportError::StepFailed`] is
//! returned the destination store has already been rolled back.

use delve_store::commands::CommandLogError;
use delve_store::error::StoreError;
use delve_store::file::StoreFileError;
use thiserror::Error;

use crate::engine::ImportStep;
use crate::textsource::TextSourceError;

/// Errors surfaced by the import engine and step runner.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source path does not hold a readable archive of a supported
    /// format version.
    #[error("invalid import source: {0}")]
    SourceInvalid(String),

    /// A pipeline step failed partway through.
    #[error("import step `{step}` failed")]
    StepFailed {
        step: ImportStep,
        #[source]
        source: Box<ImportError>,
    },

    /// The step runner was started while a run was in progress.
    #[error("an import task is already running")]
    TaskBusy,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    File(#[from] StoreFileError),

    /// A source command log did not unpack cleanly.
    #[error("command log: {0}")]
    CommandLog(#[from] CommandLogError),

    #[error(transparent)]
    TextSource(#[from] TextSourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Wraps an error as a failure of the given step, unless it already is
    /// one.
    pub(crate) fn in_step(self, step: ImportStep) -> ImportError {
        match self {
            err @ ImportError::StepFailed { .. } => err,
            other => ImportError::StepFailed {
                step,
                source: Box::new(other),
            },
        }
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
