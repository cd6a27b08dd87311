//! Store-level error taxonomy.
//!
//! Low-level file and codec failures are translated at the store boundary
//! into these values; callers never see a raw parse error for a condition
//! the taxonomy names.

use std::path::PathBuf;

use thiserror::Error;

use crate::file::StoreFileError;

/// Errors surfaced by [`crate::Datastore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An expected collection file is absent.
    #[error("data file missing: {path}")]
    DataMissing { path: PathBuf },

    /// A collection file exists but cannot be read or written.
    #[error("no access to data file: {path}")]
    DataNoAccess { path: PathBuf },

    /// A collection file failed validation and no usable backup set exists.
    #[error("data corrupted with no usable backup: {path}")]
    CorruptedNoBackup { path: PathBuf },

    /// `create` refused to overwrite an existing data set.
    #[error("data set already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// A view name did not match any table.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// A file-level failure outside the conditions above.
    #[error(transparent)]
    File(#[from] StoreFileError),

    /// An I/O failure outside the conditions above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// How an open completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    /// All three files validated as-is.
    Clean,
    /// Validation failed but the shadow backups were usable; the caller
    /// should warn the user that recent changes may have been lost.
    RestoredFromBackup,
}
