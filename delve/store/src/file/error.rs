//! Error types for collection file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing a collection file.
#[derive(Debug, Error)]
pub enum StoreFileError {
    /// The file does not start with the expected magic number.
    #[error("invalid magic number")]
    InvalidMagic,

    /// The file format version is not supported.
    #[error("unsupported format version: {0} (expected {1})")]
    UnsupportedVersion(u32, u32),

    /// The header names a different content kind than the caller expected.
    #[error("unexpected content tag: {found:#04x} (expected {expected:#04x})")]
    UnexpectedContent { expected: u8, found: u8 },

    /// A CRC32 check failed.
    #[error("checksum mismatch: expected {expected:#010x}, actual {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The file ended before a complete header or region could be read.
    #[error("file is truncated or incomplete")]
    FileTruncated,

    /// A region length word exceeds the sanity cap.
    #[error("region too large: {0} bytes")]
    RegionTooLarge(usize),

    /// The schema description failed tokenization.
    #[error("invalid schema description: {0}")]
    Schema(String),

    /// The schema description tokenized but does not match the expected tables.
    #[error("schema mismatch: expected `{expected}`, found `{found}`")]
    SchemaMismatch { expected: String, found: String },

    /// Payload serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Payload deserialization failed.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for collection file operations.
pub type StoreFileResult<T> = Result<T, StoreFileError>;
