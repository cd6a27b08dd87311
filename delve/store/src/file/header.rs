//! Collection file header.
//!
//! Every file this crate writes (the three collection files and the legacy
//! archive handled by the import crate) starts with the same fixed header:
//!
//! | Offset | Size | Field          | Description                               |
//! |--------|------|----------------|-------------------------------------------|
//! | 0      | 8    | `magic`        | Magic bytes `"DELVEDAT"`                  |
//! | 8      | 4    | `version`      | File format version                       |
//! | 12     | 1    | `content`      | Content tag (collection or archive)       |
//! | 13     | 3    | -              | Reserved, zero-filled                     |
//! | 16     | 4    | `header_crc`   | CRC32 of the preceding 16 bytes           |

use std::io::{Read, Write};

use crc32fast::Hasher;
use delve_common::CollectionKind;

use super::error::{StoreFileError, StoreFileResult};

/// Magic number identifying a Delve data file.
pub const MAGIC: [u8; 8] = *b"DELVEDAT";

/// Format version written by this crate.
pub const CURRENT_FORMAT_VERSION: u32 = 160;

/// Content tag marking a single-file legacy archive rather than a collection.
pub const CONTENT_ARCHIVE: u8 = 0xFF;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 20;

/// Fixed-size header at the start of every data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic number (must be `"DELVEDAT"`).
    pub magic: [u8; 8],
    /// File format version.
    pub version: u32,
    /// Content tag: `CollectionKind::as_u8` or `CONTENT_ARCHIVE`.
    pub content: u8,
}

impl FileHeader {
    /// Creates a header for a current-format collection file.
    pub fn for_collection(collection: CollectionKind) -> Self {
        Self {
            magic: MAGIC,
            version: CURRENT_FORMAT_VERSION,
            content: collection.as_u8(),
        }
    }

    /// Creates a header for a legacy archive of the given format version.
    pub fn for_archive(version: u32) -> Self {
        Self {
            magic: MAGIC,
            version,
            content: CONTENT_ARCHIVE,
        }
    }

    /// Validates the magic number.
    pub fn validate_magic(&self) -> StoreFileResult<()> {
        if self.magic != MAGIC {
            return Err(StoreFileError::InvalidMagic);
        }
        Ok(())
    }

    /// Validates that the version is the current collection format.
    pub fn validate_version(&self) -> StoreFileResult<()> {
        if self.version != CURRENT_FORMAT_VERSION {
            return Err(StoreFileError::UnsupportedVersion(
                self.version,
                CURRENT_FORMAT_VERSION,
            ));
        }
        Ok(())
    }

    /// Validates the content tag against an expected collection.
    pub fn validate_content(&self, expected: CollectionKind) -> StoreFileResult<()> {
        if self.content != expected.as_u8() {
            return Err(StoreFileError::UnexpectedContent {
                expected: expected.as_u8(),
                found: self.content,
            });
        }
        Ok(())
    }

    fn compute_crc(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&self.magic);
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&[self.content, 0, 0, 0]);
        hasher.finalize()
    }

    /// Writes the header, including its CRC.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> StoreFileResult<()> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&[self.content, 0, 0, 0])?;
        writer.write_all(&self.compute_crc().to_le_bytes())?;
        Ok(())
    }

    /// Reads a header, validating magic and CRC. Version and content checks
    /// are left to the caller, which may accept legacy versions.
    pub fn read_from<R: Read>(reader: &mut R) -> StoreFileResult<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes).map_err(truncated)?;

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[8..12]);
        let version = u32::from_le_bytes(word);
        let content = bytes[12];
        word.copy_from_slice(&bytes[16..20]);
        let header_crc = u32::from_le_bytes(word);

        let header = Self {
            magic,
            version,
            content,
        };
        header.validate_magic()?;

        let computed = header.compute_crc();
        if computed != header_crc {
            return Err(StoreFileError::ChecksumMismatch {
                expected: header_crc,
                actual: computed,
            });
        }

        Ok(header)
    }
}

fn truncated(err: std::io::Error) -> StoreFileError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        StoreFileError::FileTruncated
    } else {
        StoreFileError::Io(err)
    }
}
