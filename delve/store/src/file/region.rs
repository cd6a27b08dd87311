//! Length and checksum framed regions.
//!
//! A region is `[len: u32 LE][crc: u32 LE][len bytes]`. The schema
//! description and the record payload of every data file are each one
//! region, read fully and verified before any byte is trusted.

use std::io::{Read, Write};

use crc32fast::Hasher;

use super::error::{StoreFileError, StoreFileResult};

/// Sanity cap on a single region, guards allocation from a corrupt length
/// word before the CRC can reject it.
pub const MAX_REGION_BYTES: usize = 256 * 1024 * 1024;

/// Writes one framed region.
pub fn write_region<W: Write>(writer: &mut W, bytes: &[u8]) -> StoreFileResult<()> {
    if bytes.len() > MAX_REGION_BYTES {
        return Err(StoreFileError::RegionTooLarge(bytes.len()));
    }
    let len = bytes.len() as u32;

    let mut hasher = Hasher::new();
    hasher.update(bytes);
    let crc = hasher.finalize();

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&crc.to_le_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Reads one framed region and verifies its checksum.
pub fn read_region<R: Read>(reader: &mut R) -> StoreFileResult<Vec<u8>> {
    let mut word = [0u8; 4];
    reader.read_exact(&mut word).map_err(truncated)?;
    let len = u32::from_le_bytes(word) as usize;
    if len > MAX_REGION_BYTES {
        return Err(StoreFileError::RegionTooLarge(len));
    }

    reader.read_exact(&mut word).map_err(truncated)?;
    let expected = u32::from_le_bytes(word);

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes).map_err(truncated)?;

    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    let actual = hasher.finalize();
    if actual != expected {
        return Err(StoreFileError::ChecksumMismatch { expected, actual });
    }

    Ok(bytes)
}

fn truncated(err: std::io::Error) -> StoreFileError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        StoreFileError::FileTruncated
    } else {
        StoreFileError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_region_roundtrip() {
        let payload = b"delve region payload";
        let mut buf = Vec::new();
        write_region(&mut buf, payload).unwrap();
        assert_eq!(buf.len(), 8 + payload.len());

        let read_back = read_region(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(read_back, payload);
    }

    #[test]
    fn test_empty_region_roundtrip() {
        let mut buf = Vec::new();
        write_region(&mut buf, b"").unwrap();
        let read_back = read_region(&mut Cursor::new(&buf)).unwrap();
        assert!(read_back.is_empty());
    }

    #[test]
    fn test_corrupted_payload_byte() {
        let mut buf = Vec::new();
        write_region(&mut buf, b"some payload bytes").unwrap();
        let last = buf.len() - 1;
        buf[last] ^= 0x01;

        let result = read_region(&mut Cursor::new(&buf));
        assert!(matches!(result, Err(StoreFileError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_truncated_region() {
        let mut buf = Vec::new();
        write_region(&mut buf, b"some payload bytes").unwrap();
        buf.truncate(buf.len() - 4);

        let result = read_region(&mut Cursor::new(&buf));
        assert!(matches!(result, Err(StoreFileError::FileTruncated)));
    }

    #[test]
    fn test_absurd_length_word_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());

        let result = read_region(&mut Cursor::new(&buf));
        assert!(matches!(result, Err(StoreFileError::RegionTooLarge(_))));
    }
}
