//! Packed command logs.
//!
//! A saved game stores its input history as a packed byte buffer: per entry
//! one command byte, then the elapsed delay in tenths of a second. Delays
//! below [`DELAY_EXTENDED`] fit in a single byte; longer ones write the
//! marker byte followed by the full delay as a `u16` little-endian.
//!
//! ```text
//!   delay < 0xFF:   [command][delay]
//!   delay >= 0xFF:  [command][0xFF][delay lo][delay hi]
//! ```
//!
//! Packing then unpacking reproduces the exact entry sequence, including the
//! empty log.

use thiserror::Error;

/// Marker byte introducing a two-byte delay.
pub const DELAY_EXTENDED: u8 = 0xFF;

/// Command bytes. Movement mirrors the numeric keypad with wait in the
/// centre; the turn commands rotate the sword without moving.
pub const CMD_NW: u8 = 0;
pub const CMD_N: u8 = 1;
pub const CMD_NE: u8 = 2;
pub const CMD_W: u8 = 3;
pub const CMD_WAIT: u8 = 4;
pub const CMD_E: u8 = 5;
pub const CMD_SW: u8 = 6;
pub const CMD_S: u8 = 7;
pub const CMD_SE: u8 = 8;
pub const CMD_TURN_CW: u8 = 9;
pub const CMD_TURN_CCW: u8 = 10;

/// Errors from unpacking a command buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandLogError {
    /// The buffer ended in the middle of an entry.
    #[error("command log truncated at byte {0}")]
    Truncated(usize),
}

/// One recorded input: the command byte and the delay since the previous
/// command, in tenths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: u8,
    pub delay: u16,
}

impl CommandEntry {
    pub fn new(command: u8, delay: u16) -> Self {
        Self { command, delay }
    }
}

/// Packs entries into the on-disk buffer encoding.
pub fn pack_commands(entries: &[CommandEntry]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        bytes.push(entry.command);
        if entry.delay < u16::from(DELAY_EXTENDED) {
            bytes.push(entry.delay as u8);
        } else {
            bytes.push(DELAY_EXTENDED);
            bytes.extend_from_slice(&entry.delay.to_le_bytes());
        }
    }
    bytes
}

/// Unpacks an on-disk buffer back into entries.
pub fn unpack_commands(bytes: &[u8]) -> Result<Vec<CommandEntry>, CommandLogError> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let command = bytes[pos];
        let delay_pos = pos + 1;
        if delay_pos >= bytes.len() {
            return Err(CommandLogError::Truncated(delay_pos));
        }
        let first = bytes[delay_pos];
        let (delay, advance) = if first == DELAY_EXTENDED {
            if delay_pos + 2 >= bytes.len() {
                return Err(CommandLogError::Truncated(delay_pos + 1));
            }
            let delay = u16::from_le_bytes([bytes[delay_pos + 1], bytes[delay_pos + 2]]);
            (delay, 4)
        } else {
            (u16::from(first), 2)
        };
        entries.push(CommandEntry { command, delay });
        pos += advance;
    }
    Ok(entries)
}

/// Checksum of a packed command buffer, stored on demos to detect drift
/// between a demo and the log it replays.
pub fn command_checksum(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_short_delays() {
        let entries = vec![
            CommandEntry::new(1, 0),
            CommandEntry::new(2, 1),
            CommandEntry::new(3, 254),
        ];
        let packed = pack_commands(&entries);
        assert_eq!(packed.len(), 6);
        assert_eq!(unpack_commands(&packed).unwrap(), entries);
    }

    #[test]
    fn test_roundtrip_extended_delays() {
        let entries = vec![
            CommandEntry::new(7, 255),
            CommandEntry::new(8, 256),
            CommandEntry::new(9, u16::MAX),
        ];
        let packed = pack_commands(&entries);
        assert_eq!(packed.len(), 12);
        assert_eq!(unpack_commands(&packed).unwrap(), entries);
    }

    #[test]
    fn test_boundary_delay_encoding() {
        // 254 packs to one byte, 255 needs the marker.
        assert_eq!(pack_commands(&[CommandEntry::new(1, 254)]), vec![1, 254]);
        assert_eq!(
            pack_commands(&[CommandEntry::new(1, 255)]),
            vec![1, 0xFF, 0xFF, 0x00]
        );
    }

    #[test]
    fn test_empty_log_roundtrip() {
        let packed = pack_commands(&[]);
        assert!(packed.is_empty());
        assert!(unpack_commands(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_buffers_rejected() {
        assert_eq!(unpack_commands(&[5]), Err(CommandLogError::Truncated(1)));
        assert_eq!(
            unpack_commands(&[5, 0xFF]),
            Err(CommandLogError::Truncated(2))
        );
        assert_eq!(
            unpack_commands(&[5, 0xFF, 0x01]),
            Err(CommandLogError::Truncated(2))
        );
    }

    #[test]
    fn test_checksum_tracks_content() {
        let a = pack_commands(&[CommandEntry::new(1, 5), CommandEntry::new(2, 6)]);
        let b = pack_commands(&[CommandEntry::new(1, 5), CommandEntry::new(2, 7)]);
        assert_ne!(command_checksum(&a), command_checksum(&b));
        assert_eq!(command_checksum(&a), command_checksum(&a));
    }
}
