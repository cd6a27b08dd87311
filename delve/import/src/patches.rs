//! Hard-coded repair data for legacy sources.
//!
//! The 1.11c and 1.5 engines kept several facts in the binary instead of
//! the data files. Migration reattaches them from the tables below:
//! staircase destinations per room coordinate, facing for tar mother eye
//! pairs, and replacement entries for two shipped command logs that a
//! recorder bug left short.

use delve_common::{LevelId, PlayerId, SavedGameId};
use delve_store::commands::{CMD_WAIT, CommandEntry, pack_commands, unpack_commands};

use crate::error::{ImportError, ImportResult};

/// Player id legacy continue slots hang off. Saved games referencing it
/// are synthetic restore points, not real progress, and do not migrate.
pub const PLACEHOLDER_PLAYER_ID: PlayerId = 0;

/// A staircase exit to reattach, keyed by room coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPatch {
    pub room_x: u32,
    pub room_y: u32,
    pub dest_level_id: LevelId,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Staircase destinations for the original campaign hold. Legacy room
/// records never stored where stairs led; the engine resolved them in
/// code. End-of-hold stairs are not listed, those stay exitless.
pub const ROOM_EXIT_MAP: &[ExitPatch] = &[
    ExitPatch { room_x: 50, room_y: 150, dest_level_id: 2, left: 17, right: 20, top: 28, bottom: 31 },
    ExitPatch { room_x: 52, room_y: 250, dest_level_id: 3, left: 33, right: 36, top: 12, bottom: 15 },
    ExitPatch { room_x: 49, room_y: 350, dest_level_id: 4, left: 2, right: 5, top: 16, bottom: 19 },
    ExitPatch { room_x: 50, room_y: 451, dest_level_id: 5, left: 17, right: 20, top: 0, bottom: 3 },
    ExitPatch { room_x: 51, room_y: 550, dest_level_id: 6, left: 8, right: 11, top: 24, bottom: 27 },
    ExitPatch { room_x: 50, room_y: 649, dest_level_id: 7, left: 26, right: 29, top: 20, bottom: 23 },
    ExitPatch { room_x: 52, room_y: 750, dest_level_id: 8, left: 14, right: 17, top: 6, bottom: 9 },
    ExitPatch { room_x: 51, room_y: 849, dest_level_id: 9, left: 30, right: 33, top: 28, bottom: 31 },
    ExitPatch { room_x: 49, room_y: 950, dest_level_id: 10, left: 5, right: 8, top: 2, bottom: 5 },
    ExitPatch { room_x: 50, room_y: 1050, dest_level_id: 11, left: 21, right: 24, top: 14, bottom: 17 },
    ExitPatch { room_x: 49, room_y: 1150, dest_level_id: 12, left: 11, right: 14, top: 26, bottom: 29 },
    ExitPatch { room_x: 50, room_y: 1250, dest_level_id: 13, left: 18, right: 21, top: 30, bottom: 31 },
];

/// The exits to reattach to the room at the given coordinate.
pub fn exits_for(room_x: u32, room_y: u32) -> impl Iterator<Item = &'static ExitPatch> {
    ROOM_EXIT_MAP
        .iter()
        .filter(move |patch| patch.room_x == room_x && patch.room_y == room_y)
}

/// A tar mother eye whose derived facing must be flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeException {
    pub room_x: u32,
    pub room_y: u32,
    pub x: u32,
    pub y: u32,
}

/// Eyes alternate west then east in placement order. These two squares
/// were authored against the pattern and keep the reversed facing.
pub const TARMOTHER_EYE_EXCEPTIONS: [EyeException; 2] = [
    EyeException { room_x: 50, room_y: 250, x: 20, y: 11 },
    EyeException { room_x: 52, room_y: 750, x: 14, y: 9 },
];

pub fn is_eye_exception(room_x: u32, room_y: u32, x: u32, y: u32) -> bool {
    TARMOTHER_EYE_EXCEPTIONS
        .iter()
        .any(|e| e.room_x == room_x && e.room_y == room_y && e.x == x && e.y == y)
}

/// Entries to insert into a known-short command log.
#[derive(Debug, Clone, Copy)]
pub struct CommandSplice {
    pub saved_game_id: SavedGameId,
    /// Entry index the insertion happens at.
    pub offset: usize,
    pub entries: &'static [CommandEntry],
}

/// Two shipped demo logs lost wait entries to a recorder bug, so replays
/// ran ahead of the recorded timing. The inserted entries restore the
/// original pacing; demos over these logs get their end turns extended by
/// the same count.
pub const COMMAND_SPLICES: [CommandSplice; 2] = [
    CommandSplice {
        saved_game_id: 10001,
        offset: 4,
        entries: &[CommandEntry { command: CMD_WAIT, delay: 1 }],
    },
    CommandSplice {
        saved_game_id: 10004,
        offset: 11,
        entries: &[
            CommandEntry { command: CMD_WAIT, delay: 1 },
            CommandEntry { command: CMD_WAIT, delay: 2 },
        ],
    },
];

pub fn splice_for(saved_game_id: SavedGameId) -> Option<&'static CommandSplice> {
    COMMAND_SPLICES
        .iter()
        .find(|splice| splice.saved_game_id == saved_game_id)
}

/// Applies any registered splice to a packed command log, validating the
/// encoding either way. Returns the resulting buffer and the number of
/// inserted entries.
pub fn apply_command_patches(
    saved_game_id: SavedGameId,
    bytes: &[u8],
) -> ImportResult<(Vec<u8>, u32)> {
    let entries = unpack_commands(bytes)?;
    let Some(splice) = splice_for(saved_game_id) else {
        return Ok((bytes.to_vec(), 0));
    };
    if splice.offset > entries.len() {
        return Err(ImportError::SourceInvalid(format!(
            "saved game {saved_game_id} log has {} entries, splice expects at least {}",
            entries.len(),
            splice.offset
        )));
    }
    let mut patched = Vec::with_capacity(entries.len() + splice.entries.len());
    patched.extend_from_slice(&entries[..splice.offset]);
    patched.extend_from_slice(splice.entries);
    patched.extend_from_slice(&entries[splice.offset..]);
    Ok((pack_commands(&patched), splice.entries.len() as u32))
}
