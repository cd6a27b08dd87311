//! The legacy archive format and its row model.
//!
//! Versions 1.11c and 1.5 shipped a single archive file instead of the
//! three-collection store:
//!
//! ```text
//!   +--------------------------+
//!   | header (archive content) |  version 111 or 150
//!   +--------------------------+
//!   | payload region           |  postcard-encoded [`LegacyArchive`]
//!   +--------------------------+
//! ```
//!
//! The row model is the old schema, kept verbatim: rooms carry no exit
//! sub-table, players no original-name column, and optional references use
//! a zero sentinel instead of an explicit absent value. Enumerations are
//! raw numeric codes. The migration engine owns every conversion; nothing
//! here guesses at missing data.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use delve_common::RecordId;
use delve_store::file::{CONTENT_ARCHIVE, FileHeader, StoreFileError, read_region, write_region};
use delve_store::records::{EditAccess, MonsterKind};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// Source format versions the importer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceVersion {
    /// Format version 111.
    V1_11c,
    /// Format version 150.
    V1_5,
}

impl SourceVersion {
    pub const ALL: [SourceVersion; 2] = [SourceVersion::V1_11c, SourceVersion::V1_5];

    /// The version number stamped into the archive header.
    pub const fn format_version(self) -> u32 {
        match self {
            SourceVersion::V1_11c => 111,
            SourceVersion::V1_5 => 150,
        }
    }

    pub fn from_format_version(version: u32) -> Option<SourceVersion> {
        SourceVersion::ALL
            .into_iter()
            .find(|v| v.format_version() == version)
    }

    /// Human spelling, e.g. `1.11c`.
    pub fn label(self) -> &'static str {
        match self {
            SourceVersion::V1_11c => "1.11c",
            SourceVersion::V1_5 => "1.5",
        }
    }

    pub fn from_label(label: &str) -> Option<SourceVersion> {
        SourceVersion::ALL.into_iter().find(|v| v.label() == label)
    }
}

impl std::fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Last-issued ids recorded by a legacy archive, one per entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCounters {
    pub hold: RecordId,
    pub level: RecordId,
    pub room: RecordId,
    pub saved_game: RecordId,
    pub demo: RecordId,
    pub player: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyHold {
    pub id: RecordId,
    pub name_mid: RecordId,
    pub description_mid: RecordId,
    /// Zero when the hold has no entry level yet.
    pub first_level_id: RecordId,
    pub owner_player_id: RecordId,
    /// Edit-access code, see [`edit_access`].
    pub edit_access: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLevel {
    pub id: RecordId,
    pub hold_id: RecordId,
    pub owner_player_id: RecordId,
    pub name_mid: RecordId,
    pub description_mid: RecordId,
    pub room_x: u32,
    pub room_y: u32,
    pub entry_x: u32,
    pub entry_y: u32,
    /// Compass code, see [`delve_common::Orientation::from_index`].
    pub entry_orientation: u8,
    pub required_rooms: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyOrbAgent {
    /// Agent action code, see [`orb_agent_action`].
    pub action: u8,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyOrb {
    pub x: u32,
    pub y: u32,
    pub agents: Vec<LegacyOrbAgent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMonster {
    /// Roster code, see [`monster_kind`].
    pub kind: u8,
    pub x: u32,
    pub y: u32,
    /// Compass code. Unreliable for tar mother eyes, which the engine
    /// re-derives.
    pub orientation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyScroll {
    pub x: u32,
    pub y: u32,
    pub text_mid: RecordId,
}

/// A legacy room. No exit sub-table; stair destinations were wired into
/// the engine binary back then and are regenerated from the coordinate
/// patch map during migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRoom {
    pub id: RecordId,
    pub level_id: RecordId,
    pub room_x: u32,
    pub room_y: u32,
    pub width: u32,
    pub height: u32,
    pub style_id: u32,
    pub squares: Vec<u8>,
    pub orbs: Vec<LegacyOrb>,
    pub monsters: Vec<LegacyMonster>,
    pub scrolls: Vec<LegacyScroll>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySavedGame {
    pub id: RecordId,
    pub player_id: RecordId,
    pub room_id: RecordId,
    pub checkpoint_x: u32,
    pub checkpoint_y: u32,
    pub explored_rooms: Vec<RecordId>,
    pub conquered_rooms: Vec<RecordId>,
    /// Packed command log, same encoding as the current format.
    pub commands: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDemo {
    pub id: RecordId,
    pub saved_game_id: RecordId,
    pub description_mid: RecordId,
    pub begin_turn: u32,
    pub end_turn: u32,
    /// Zero when the demo ends a sequence.
    pub next_demo_id: RecordId,
    pub checksum: u32,
}

/// A legacy player. No original-name column; migration backfills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPlayer {
    pub id: RecordId,
    pub is_local: bool,
    pub name_mid: RecordId,
    pub email_mid: RecordId,
    pub created: i64,
    pub last_updated: i64,
    pub settings: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMessageText {
    pub id: RecordId,
    pub message_id: RecordId,
    /// Language code, see [`delve_common::Language::from_code`].
    pub language: u8,
    /// UTF-16LE bytes, same encoding as the current format.
    pub text: Vec<u8>,
}

/// Everything a legacy archive holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyArchive {
    pub counters: LegacyCounters,
    pub holds: Vec<LegacyHold>,
    pub levels: Vec<LegacyLevel>,
    pub rooms: Vec<LegacyRoom>,
    pub saved_games: Vec<LegacySavedGame>,
    pub demos: Vec<LegacyDemo>,
    pub players: Vec<LegacyPlayer>,
    pub message_texts: Vec<LegacyMessageText>,
}

/// Maps a zero-sentinel reference to an explicit optional one.
pub fn optional_id(id: RecordId) -> Option<RecordId> {
    if id == 0 { None } else { Some(id) }
}

/// Decodes a legacy monster roster code.
pub fn monster_kind(code: u8) -> Option<MonsterKind> {
    Some(match code {
        0 => MonsterKind::Roach,
        1 => MonsterKind::RoachQueen,
        2 => MonsterKind::RoachEgg,
        3 => MonsterKind::Goblin,
        4 => MonsterKind::Neather,
        5 => MonsterKind::WraithWing,
        6 => MonsterKind::Eye,
        7 => MonsterKind::Serpent,
        8 => MonsterKind::TarMother,
        9 => MonsterKind::TarBaby,
        10 => MonsterKind::Brain,
        11 => MonsterKind::Mimic,
        12 => MonsterKind::Spider,
        _ => return None,
    })
}

/// Encodes a monster kind as its legacy roster code.
pub fn monster_code(kind: MonsterKind) -> u8 {
    match kind {
        MonsterKind::Roach => 0,
        MonsterKind::RoachQueen => 1,
        MonsterKind::RoachEgg => 2,
        MonsterKind::Goblin => 3,
        MonsterKind::Neather => 4,
        MonsterKind::WraithWing => 5,
        MonsterKind::Eye => 6,
        MonsterKind::Serpent => 7,
        MonsterKind::TarMother => 8,
        MonsterKind::TarBaby => 9,
        MonsterKind::Brain => 10,
        MonsterKind::Mimic => 11,
        MonsterKind::Spider => 12,
    }
}

/// Decodes a legacy edit-access code.
pub fn edit_access(code: u8) -> Option<EditAccess> {
    Some(match code {
        0 => EditAccess::OwnerOnly,
        1 => EditAccess::Conquerors,
        2 => EditAccess::Anyone,
        _ => return None,
    })
}

/// Decodes a legacy orb-agent action code.
pub fn orb_agent_action(code: u8) -> Option<delve_store::records::OrbAgentAction> {
    use delve_store::records::OrbAgentAction;
    Some(match code {
        0 => OrbAgentAction::Toggle,
        1 => OrbAgentAction::Open,
        2 => OrbAgentAction::Close,
        _ => return None,
    })
}

/// Writes an archive file stamped with the given source version.
///
/// Shipped builds only ever read archives; writing exists for the data
/// tool and for tests.
pub fn write_archive<P: AsRef<Path>>(
    path: P,
    version: SourceVersion,
    archive: &LegacyArchive,
) -> ImportResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    FileHeader::for_archive(version.format_version()).write_to(&mut writer)?;

    let payload = postcard::to_allocvec(archive)
        .map_err(|err| StoreFileError::Serialization(err.to_string()))?;
    write_region(&mut writer, &payload)?;

    writer.flush()?;
    writer.get_ref().sync_all().map_err(StoreFileError::from)?;
    Ok(())
}

/// Reads an archive, gating on the content tag and the supported source
/// versions. A missing file, wrong content tag, or unsupported version is
/// [`ImportError::SourceInvalid`]; structural corruption keeps its
/// file-level error.
pub fn read_archive<P: AsRef<Path>>(path: P) -> ImportResult<(SourceVersion, LegacyArchive)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            ImportError::SourceInvalid(format!("no archive at {}", path.display()))
        } else {
            ImportError::Io(err)
        }
    })?;
    let mut reader = BufReader::new(file);

    let header = FileHeader::read_from(&mut reader)?;
    if header.content != CONTENT_ARCHIVE {
        return Err(ImportError::SourceInvalid(format!(
            "{} is not a legacy archive (content tag {:#04x})",
            path.display(),
            header.content
        )));
    }
    let version = SourceVersion::from_format_version(header.version).ok_or_else(|| {
        ImportError::SourceInvalid(format!(
            "unsupported source format version {} (supported: 111, 150)",
            header.version
        ))
    })?;

    let payload = read_region(&mut reader)?;
    let archive = postcard::from_bytes(&payload)
        .map_err(|err| StoreFileError::Deserialization(err.to_string()))?;
    Ok((version, archive))
}
