//! The three collection payloads and their file I/O.
//!
//! A collection file is the fixed header, a schema-description region, and
//! one postcard payload region holding the whole table set. Files are
//! rewritten wholesale on commit; durability within a file comes from the
//! region checksums, recovery across commits from the shadow backups.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use delve_common::CollectionKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::file::{FileHeader, StoreFileError, StoreFileResult, read_region, write_region};
use crate::records::{
    COUNTERS_SPEC, CounterRow, Demo, Hold, Level, MessageTextRow, Player, Record, Room, SavedGame,
};
use crate::schema::{self, TableSpec};
use crate::table::Table;

/// Tables of the hold collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldTables {
    pub counters: CounterRow,
    pub holds: Table<Hold>,
    pub levels: Table<Level>,
    pub rooms: Table<Room>,
    pub saved_games: Table<SavedGame>,
    pub demos: Table<Demo>,
}

/// Tables of the player collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerTables {
    pub counters: CounterRow,
    pub players: Table<Player>,
}

/// Tables of the text collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextTables {
    pub counters: CounterRow,
    pub message_texts: Table<MessageTextRow>,
}

static HOLD_TABLES: [TableSpec; 6] = [
    COUNTERS_SPEC,
    Hold::SPEC,
    Level::SPEC,
    Room::SPEC,
    SavedGame::SPEC,
    Demo::SPEC,
];
static PLAYER_TABLES: [TableSpec; 2] = [COUNTERS_SPEC, Player::SPEC];
static TEXT_TABLES: [TableSpec; 2] = [COUNTERS_SPEC, MessageTextRow::SPEC];

/// The tables a collection file of the given kind must describe.
pub fn expected_tables(collection: CollectionKind) -> &'static [TableSpec] {
    match collection {
        CollectionKind::Hold => &HOLD_TABLES,
        CollectionKind::Player => &PLAYER_TABLES,
        CollectionKind::Text => &TEXT_TABLES,
    }
}

/// Writes a collection file: header, schema region, payload region.
pub(crate) fn write_collection_file<P, T>(
    path: P,
    collection: CollectionKind,
    tables: &T,
) -> StoreFileResult<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    FileHeader::for_collection(collection).write_to(&mut writer)?;

    let schema_text = schema::generate(expected_tables(collection));
    write_region(&mut writer, schema_text.as_bytes())?;

    let payload = postcard::to_allocvec(tables)
        .map_err(|err| StoreFileError::Serialization(err.to_string()))?;
    write_region(&mut writer, &payload)?;

    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Reads and fully validates a collection file: magic and header CRC,
/// current version, content tag, schema description against the expected
/// tables, then the payload checksum and decode.
pub(crate) fn read_collection_file<P, T>(path: P, collection: CollectionKind) -> StoreFileResult<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let header = FileHeader::read_from(&mut reader)?;
    header.validate_version()?;
    header.validate_content(collection)?;

    let schema_bytes = read_region(&mut reader)?;
    let schema_text = std::str::from_utf8(&schema_bytes)
        .map_err(|_| StoreFileError::Schema("description is not valid UTF-8".into()))?;
    schema::validate(schema_text, expected_tables(collection))?;

    let payload = read_region(&mut reader)?;
    postcard::from_bytes(&payload).map_err(|err| StoreFileError::Deserialization(err.to_string()))
}
