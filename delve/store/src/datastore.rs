//! The datastore: three collection files opened and closed as one unit.
//!
//! Opening runs the integrity pass over all three files. When everything
//! validates, each file is copied over its shadow backup so the *next*
//! corruption has something to restore from. When validation fails, the
//! backups are tried as a set: either all three validate and replace the
//! primaries, or the open fails. Restoring a single file out of the set
//! could pair records across collections that never existed together, so
//! partial restores are never attempted.
//!
//! ```text
//!   open ──► validate hold.dat / player.dat / text.dat
//!              │ all valid                  │ any invalid
//!              ▼                            ▼
//!        copy each over its          validate hold.da_ / player.da_ / text.da_
//!        shadow backup                      │ all valid        │ any invalid
//!              │                            ▼                  ▼
//!              ▼                      copy backups over     CorruptedNoBackup
//!           Clean                     primaries, load them
//!                                           │
//!                                           ▼
//!                                    RestoredFromBackup
//! ```
//!
//! Mutations accumulate in memory; `commit` rewrites the dirty files,
//! `rollback` reloads all three from disk. Dropping the store discards
//! anything uncommitted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use delve_common::{CollectionKind, EntityKind, Language, StoreConfig, ViewKind};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::collection::{
    HoldTables, PlayerTables, TextTables, read_collection_file, write_collection_file,
};
use crate::error::{OpenStatus, StoreError, StoreResult};
use crate::file::StoreFileError;
use crate::messages::BASIC_MESSAGE_CEILING;
use crate::records::{Demo, Hold, Level, MessageTextRow, Player, Room, SavedGame};
use crate::table::Table;

/// An open data set: the three collections, loaded in memory.
#[derive(Debug)]
pub struct Datastore {
    pub(crate) config: StoreConfig,
    pub(crate) active_language: Language,
    pub(crate) hold: HoldTables,
    pub(crate) player: PlayerTables,
    pub(crate) text: TextTables,
    dirty: [bool; 3],
}

/// Why a primary collection file could not be loaded.
enum PrimaryFailure {
    /// Missing file or permission problem. Backups are not consulted.
    Fatal(StoreError),
    /// Structural validation failed; the backup set may still help.
    Corrupted { path: PathBuf, error: StoreFileError },
}

impl Datastore {
    /// Creates a fresh data set and returns it opened.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if any collection file is
    /// already present. The message counter starts at the basic-message
    /// ceiling so allocated message ids never collide with the fixed ids
    /// installed from text sources.
    pub fn create(config: StoreConfig) -> StoreResult<Datastore> {
        fs::create_dir_all(&config.data_dir).map_err(|err| classify_io(&config.data_dir, err))?;
        for collection in CollectionKind::ALL {
            let path = config.collection_path(collection);
            if path.exists() {
                return Err(StoreError::AlreadyExists { path });
            }
        }

        let hold = HoldTables::default();
        let player = PlayerTables::default();
        let mut text = TextTables::default();
        text.counters.set(EntityKind::Message, BASIC_MESSAGE_CEILING);

        write_tables(&config, CollectionKind::Hold, &hold)?;
        write_tables(&config, CollectionKind::Player, &player)?;
        write_tables(&config, CollectionKind::Text, &text)?;

        Ok(Self::assemble(config, hold, player, text))
    }

    /// Opens an existing data set, running the integrity pass described in
    /// the module docs.
    pub fn open(config: StoreConfig) -> StoreResult<(Datastore, OpenStatus)> {
        match Self::load_primaries(&config) {
            Ok((hold, player, text)) => {
                refresh_backups(&config)?;
                Ok((
                    Self::assemble(config, hold, player, text),
                    OpenStatus::Clean,
                ))
            }
            Err(PrimaryFailure::Fatal(err)) => Err(err),
            Err(PrimaryFailure::Corrupted { path, error }) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "collection file failed validation, trying shadow backups"
                );
                let (hold, player, text) = Self::load_backups(&config)
                    .ok_or(StoreError::CorruptedNoBackup { path })?;
                for collection in CollectionKind::ALL {
                    let backup = config.backup_path(collection);
                    let primary = config.collection_path(collection);
                    fs::copy(&backup, &primary).map_err(|err| classify_io(&primary, err))?;
                }
                warn!("data set restored from shadow backups");
                Ok((
                    Self::assemble(config, hold, player, text),
                    OpenStatus::RestoredFromBackup,
                ))
            }
        }
    }

    /// Writes every dirty collection back to its file, hold collection
    /// first. The first failure is surfaced and later collections stay
    /// dirty.
    pub fn commit(&mut self) -> StoreResult<()> {
        for collection in CollectionKind::ALL {
            if !self.dirty[collection.as_u8() as usize] {
                continue;
            }
            match collection {
                CollectionKind::Hold => write_tables(&self.config, collection, &self.hold)?,
                CollectionKind::Player => write_tables(&self.config, collection, &self.player)?,
                CollectionKind::Text => write_tables(&self.config, collection, &self.text)?,
            }
            self.dirty[collection.as_u8() as usize] = false;
        }
        Ok(())
    }

    /// Discards uncommitted mutations in all three collections by
    /// re-reading the files.
    pub fn rollback(&mut self) -> StoreResult<()> {
        let (hold, player, text) = Self::load_primaries(&self.config).map_err(|failure| {
            match failure {
                PrimaryFailure::Fatal(err) => err,
                PrimaryFailure::Corrupted { error, .. } => StoreError::File(error),
            }
        })?;
        self.hold = hold;
        self.player = player;
        self.text = text;
        self.dirty = [false; 3];
        Ok(())
    }

    fn assemble(
        config: StoreConfig,
        hold: HoldTables,
        player: PlayerTables,
        text: TextTables,
    ) -> Datastore {
        Datastore {
            active_language: config.language,
            config,
            hold,
            player,
            text,
            dirty: [false; 3],
        }
    }

    fn load_primaries(
        config: &StoreConfig,
    ) -> Result<(HoldTables, PlayerTables, TextTables), PrimaryFailure> {
        let hold = read_primary(config, CollectionKind::Hold)?;
        let player = read_primary(config, CollectionKind::Player)?;
        let text = read_primary(config, CollectionKind::Text)?;
        Ok((hold, player, text))
    }

    fn load_backups(config: &StoreConfig) -> Option<(HoldTables, PlayerTables, TextTables)> {
        let hold = read_backup(config, CollectionKind::Hold)?;
        let player = read_backup(config, CollectionKind::Player)?;
        let text = read_backup(config, CollectionKind::Text)?;
        Some((hold, player, text))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Resolves a view name, the string-keyed entry point kept for hosts
    /// that address tables by name.
    pub fn view(&self, name: &str) -> StoreResult<ViewKind> {
        ViewKind::from_name(name).ok_or_else(|| StoreError::UnknownView(name.to_string()))
    }

    pub fn row_count(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::Holds => self.hold.holds.len(),
            ViewKind::Levels => self.hold.levels.len(),
            ViewKind::Rooms => self.hold.rooms.len(),
            ViewKind::SavedGames => self.hold.saved_games.len(),
            ViewKind::Demos => self.hold.demos.len(),
            ViewKind::Players => self.player.players.len(),
            ViewKind::MessageTexts => self.text.message_texts.len(),
        }
    }

    pub fn is_dirty(&self, collection: CollectionKind) -> bool {
        self.dirty[collection.as_u8() as usize]
    }

    pub(crate) fn mark_dirty(&mut self, collection: CollectionKind) {
        self.dirty[collection.as_u8() as usize] = true;
    }

    pub fn holds(&self) -> &Table<Hold> {
        &self.hold.holds
    }

    pub fn holds_mut(&mut self) -> &mut Table<Hold> {
        self.mark_dirty(CollectionKind::Hold);
        &mut self.hold.holds
    }

    pub fn levels(&self) -> &Table<Level> {
        &self.hold.levels
    }

    pub fn levels_mut(&mut self) -> &mut Table<Level> {
        self.mark_dirty(CollectionKind::Hold);
        &mut self.hold.levels
    }

    pub fn rooms(&self) -> &Table<Room> {
        &self.hold.rooms
    }

    pub fn rooms_mut(&mut self) -> &mut Table<Room> {
        self.mark_dirty(CollectionKind::Hold);
        &mut self.hold.rooms
    }

    pub fn saved_games(&self) -> &Table<SavedGame> {
        &self.hold.saved_games
    }

    pub fn saved_games_mut(&mut self) -> &mut Table<SavedGame> {
        self.mark_dirty(CollectionKind::Hold);
        &mut self.hold.saved_games
    }

    pub fn demos(&self) -> &Table<Demo> {
        &self.hold.demos
    }

    pub fn demos_mut(&mut self) -> &mut Table<Demo> {
        self.mark_dirty(CollectionKind::Hold);
        &mut self.hold.demos
    }

    pub fn players(&self) -> &Table<Player> {
        &self.player.players
    }

    pub fn players_mut(&mut self) -> &mut Table<Player> {
        self.mark_dirty(CollectionKind::Player);
        &mut self.player.players
    }

    pub fn message_texts(&self) -> &Table<MessageTextRow> {
        &self.text.message_texts
    }

    pub fn message_texts_mut(&mut self) -> &mut Table<MessageTextRow> {
        self.mark_dirty(CollectionKind::Text);
        &mut self.text.message_texts
    }
}

fn write_tables<T: serde::Serialize>(
    config: &StoreConfig,
    collection: CollectionKind,
    tables: &T,
) -> StoreResult<()> {
    let path = config.collection_path(collection);
    write_collection_file(&path, collection, tables).map_err(|err| classify_file(&path, err))
}

fn read_primary<T: DeserializeOwned>(
    config: &StoreConfig,
    collection: CollectionKind,
) -> Result<T, PrimaryFailure> {
    let path = config.collection_path(collection);
    match read_collection_file(&path, collection) {
        Ok(tables) => Ok(tables),
        Err(StoreFileError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            Err(PrimaryFailure::Fatal(StoreError::DataMissing { path }))
        }
        Err(StoreFileError::Io(err)) if err.kind() == io::ErrorKind::PermissionDenied => {
            Err(PrimaryFailure::Fatal(StoreError::DataNoAccess { path }))
        }
        Err(error) => Err(PrimaryFailure::Corrupted { path, error }),
    }
}

fn read_backup<T: DeserializeOwned>(
    config: &StoreConfig,
    collection: CollectionKind,
) -> Option<T> {
    let path = config.backup_path(collection);
    match read_collection_file(&path, collection) {
        Ok(tables) => Some(tables),
        Err(error) => {
            warn!(path = %path.display(), error = %error, "shadow backup unusable");
            None
        }
    }
}

/// Copies each validated primary over its shadow backup.
fn refresh_backups(config: &StoreConfig) -> StoreResult<()> {
    for collection in CollectionKind::ALL {
        let primary = config.collection_path(collection);
        let backup = config.backup_path(collection);
        fs::copy(&primary, &backup).map_err(|err| classify_io(&backup, err))?;
    }
    Ok(())
}

fn classify_io(path: &Path, err: io::Error) -> StoreError {
    match err.kind() {
        io::ErrorKind::NotFound => StoreError::DataMissing {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => StoreError::DataNoAccess {
            path: path.to_path_buf(),
        },
        _ => StoreError::Io(err),
    }
}

fn classify_file(path: &Path, err: StoreFileError) -> StoreError {
    match err {
        StoreFileError::Io(io_err) => classify_io(path, io_err),
        other => StoreError::File(other),
    }
}
