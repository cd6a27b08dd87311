//! Full migration of a legacy archive into a current store.
//!
//! The pipeline runs over an already-created, empty destination:
//!
//! ```text
//!   counters -> holds -> levels -> rooms -> saved games -> demos
//!     -> players -> message texts -> [text sources] -> backfill -> save
//! ```
//!
//! Record ids carry over unchanged; the destination is fresh so nothing
//! can collide. Every step stages rows in memory only, so a failure at
//! any point rolls the destination back to its pre-import state and
//! reports which step broke.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use delve_common::{EntityKind, Language, MessageId, Orientation, SavedGameId};
use delve_store::Datastore;
use delve_store::records::{
    Demo, Exit, Hold, Level, MessageTextRow, Monster, MonsterKind, Orb, OrbAgent, Player, Room,
    SavedGame, Scroll,
};
use tracing::{debug, info, warn};

use crate::error::{ImportError, ImportResult};
use crate::legacy::{self, LegacyArchive, LegacyOrb, LegacyRoom, SourceVersion};
use crate::patches;
use crate::textsource::{self, IdManifest, MANIFEST_FILE_NAME};

/// Pipeline steps, shared by the full engine and the profile step runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    OpenSource,
    Counters,
    Holds,
    Levels,
    Rooms,
    SavedGames,
    Demos,
    Players,
    MessageTexts,
    TextSources,
    Backfill,
    SaveAll,
    CloseSource,
}

impl ImportStep {
    pub fn label(self) -> &'static str {
        match self {
            ImportStep::OpenSource => "open-source",
            ImportStep::Counters => "counters",
            ImportStep::Holds => "holds",
            ImportStep::Levels => "levels",
            ImportStep::Rooms => "rooms",
            ImportStep::SavedGames => "saved-games",
            ImportStep::Demos => "demos",
            ImportStep::Players => "players",
            ImportStep::MessageTexts => "message-texts",
            ImportStep::TextSources => "text-sources",
            ImportStep::Backfill => "backfill",
            ImportStep::SaveAll => "save-all",
            ImportStep::CloseSource => "close-source",
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One-shot migration of a legacy archive.
pub struct Importer {
    version: SourceVersion,
    archive: LegacyArchive,
    /// Message ids referenced by migrated rows; only their text rows copy.
    message_worklist: BTreeSet<MessageId>,
    /// Entries added to patched logs, keyed by saved-game id.
    spliced_turns: HashMap<SavedGameId, u32>,
}

impl Importer {
    /// Reads and gates the source archive.
    pub fn open<P: AsRef<Path>>(source: P) -> ImportResult<Importer> {
        let (version, archive) = legacy::read_archive(source)?;
        Ok(Importer {
            version,
            archive,
            message_worklist: BTreeSet::new(),
            spliced_turns: HashMap::new(),
        })
    }

    pub fn version(&self) -> SourceVersion {
        self.version
    }

    pub fn source(&self) -> &LegacyArchive {
        &self.archive
    }

    /// Runs the whole pipeline and commits. On any failure the
    /// destination is rolled back before the error is returned.
    pub fn run_full(
        &mut self,
        store: &mut Datastore,
        text_sources: Option<&Path>,
    ) -> ImportResult<()> {
        if let Err(err) = self.run_steps(store, text_sources) {
            if let Err(rollback_err) = store.rollback() {
                warn!(error = %rollback_err, "rollback after failed import also failed");
            }
            return Err(err);
        }
        info!(
            version = %self.version,
            holds = store.holds().len(),
            rooms = store.rooms().len(),
            players = store.players().len(),
            "legacy import complete"
        );
        Ok(())
    }

    fn run_steps(&mut self, store: &mut Datastore, text_sources: Option<&Path>) -> ImportResult<()> {
        self.copy_counters(store)
            .map_err(|err| err.in_step(ImportStep::Counters))?;
        self.copy_holds(store)
            .map_err(|err| err.in_step(ImportStep::Holds))?;
        self.copy_levels(store)
            .map_err(|err| err.in_step(ImportStep::Levels))?;
        self.copy_rooms(store)
            .map_err(|err| err.in_step(ImportStep::Rooms))?;
        self.copy_saved_games(store)
            .map_err(|err| err.in_step(ImportStep::SavedGames))?;
        self.copy_demos(store)
            .map_err(|err| err.in_step(ImportStep::Demos))?;
        self.copy_players(store)
            .map_err(|err| err.in_step(ImportStep::Players))?;
        self.copy_message_texts(store)
            .map_err(|err| err.in_step(ImportStep::MessageTexts))?;
        if let Some(dir) = text_sources {
            install_text_sources(store, dir).map_err(|err| err.in_step(ImportStep::TextSources))?;
        }
        backfill_original_names(store).map_err(|err| err.in_step(ImportStep::Backfill))?;
        store
            .commit()
            .map_err(|err| ImportError::from(err).in_step(ImportStep::SaveAll))?;
        Ok(())
    }

    /// Carries the six entity counters over. Later steps still raise them
    /// past every migrated id, so a stale source counter cannot cause
    /// collisions.
    fn copy_counters(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let counters = self.archive.counters;
        store.set_counter(EntityKind::Hold, counters.hold);
        store.set_counter(EntityKind::Level, counters.level);
        store.set_counter(EntityKind::Room, counters.room);
        store.set_counter(EntityKind::SavedGame, counters.saved_game);
        store.set_counter(EntityKind::Demo, counters.demo);
        store.set_counter(EntityKind::Player, counters.player);
        Ok(())
    }

    fn copy_holds(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            ..
        } = self;
        for hold in &archive.holds {
            let edit_access = legacy::edit_access(hold.edit_access).ok_or_else(|| {
                ImportError::SourceInvalid(format!(
                    "hold {} has unknown edit-access code {}",
                    hold.id, hold.edit_access
                ))
            })?;
            message_worklist.insert(hold.name_mid);
            message_worklist.insert(hold.description_mid);
            store.holds_mut().insert(Hold {
                id: hold.id,
                name_mid: hold.name_mid,
                description_mid: hold.description_mid,
                first_level_id: legacy::optional_id(hold.first_level_id),
                owner_player_id: hold.owner_player_id,
                edit_access,
            });
            store.raise_counter(EntityKind::Hold, hold.id);
        }
        Ok(())
    }

    fn copy_levels(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            ..
        } = self;
        for level in &archive.levels {
            let entry_orientation =
                Orientation::from_index(level.entry_orientation).ok_or_else(|| {
                    ImportError::SourceInvalid(format!(
                        "level {} has unknown orientation code {}",
                        level.id, level.entry_orientation
                    ))
                })?;
            message_worklist.insert(level.name_mid);
            message_worklist.insert(level.description_mid);
            store.levels_mut().insert(Level {
                id: level.id,
                hold_id: level.hold_id,
                owner_player_id: level.owner_player_id,
                name_mid: level.name_mid,
                description_mid: level.description_mid,
                room_x: level.room_x,
                room_y: level.room_y,
                entry_x: level.entry_x,
                entry_y: level.entry_y,
                entry_orientation,
                required_rooms: level.required_rooms.clone(),
            });
            store.raise_counter(EntityKind::Level, level.id);
        }
        Ok(())
    }

    fn copy_rooms(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            ..
        } = self;
        for room in &archive.rooms {
            let expected_squares = 2 * (room.width * room.height) as usize;
            if room.squares.len() != expected_squares {
                return Err(ImportError::SourceInvalid(format!(
                    "room {} has {} squares, expected {}",
                    room.id,
                    room.squares.len(),
                    expected_squares
                )));
            }
            let monsters = convert_monsters(room)?;
            let orbs = room
                .orbs
                .iter()
                .map(convert_orb)
                .collect::<ImportResult<Vec<Orb>>>()?;
            let scrolls = room
                .scrolls
                .iter()
                .map(|scroll| {
                    message_worklist.insert(scroll.text_mid);
                    Scroll {
                        x: scroll.x,
                        y: scroll.y,
                        text_mid: scroll.text_mid,
                    }
                })
                .collect();
            let exits = patches::exits_for(room.room_x, room.room_y)
                .map(|patch| Exit {
                    level_id: patch.dest_level_id,
                    left: patch.left,
                    right: patch.right,
                    top: patch.top,
                    bottom: patch.bottom,
                })
                .collect();
            store.rooms_mut().insert(Room {
                id: room.id,
                level_id: room.level_id,
                room_x: room.room_x,
                room_y: room.room_y,
                width: room.width,
                height: room.height,
                style_id: room.style_id,
                squares: room.squares.clone(),
                orbs,
                monsters,
                scrolls,
                exits,
            });
            store.raise_counter(EntityKind::Room, room.id);
        }
        Ok(())
    }

    fn copy_saved_games(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            spliced_turns,
            ..
        } = self;
        for saved in &archive.saved_games {
            if saved.player_id == patches::PLACEHOLDER_PLAYER_ID {
                debug!(saved_game = saved.id, "skipping placeholder continue slot");
                continue;
            }
            let (commands, added) = patches::apply_command_patches(saved.id, &saved.commands)?;
            if added > 0 {
                spliced_turns.insert(saved.id, added);
            }
            store.saved_games_mut().insert(SavedGame {
                id: saved.id,
                player_id: saved.player_id,
                room_id: saved.room_id,
                checkpoint_x: saved.checkpoint_x,
                checkpoint_y: saved.checkpoint_y,
                explored_rooms: saved.explored_rooms.clone(),
                conquered_rooms: saved.conquered_rooms.clone(),
                commands,
            });
            store.raise_counter(EntityKind::SavedGame, saved.id);
        }
        Ok(())
    }

    fn copy_demos(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            spliced_turns,
            ..
        } = self;
        for demo in &archive.demos {
            // Demos of saved games that did not migrate do not either.
            let Some(saved) = store.saved_games().get(demo.saved_game_id) else {
                debug!(demo = demo.id, "skipping demo of an unmigrated saved game");
                continue;
            };
            let checksum = delve_store::commands::command_checksum(&saved.commands);
            let extra_turns = spliced_turns.get(&demo.saved_game_id).copied().unwrap_or(0);
            message_worklist.insert(demo.description_mid);
            store.demos_mut().insert(Demo {
                id: demo.id,
                saved_game_id: demo.saved_game_id,
                description_mid: demo.description_mid,
                begin_turn: demo.begin_turn,
                end_turn: demo.end_turn + extra_turns,
                next_demo_id: legacy::optional_id(demo.next_demo_id),
                checksum,
            });
            store.raise_counter(EntityKind::Demo, demo.id);
        }
        clear_dangling_demo_links(store);
        Ok(())
    }

    fn copy_players(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            ..
        } = self;
        for player in &archive.players {
            if player.id == patches::PLACEHOLDER_PLAYER_ID {
                continue;
            }
            message_worklist.insert(player.name_mid);
            message_worklist.insert(player.email_mid);
            store.players_mut().insert(Player {
                id: player.id,
                is_local: player.is_local,
                name_mid: player.name_mid,
                email_mid: player.email_mid,
                // Backfilled once the text rows are in place.
                original_name_mid: None,
                created: player.created,
                last_updated: player.last_updated,
                settings: player.settings.clone(),
            });
            store.raise_counter(EntityKind::Player, player.id);
        }
        Ok(())
    }

    /// Copies the text rows of every message the worklist collected, then
    /// raises the message counters past everything copied.
    fn copy_message_texts(&mut self, store: &mut Datastore) -> ImportResult<()> {
        let Importer {
            archive,
            message_worklist,
            ..
        } = self;
        for row in &archive.message_texts {
            if !message_worklist.contains(&row.message_id) {
                continue;
            }
            let language = Language::from_code(row.language).ok_or_else(|| {
                ImportError::SourceInvalid(format!(
                    "message text {} has unknown language code {}",
                    row.id, row.language
                ))
            })?;
            store.message_texts_mut().insert(MessageTextRow {
                id: row.id,
                message_id: row.message_id,
                language,
                text: row.text.clone(),
            });
            store.raise_counter(EntityKind::Message, row.message_id);
            store.raise_counter(EntityKind::MessageText, row.id);
        }
        Ok(())
    }
}

/// Re-derives tar mother eye facing from placement parity and decodes the
/// rest of the roster.
fn convert_monsters(room: &LegacyRoom) -> ImportResult<Vec<Monster>> {
    let mut monsters = Vec::with_capacity(room.monsters.len());
    let mut eyes_seen = 0usize;
    for monster in &room.monsters {
        let kind = legacy::monster_kind(monster.kind).ok_or_else(|| {
            ImportError::SourceInvalid(format!(
                "room {} has unknown monster code {}",
                room.id, monster.kind
            ))
        })?;
        let orientation = if kind == MonsterKind::TarMother {
            let derived = if eyes_seen % 2 == 0 {
                Orientation::West
            } else {
                Orientation::East
            };
            eyes_seen += 1;
            if patches::is_eye_exception(room.room_x, room.room_y, monster.x, monster.y) {
                flip_eye(derived)
            } else {
                derived
            }
        } else {
            Orientation::from_index(monster.orientation).ok_or_else(|| {
                ImportError::SourceInvalid(format!(
                    "room {} has unknown orientation code {}",
                    room.id, monster.orientation
                ))
            })?
        };
        monsters.push(Monster {
            kind,
            x: monster.x,
            y: monster.y,
            orientation,
        });
    }
    Ok(monsters)
}

fn flip_eye(orientation: Orientation) -> Orientation {
    match orientation {
        Orientation::West => Orientation::East,
        _ => Orientation::West,
    }
}

fn convert_orb(orb: &LegacyOrb) -> ImportResult<Orb> {
    let agents = orb
        .agents
        .iter()
        .map(|agent| {
            let action = legacy::orb_agent_action(agent.action).ok_or_else(|| {
                ImportError::SourceInvalid(format!(
                    "orb at ({}, {}) has unknown agent action {}",
                    orb.x, orb.y, agent.action
                ))
            })?;
            Ok(OrbAgent {
                action,
                x: agent.x,
                y: agent.y,
            })
        })
        .collect::<ImportResult<Vec<OrbAgent>>>()?;
    Ok(Orb {
        x: orb.x,
        y: orb.y,
        agents,
    })
}

/// Clears sequence links pointing at demos that did not migrate.
fn clear_dangling_demo_links(store: &mut Datastore) {
    let dangling: Vec<_> = store
        .demos()
        .iter()
        .filter(|demo| {
            demo.next_demo_id
                .is_some_and(|next| !store.demos().contains(next))
        })
        .map(|demo| demo.id)
        .collect();
    for id in dangling {
        if let Some(demo) = store.demos_mut().get_mut(id) {
            demo.next_demo_id = None;
        }
    }
}

/// Reinstalls the basic interface messages from a directory of text
/// sources, assigning ids through the manifest kept alongside them.
fn install_text_sources(store: &mut Datastore, dir: &Path) -> ImportResult<()> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    let mut manifest = IdManifest::load(&manifest_path)?;

    let mut sources: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt") && *path != manifest_path)
        .collect();
    sources.sort();

    store.delete_basic_messages();
    for path in &sources {
        let text = fs::read_to_string(path)?;
        let groups = textsource::parse_text_source(&text)?;
        textsource::install_messages(store, &groups, &mut manifest)?;
        debug!(file = %path.display(), groups = groups.len(), "installed text source");
    }
    manifest.save(&manifest_path)?;
    Ok(())
}

/// Gives every player without one an original name copied from their
/// current name. Players whose name resolves empty are dropped.
fn backfill_original_names(store: &mut Datastore) -> ImportResult<()> {
    let pending: Vec<_> = store
        .players()
        .iter()
        .filter(|player| player.original_name_mid.is_none())
        .map(|player| (player.id, player.name_mid))
        .collect();
    let mut dropped = 0usize;
    for (player_id, name_mid) in pending {
        let name = store.message_text(name_mid);
        if name.is_empty() {
            store.players_mut().remove(player_id);
            dropped += 1;
            continue;
        }
        let original_mid = store.add_message_text(&name);
        if let Some(player) = store.players_mut().get_mut(player_id) {
            player.original_name_mid = Some(original_mid);
            player.touch();
        }
    }
    if dropped > 0 {
        info!(dropped, "dropped players with empty names");
    }
    Ok(())
}
