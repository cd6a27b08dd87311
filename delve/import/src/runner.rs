//! Resumable profile import.
//!
//! Player profiles move between data sets in small steps so a host UI can
//! drive the work, paint a progress figure, and cancel between ticks:
//!
//! ```text
//!   start(source)          tick()        tick()  ...          tick()
//!        |                   |             |                    |
//!   NotStarted -> InProgress(open-source, players, saved-games,
//!                  demos, save-all, close-source) -> Completed
//! ```
//!
//! Unlike the full migration the destination is a live store, so every
//! copied row gets a fresh id from its allocator and references between
//! copied rows are remapped. Room references stay as they are; a profile
//! only makes sense against a destination that already holds the same
//! game data. Nothing touches disk until the save-all step commits, so a
//! failure or cancellation before that leaves the destination unchanged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use delve_common::{EntityKind, Language, MessageId, RecordId, StoreConfig};
use delve_store::records::{Demo, MessageTextRow, Player, SavedGame};
use delve_store::{Datastore, OpenStatus, commands};
use tracing::{debug, warn};

use crate::engine::ImportStep;
use crate::error::{ImportError, ImportResult};
use crate::legacy::{self, LegacyArchive};
use crate::patches;

/// Where a task stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

/// Snapshot returned by [`ImportTask::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Progress from 0 to 100. Never decreases within a run.
    pub percent: u8,
    pub status: TaskStatus,
}

/// Steps after the source is open, in tick order.
const RUN_STEPS: [ImportStep; 5] = [
    ImportStep::Players,
    ImportStep::SavedGames,
    ImportStep::Demos,
    ImportStep::SaveAll,
    ImportStep::CloseSource,
];

enum TaskState {
    Idle,
    /// Armed by `start`; the first tick opens source and destination.
    Armed { source: PathBuf },
    Running(Box<RunState>),
    Completed,
    Failed(ImportError),
}

struct RunState {
    store: Datastore,
    archive: LegacyArchive,
    /// Index into [`RUN_STEPS`].
    step: usize,
    total_rows: usize,
    processed_rows: usize,
    player_map: HashMap<RecordId, RecordId>,
    saved_game_map: HashMap<RecordId, RecordId>,
    demo_map: HashMap<RecordId, RecordId>,
    /// Entries added to patched logs, keyed by source saved-game id.
    spliced_turns: HashMap<RecordId, u32>,
}

impl RunState {
    /// Row progress scaled to 0..=99; completion alone reports 100.
    fn progress_percent(&self) -> u8 {
        if self.total_rows == 0 {
            return 99;
        }
        ((self.processed_rows * 100 / self.total_rows) as u8).min(99)
    }
}

/// A profile import driven tick by tick.
pub struct ImportTask {
    config: StoreConfig,
    state: TaskState,
    percent: u8,
}

impl ImportTask {
    /// A task over the given destination. Nothing opens until the first
    /// tick after [`ImportTask::start`].
    pub fn new(config: StoreConfig) -> ImportTask {
        ImportTask {
            config,
            state: TaskState::Idle,
            percent: 0,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self.state {
            TaskState::Idle => TaskStatus::NotStarted,
            TaskState::Armed { .. } | TaskState::Running(_) => TaskStatus::InProgress,
            TaskState::Completed => TaskStatus::Completed,
            TaskState::Failed(_) => TaskStatus::Failed,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// The failure that ended the run, while the task reports
    /// [`TaskStatus::Failed`].
    pub fn failure(&self) -> Option<&ImportError> {
        match &self.state {
            TaskState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Arms the task with a source archive. A finished task can be
    /// started again; a running one cannot.
    pub fn start<P: AsRef<Path>>(&mut self, source: P) -> ImportResult<()> {
        if matches!(self.state, TaskState::Armed { .. } | TaskState::Running(_)) {
            return Err(ImportError::TaskBusy);
        }
        self.state = TaskState::Armed {
            source: source.as_ref().to_path_buf(),
        };
        self.percent = 0;
        Ok(())
    }

    /// Runs the next pending step and reports. Ticking a task that is not
    /// in progress changes nothing.
    pub fn tick(&mut self) -> TickReport {
        let state = std::mem::replace(&mut self.state, TaskState::Idle);
        self.state = match state {
            TaskState::Armed { source } => self.open_source(&source),
            TaskState::Running(run) => self.run_step(*run),
            finished => finished,
        };
        self.report()
    }

    /// Abandons the run between ticks. Uncommitted work is discarded and
    /// the task returns to not-started.
    pub fn cancel(&mut self) {
        let state = std::mem::replace(&mut self.state, TaskState::Idle);
        if let TaskState::Running(mut run) = state {
            if let Err(err) = run.store.rollback() {
                warn!(error = %err, "rollback on cancelled import failed");
            }
        }
        self.percent = 0;
    }

    fn report(&self) -> TickReport {
        TickReport {
            percent: self.percent,
            status: self.status(),
        }
    }

    fn open_source(&mut self, source: &Path) -> TaskState {
        match self.try_open(source) {
            Ok(run) => TaskState::Running(Box::new(run)),
            Err(err) => self.fail(err.in_step(ImportStep::OpenSource)),
        }
    }

    fn try_open(&self, source: &Path) -> ImportResult<RunState> {
        let (version, archive) = legacy::read_archive(source)?;
        debug!(version = %version, "profile import source opened");
        let (store, open_status) = Datastore::open(self.config.clone())?;
        if open_status == OpenStatus::RestoredFromBackup {
            warn!("destination store was restored from backups before import");
        }
        let total_rows =
            archive.players.len() + archive.saved_games.len() + archive.demos.len();
        Ok(RunState {
            store,
            archive,
            step: 0,
            total_rows,
            processed_rows: 0,
            player_map: HashMap::new(),
            saved_game_map: HashMap::new(),
            demo_map: HashMap::new(),
            spliced_turns: HashMap::new(),
        })
    }

    fn run_step(&mut self, mut run: RunState) -> TaskState {
        let step = RUN_STEPS[run.step];
        let result = match step {
            ImportStep::Players => copy_players(&mut run),
            ImportStep::SavedGames => copy_saved_games(&mut run),
            ImportStep::Demos => copy_demos(&mut run),
            ImportStep::SaveAll => run.store.commit().map_err(ImportError::from),
            // Dropping the run state below closes the source.
            _ => Ok(()),
        };
        match result {
            Err(err) => {
                if let Err(rollback_err) = run.store.rollback() {
                    warn!(error = %rollback_err, "rollback after failed import step also failed");
                }
                self.fail(err.in_step(step))
            }
            Ok(()) => {
                self.percent = run.progress_percent();
                run.step += 1;
                if run.step == RUN_STEPS.len() {
                    self.percent = 100;
                    TaskState::Completed
                } else {
                    TaskState::Running(Box::new(run))
                }
            }
        }
    }

    fn fail(&mut self, err: ImportError) -> TaskState {
        warn!(error = %err, "profile import failed");
        TaskState::Failed(err)
    }
}

fn copy_players(run: &mut RunState) -> ImportResult<()> {
    let RunState {
        store,
        archive,
        player_map,
        processed_rows,
        ..
    } = run;
    for player in &archive.players {
        *processed_rows += 1;
        if player.id == patches::PLACEHOLDER_PLAYER_ID {
            continue;
        }
        let name_mid = copy_message(store, archive, player.name_mid)?;
        let original_name_mid = copy_message(store, archive, player.name_mid)?;
        let email_mid = copy_message(store, archive, player.email_mid)?;
        let id = store.next_id(EntityKind::Player);
        let mut row = Player::new(id, name_mid, email_mid);
        row.is_local = player.is_local;
        row.original_name_mid = Some(original_name_mid);
        row.created = player.created;
        row.last_updated = player.last_updated;
        row.settings = player.settings.clone();
        store.players_mut().insert(row);
        player_map.insert(player.id, id);
    }
    Ok(())
}

fn copy_saved_games(run: &mut RunState) -> ImportResult<()> {
    let RunState {
        store,
        archive,
        player_map,
        saved_game_map,
        spliced_turns,
        processed_rows,
        ..
    } = run;
    for saved in &archive.saved_games {
        *processed_rows += 1;
        if saved.player_id == patches::PLACEHOLDER_PLAYER_ID {
            debug!(saved_game = saved.id, "skipping placeholder continue slot");
            continue;
        }
        let Some(&player_id) = player_map.get(&saved.player_id) else {
            debug!(
                saved_game = saved.id,
                player = saved.player_id,
                "skipping saved game of a player that did not copy"
            );
            continue;
        };
        let (commands, added) = patches::apply_command_patches(saved.id, &saved.commands)?;
        if added > 0 {
            spliced_turns.insert(saved.id, added);
        }
        let id = store.next_id(EntityKind::SavedGame);
        store.saved_games_mut().insert(SavedGame {
            id,
            player_id,
            room_id: saved.room_id,
            checkpoint_x: saved.checkpoint_x,
            checkpoint_y: saved.checkpoint_y,
            explored_rooms: saved.explored_rooms.clone(),
            conquered_rooms: saved.conquered_rooms.clone(),
            commands,
        });
        saved_game_map.insert(saved.id, id);
    }
    Ok(())
}

fn copy_demos(run: &mut RunState) -> ImportResult<()> {
    let RunState {
        store,
        archive,
        saved_game_map,
        demo_map,
        spliced_turns,
        processed_rows,
        ..
    } = run;
    for demo in &archive.demos {
        *processed_rows += 1;
        let Some(&saved_game_id) = saved_game_map.get(&demo.saved_game_id) else {
            debug!(demo = demo.id, "skipping demo of a saved game that did not copy");
            continue;
        };
        let checksum = match store.saved_games().get(saved_game_id) {
            Some(saved) => commands::command_checksum(&saved.commands),
            None => demo.checksum,
        };
        let description_mid = copy_message(store, archive, demo.description_mid)?;
        let extra_turns = spliced_turns.get(&demo.saved_game_id).copied().unwrap_or(0);
        let id = store.next_id(EntityKind::Demo);
        store.demos_mut().insert(Demo {
            id,
            saved_game_id,
            description_mid,
            begin_turn: demo.begin_turn,
            end_turn: demo.end_turn + extra_turns,
            // Still the source id; remapped below once every demo is in.
            next_demo_id: legacy::optional_id(demo.next_demo_id),
            checksum,
        });
        demo_map.insert(demo.id, id);
    }

    let remapped: Vec<(RecordId, Option<RecordId>)> = demo_map
        .values()
        .filter_map(|&new_id| {
            let demo = store.demos().get(new_id)?;
            let source_next = demo.next_demo_id?;
            Some((new_id, demo_map.get(&source_next).copied()))
        })
        .collect();
    for (id, next_demo_id) in remapped {
        if let Some(demo) = store.demos_mut().get_mut(id) {
            demo.next_demo_id = next_demo_id;
        }
    }
    Ok(())
}

/// Copies every language row of a source message under a fresh id, so the
/// copy has its own life in the destination. A message with no rows still
/// gets a fresh empty one, keeping the reference resolvable.
fn copy_message(
    store: &mut Datastore,
    archive: &LegacyArchive,
    source_mid: MessageId,
) -> ImportResult<MessageId> {
    let rows: Vec<_> = archive
        .message_texts
        .iter()
        .filter(|row| row.message_id == source_mid)
        .collect();
    if rows.is_empty() {
        return Ok(store.add_message_text(""));
    }
    let message_id = store.next_id(EntityKind::Message);
    for row in rows {
        let language = Language::from_code(row.language).ok_or_else(|| {
            ImportError::SourceInvalid(format!(
                "message text {} has unknown language code {}",
                row.id, row.language
            ))
        })?;
        let id = store.next_id(EntityKind::MessageText);
        store.message_texts_mut().insert(MessageTextRow {
            id,
            message_id,
            language,
            text: row.text.clone(),
        });
    }
    Ok(message_id)
}
