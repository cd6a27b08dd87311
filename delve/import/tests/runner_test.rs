mod common;

use std::path::Path;

use common::{dugan_archive, fresh_store, text_row, walk_eight};
use delve_common::{EntityKind, Language, StoreConfig};
use delve_import::engine::{ImportStep, Importer};
use delve_import::error::ImportError;
use delve_import::legacy::{
    self, LegacyArchive, LegacyDemo, LegacyPlayer, LegacySavedGame, SourceVersion,
};
use delve_import::runner::{ImportTask, TaskStatus};
use delve_store::commands::{self, CMD_WAIT, CommandEntry};
use delve_store::{Datastore, OpenStatus};
use tempfile::tempdir;

/// Fills the destination with the stock dungeon so profile imports land
/// in a store that already has holds, rooms and two players.
fn seed_destination(dir: &Path) -> StoreConfig {
    let source = dir.join("seed.da1");
    legacy::write_archive(&source, SourceVersion::V1_11c, &dugan_archive()).unwrap();
    let (config, mut store) = fresh_store(dir);
    Importer::open(&source)
        .unwrap()
        .run_full(&mut store, None)
        .unwrap();
    config
}

/// A friend's archive: one player, their saved game and demo, plus the
/// placeholder continue slot and a demo hanging off it.
fn ann_archive() -> LegacyArchive {
    let mut archive = LegacyArchive::default();
    archive.counters.saved_game = 10001;
    archive.counters.demo = 2;
    archive.counters.player = 5;
    archive.players.push(LegacyPlayer {
        id: 5,
        is_local: false,
        name_mid: 30001,
        email_mid: 30002,
        created: 700,
        last_updated: 800,
        settings: vec![9],
    });
    archive.saved_games.push(LegacySavedGame {
        id: 10001,
        player_id: 5,
        room_id: 1,
        checkpoint_x: 3,
        checkpoint_y: 3,
        explored_rooms: vec![1],
        conquered_rooms: vec![1],
        commands: walk_eight(),
    });
    archive.saved_games.push(LegacySavedGame {
        id: 3,
        player_id: 0,
        room_id: 1,
        checkpoint_x: 0,
        checkpoint_y: 0,
        explored_rooms: Vec::new(),
        conquered_rooms: Vec::new(),
        commands: Vec::new(),
    });
    archive.demos.push(LegacyDemo {
        id: 1,
        saved_game_id: 10001,
        description_mid: 30003,
        begin_turn: 0,
        end_turn: 8,
        next_demo_id: 2,
        checksum: 0xF00D,
    });
    archive.demos.push(LegacyDemo {
        id: 2,
        saved_game_id: 3,
        description_mid: 30004,
        begin_turn: 0,
        end_turn: 0,
        next_demo_id: 0,
        checksum: 0,
    });
    archive.message_texts = vec![
        text_row(1, 30001, Language::English, "Ann"),
        text_row(2, 30002, Language::English, "ann@example.com"),
        text_row(3, 30003, Language::English, "Run one"),
        text_row(4, 30004, Language::English, "Never copied"),
    ];
    archive
}

#[test]
fn test_profile_import_remaps_onto_fresh_ids() {
    let dir = tempdir().unwrap();
    let config = seed_destination(dir.path());
    let source = dir.path().join("ann.da1");
    legacy::write_archive(&source, SourceVersion::V1_5, &ann_archive()).unwrap();

    // 1. Drive the task tick by tick, watching progress.
    let mut task = ImportTask::new(config.clone());
    assert_eq!(task.status(), TaskStatus::NotStarted);
    task.start(&source).unwrap();
    assert_eq!(task.status(), TaskStatus::InProgress);

    let mut last_percent = 0;
    let mut ticks = 0;
    loop {
        let report = task.tick();
        assert!(report.percent >= last_percent, "progress went backwards");
        last_percent = report.percent;
        if report.status != TaskStatus::InProgress {
            break;
        }
        ticks += 1;
        assert!(ticks < 20, "task never finished");
    }
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.percent(), 100);

    // Ticking a finished task changes nothing.
    let report = task.tick();
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.percent, 100);

    // 2. Reopen the destination and check the remapping.
    let (store, status) = Datastore::open(config).unwrap();
    assert_eq!(status, OpenStatus::Clean);

    // Ann landed on the next free player id, after Beethro and Halph.
    assert_eq!(store.counter(EntityKind::Player), 3);
    let ann = store.players().get(3).unwrap();
    assert!(!ann.is_local);
    assert_eq!(store.message_text(ann.name_mid), "Ann");
    assert_eq!(store.message_text(ann.email_mid), "ann@example.com");
    let original_mid = ann.original_name_mid.unwrap();
    assert_ne!(original_mid, ann.name_mid);
    assert_eq!(store.message_text(original_mid), "Ann");
    assert_eq!(ann.created, 700);
    assert_eq!(ann.last_updated, 800);

    // Her saved game took a fresh id but kept its source-id splice, and
    // the placeholder slot did not come along.
    assert_eq!(store.counter(EntityKind::SavedGame), 10005);
    let saved = store.saved_games().get(10005).unwrap();
    assert_eq!(saved.player_id, 3);
    assert_eq!(saved.room_id, 1);
    let entries = commands::unpack_commands(&saved.commands).unwrap();
    assert_eq!(entries.len(), 9);
    assert_eq!(entries[4], CommandEntry::new(CMD_WAIT, 1));

    // Demo 1 copied as demo 3; demo 2 hung off the placeholder slot, so
    // the sequence link has nowhere to go.
    assert_eq!(store.counter(EntityKind::Demo), 3);
    let demo = store.demos().get(3).unwrap();
    assert_eq!(demo.saved_game_id, 10005);
    assert_eq!(demo.end_turn, 9);
    assert_eq!(demo.next_demo_id, None);
    assert_eq!(demo.checksum, commands::command_checksum(&saved.commands));
    assert_eq!(store.message_text(demo.description_mid), "Run one");
    assert_eq!(store.demos().len(), 3);

    // 3. The seeded rows are untouched.
    let beethro = store.players().get(1).unwrap();
    assert_eq!(store.message_text(beethro.name_mid), "Beethro");
    assert!(store.saved_games().contains(10001));
    assert!(store.saved_games().contains(10004));
}

#[test]
fn test_start_while_running_reports_busy() {
    let dir = tempdir().unwrap();
    let config = seed_destination(dir.path());
    let source = dir.path().join("ann.da1");
    legacy::write_archive(&source, SourceVersion::V1_5, &ann_archive()).unwrap();

    let mut task = ImportTask::new(config);
    task.start(&source).unwrap();
    assert!(matches!(task.start(&source), Err(ImportError::TaskBusy)));

    task.tick();
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert!(matches!(task.start(&source), Err(ImportError::TaskBusy)));

    // Cancelling frees the slot again.
    task.cancel();
    task.start(&source).unwrap();
}

#[test]
fn test_cancel_discards_uncommitted_work() {
    let dir = tempdir().unwrap();
    let config = seed_destination(dir.path());
    let source = dir.path().join("ann.da1");
    legacy::write_archive(&source, SourceVersion::V1_5, &ann_archive()).unwrap();

    let mut task = ImportTask::new(config.clone());
    task.start(&source).unwrap();
    // Open the source, then copy the players, then walk away.
    task.tick();
    task.tick();
    task.cancel();
    assert_eq!(task.status(), TaskStatus::NotStarted);
    assert_eq!(task.percent(), 0);

    let (store, status) = Datastore::open(config).unwrap();
    assert_eq!(status, OpenStatus::Clean);
    assert_eq!(store.players().len(), 2);
    assert_eq!(store.counter(EntityKind::Player), 2);
}

#[test]
fn test_missing_source_fails_on_first_tick() {
    let dir = tempdir().unwrap();
    let config = seed_destination(dir.path());

    let mut task = ImportTask::new(config);
    task.start(dir.path().join("absent.da1")).unwrap();
    let report = task.tick();
    assert_eq!(report.status, TaskStatus::Failed);
    match task.failure().unwrap() {
        ImportError::StepFailed { step, .. } => assert_eq!(*step, ImportStep::OpenSource),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failed_step_leaves_the_destination_alone() {
    let dir = tempdir().unwrap();
    let config = seed_destination(dir.path());
    let source = dir.path().join("bad.da1");

    let mut archive = ann_archive();
    archive.message_texts[0].language = 9;
    legacy::write_archive(&source, SourceVersion::V1_5, &archive).unwrap();

    let mut task = ImportTask::new(config.clone());
    task.start(&source).unwrap();
    let mut ticks = 0;
    while task.tick().status == TaskStatus::InProgress {
        ticks += 1;
        assert!(ticks < 20, "task never settled");
    }
    assert_eq!(task.status(), TaskStatus::Failed);
    match task.failure().unwrap() {
        ImportError::StepFailed { step, .. } => assert_eq!(*step, ImportStep::Players),
        other => panic!("unexpected error: {other}"),
    }

    let (store, status) = Datastore::open(config).unwrap();
    assert_eq!(status, OpenStatus::Clean);
    assert_eq!(store.players().len(), 2);
    assert_eq!(store.counter(EntityKind::SavedGame), 10004);
}
