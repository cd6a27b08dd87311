use std::path::Path;
use std::process::{Command, Output};

use delve_import::legacy::{
    self, LegacyArchive, LegacyHold, LegacyLevel, LegacyMessageText, LegacyPlayer, LegacyRoom,
    SourceVersion,
};
use delve_store::{encode_utf16le, tiles};
use tempfile::tempdir;

fn cli(path: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_delve-data"));
    cmd.arg("--path").arg(path).args(args);
    cmd.output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Pulls one view's row count out of `summarize` output.
fn view_count(stdout: &str, view: &str) -> usize {
    for line in stdout.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some(view) {
            return parts.next().unwrap().parse().unwrap();
        }
    }
    panic!("no `{view}` line in:\n{stdout}");
}

fn text_row(id: u32, message_id: u32, text: &str) -> LegacyMessageText {
    LegacyMessageText {
        id,
        message_id,
        language: 1,
        text: encode_utf16le(text),
    }
}

fn blank_squares() -> Vec<u8> {
    let area = (38 * 32) as usize;
    let mut squares = vec![tiles::T_FLOOR; area];
    squares.resize(2 * area, tiles::T_NOTHING);
    squares
}

/// One hold with one room and one player, enough to watch counts move.
fn tiny_archive() -> LegacyArchive {
    let mut archive = LegacyArchive::default();
    archive.counters.hold = 1;
    archive.counters.level = 1;
    archive.counters.room = 1;
    archive.counters.player = 1;
    archive.holds.push(LegacyHold {
        id: 1,
        name_mid: 10001,
        description_mid: 10002,
        first_level_id: 1,
        owner_player_id: 1,
        edit_access: 0,
    });
    archive.levels.push(LegacyLevel {
        id: 1,
        hold_id: 1,
        owner_player_id: 1,
        name_mid: 10003,
        description_mid: 10004,
        room_x: 50,
        room_y: 9001,
        entry_x: 1,
        entry_y: 1,
        entry_orientation: 0,
        required_rooms: Vec::new(),
    });
    archive.rooms.push(LegacyRoom {
        id: 1,
        level_id: 1,
        room_x: 50,
        room_y: 9001,
        width: 38,
        height: 32,
        style_id: 1,
        squares: blank_squares(),
        orbs: Vec::new(),
        monsters: Vec::new(),
        scrolls: Vec::new(),
    });
    archive.players.push(LegacyPlayer {
        id: 1,
        is_local: true,
        name_mid: 10005,
        email_mid: 10006,
        created: 10,
        last_updated: 20,
        settings: Vec::new(),
    });
    archive.message_texts = vec![
        text_row(1, 10001, "Tiny Hold"),
        text_row(2, 10002, "One room."),
        text_row(3, 10003, "The Room"),
        text_row(4, 10004, "It is small."),
        text_row(5, 10005, "Kit"),
        text_row(6, 10006, "kit@example.com"),
    ];
    archive
}

/// Just a player, for exercising the profile path.
fn profile_archive() -> LegacyArchive {
    let mut archive = LegacyArchive::default();
    archive.counters.player = 5;
    archive.players.push(LegacyPlayer {
        id: 5,
        is_local: false,
        name_mid: 20001,
        email_mid: 20002,
        created: 30,
        last_updated: 40,
        settings: Vec::new(),
    });
    archive.message_texts = vec![
        text_row(1, 20001, "Ann"),
        text_row(2, 20002, "ann@example.com"),
    ];
    archive
}

#[test]
fn test_create_and_summarize_store() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");

    let output = cli(&data, &["create"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(stdout_of(&output).contains("created an empty store"));

    let output = cli(&data, &["summarize"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("current-format store"));
    assert_eq!(view_count(&stdout, "Holds"), 0);
    assert_eq!(view_count(&stdout, "Players"), 0);
}

#[test]
fn test_create_and_summarize_legacy_archive() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("old.da1");

    let output = cli(&archive, &["create", "--version", "1.5"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let output = cli(&archive, &["summarize"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("version 1.5 legacy archive"));
    assert_eq!(view_count(&stdout, "Holds"), 0);
}

#[test]
fn test_create_rejects_unknown_version() {
    let dir = tempdir().unwrap();
    let output = cli(&dir.path().join("x"), &["create", "--version", "2.0"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("unknown version"));
}

#[test]
fn test_delete_requires_confirmation() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    assert!(cli(&data, &["create"]).status.success());

    let output = cli(&data, &["delete"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("--yes"));
    assert!(data.exists());

    let output = cli(&data, &["delete", "--yes"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(!data.exists());
}

#[test]
fn test_full_import_round_trip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("tiny.da1");
    legacy::write_archive(&source, SourceVersion::V1_11c, &tiny_archive()).unwrap();
    let data = dir.path().join("data");

    let output = cli(&data, &["import", source.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(stdout_of(&output).contains("imported 1 holds"));

    let output = cli(&data, &["summarize"]);
    let stdout = stdout_of(&output);
    assert_eq!(view_count(&stdout, "Holds"), 1);
    assert_eq!(view_count(&stdout, "Rooms"), 1);
    assert_eq!(view_count(&stdout, "Players"), 1);
}

#[test]
fn test_profile_import_prints_progress() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("tiny.da1");
    legacy::write_archive(&seed, SourceVersion::V1_11c, &tiny_archive()).unwrap();
    let profile = dir.path().join("ann.da1");
    legacy::write_archive(&profile, SourceVersion::V1_5, &profile_archive()).unwrap();
    let data = dir.path().join("data");

    assert!(
        cli(&data, &["import", seed.to_str().unwrap()])
            .status
            .success()
    );

    let output = cli(&data, &["import", "--profile", profile.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("100%"));
    assert!(stdout.contains("profile import complete"));

    let output = cli(&data, &["summarize"]);
    assert_eq!(view_count(&stdout_of(&output), "Players"), 2);
}
