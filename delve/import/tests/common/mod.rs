#![allow(dead_code)]

use std::path::Path;

use delve_common::{Language, StoreConfig};
use delve_import::legacy::{
    LegacyArchive, LegacyDemo, LegacyHold, LegacyLevel, LegacyMessageText, LegacyMonster,
    LegacyOrb, LegacyOrbAgent, LegacyPlayer, LegacyRoom, LegacySavedGame, LegacyScroll,
};
use delve_store::commands::{self, CMD_E, CMD_N, CMD_S, CMD_SE, CMD_W, CMD_WAIT, CommandEntry};
use delve_store::{Datastore, encode_utf16le, tiles};

pub const ROOM_WIDTH: u32 = 38;
pub const ROOM_HEIGHT: u32 = 32;

/// Floor-filled opaque layer over an empty transparent layer.
pub fn blank_squares() -> Vec<u8> {
    let area = (ROOM_WIDTH * ROOM_HEIGHT) as usize;
    let mut squares = vec![tiles::T_FLOOR; area];
    squares.resize(2 * area, tiles::T_NOTHING);
    squares
}

pub fn set_opaque(squares: &mut [u8], x: u32, y: u32, tile: u8) {
    squares[(y * ROOM_WIDTH + x) as usize] = tile;
}

pub fn set_transparent(squares: &mut [u8], x: u32, y: u32, tile: u8) {
    let area = (ROOM_WIDTH * ROOM_HEIGHT) as usize;
    squares[area + (y * ROOM_WIDTH + x) as usize] = tile;
}

pub fn text_row(id: u32, message_id: u32, language: Language, text: &str) -> LegacyMessageText {
    LegacyMessageText {
        id,
        message_id,
        language: language.code(),
        text: encode_utf16le(text),
    }
}

pub fn pack(entries: &[(u8, u16)]) -> Vec<u8> {
    let entries: Vec<CommandEntry> = entries
        .iter()
        .map(|&(command, delay)| CommandEntry::new(command, delay))
        .collect();
    commands::pack_commands(&entries)
}

/// Eight-entry log behind saved game 10001; its splice inserts at 4.
pub fn walk_eight() -> Vec<u8> {
    pack(&[
        (CMD_N, 0),
        (CMD_N, 1),
        (CMD_E, 0),
        (CMD_E, 2),
        (CMD_SE, 1),
        (CMD_S, 0),
        (CMD_W, 3),
        (CMD_WAIT, 2),
    ])
}

/// Fourteen-entry log behind saved game 10004; its splice inserts two
/// entries at 11. One delay needs the extended encoding.
pub fn walk_fourteen() -> Vec<u8> {
    pack(&[
        (CMD_E, 0),
        (CMD_E, 1),
        (CMD_E, 300),
        (CMD_S, 0),
        (CMD_S, 1),
        (CMD_W, 0),
        (CMD_W, 1),
        (CMD_N, 2),
        (CMD_N, 0),
        (CMD_E, 1),
        (CMD_S, 4),
        (CMD_S, 0),
        (CMD_W, 1),
        (CMD_WAIT, 5),
    ])
}

/// A trimmed copy of the original campaign data: one hold, two levels,
/// three rooms, two players with progress, and the two demo saved games
/// the command splices target. Counters match the highest id per entity.
pub fn dugan_archive() -> LegacyArchive {
    let mut archive = LegacyArchive::default();
    archive.counters.hold = 1;
    archive.counters.level = 2;
    archive.counters.room = 3;
    archive.counters.saved_game = 10004;
    archive.counters.demo = 2;
    archive.counters.player = 2;

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
        room_y: 150,
        entry_x: 17,
        entry_y: 29,
        entry_orientation: 4,
        required_rooms: vec![1],
    });
    archive.levels.push(LegacyLevel {
        id: 2,
        hold_id: 1,
        owner_player_id: 1,
        name_mid: 10005,
        description_mid: 10006,
        room_x: 50,
        room_y: 250,
        entry_x: 5,
        entry_y: 5,
        entry_orientation: 0,
        required_rooms: vec![2],
    });

    // The level 1 entrance room, at the coordinate the exit map patches.
    let mut squares = blank_squares();
    for x in 17..=20 {
        for y in 28..=31 {
            set_opaque(&mut squares, x, y, tiles::T_STAIRS);
        }
    }
    set_transparent(&mut squares, 5, 5, tiles::T_SCROLL);
    archive.rooms.push(LegacyRoom {
        id: 1,
        level_id: 1,
        room_x: 50,
        room_y: 150,
        width: ROOM_WIDTH,
        height: ROOM_HEIGHT,
        style_id: 1,
        squares,
        orbs: Vec::new(),
        monsters: vec![LegacyMonster {
            kind: 0,
            x: 10,
            y: 10,
            orientation: 4,
        }],
        scrolls: vec![LegacyScroll {
            x: 5,
            y: 5,
            text_mid: 10007,
        }],
    });

    // Tar room with an eye pair; (20, 11) is a listed facing exception.
    let mut squares = blank_squares();
    set_transparent(&mut squares, 19, 11, tiles::T_TAR);
    set_transparent(&mut squares, 20, 11, tiles::T_TAR);
    archive.rooms.push(LegacyRoom {
        id: 2,
        level_id: 2,
        room_x: 50,
        room_y: 250,
        width: ROOM_WIDTH,
        height: ROOM_HEIGHT,
        style_id: 2,
        squares,
        orbs: Vec::new(),
        monsters: vec![
            LegacyMonster {
                kind: 8,
                x: 19,
                y: 11,
                orientation: 3,
            },
            LegacyMonster {
                kind: 8,
                x: 20,
                y: 11,
                orientation: 3,
            },
            LegacyMonster {
                kind: 0,
                x: 4,
                y: 4,
                orientation: 2,
            },
        ],
        scrolls: Vec::new(),
    });

    // Orb room: the orb at (10, 10) toggles the yellow door at (15, 10).
    let mut squares = blank_squares();
    set_opaque(&mut squares, 15, 10, tiles::T_DOOR_YELLOW);
    set_transparent(&mut squares, 10, 10, tiles::T_ORB);
    archive.rooms.push(LegacyRoom {
        id: 3,
        level_id: 2,
        room_x: 51,
        room_y: 250,
        width: ROOM_WIDTH,
        height: ROOM_HEIGHT,
        style_id: 2,
        squares,
        orbs: vec![LegacyOrb {
            x: 10,
            y: 10,
            agents: vec![LegacyOrbAgent {
                action: 0,
                x: 15,
                y: 10,
            }],
        }],
        monsters: Vec::new(),
        scrolls: Vec::new(),
    });

    // A placeholder continue slot and the two patched demo games.
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
    archive.saved_games.push(LegacySavedGame {
        id: 10001,
        player_id: 1,
        room_id: 1,
        checkpoint_x: 17,
        checkpoint_y: 29,
        explored_rooms: vec![1],
        conquered_rooms: vec![1],
        commands: walk_eight(),
    });
    archive.saved_games.push(LegacySavedGame {
        id: 10004,
        player_id: 2,
        room_id: 2,
        checkpoint_x: 5,
        checkpoint_y: 5,
        explored_rooms: vec![1, 2],
        conquered_rooms: vec![1],
        commands: walk_fourteen(),
    });

    // Stale checksums; migration recomputes them over the patched logs.
    archive.demos.push(LegacyDemo {
        id: 1,
        saved_game_id: 10001,
        description_mid: 10012,
        begin_turn: 0,
        end_turn: 8,
        next_demo_id: 2,
        checksum: 0xDEAD,
    });
    archive.demos.push(LegacyDemo {
        id: 2,
        saved_game_id: 10004,
        description_mid: 10013,
        begin_turn: 2,
        end_turn: 14,
        next_demo_id: 0,
        checksum: 0xBEEF,
    });

    archive.players.push(LegacyPlayer {
        id: 1,
        is_local: true,
        name_mid: 10008,
        email_mid: 10009,
        created: 100,
        last_updated: 200,
        settings: vec![1, 2, 3],
    });
    archive.players.push(LegacyPlayer {
        id: 2,
        is_local: false,
        name_mid: 10010,
        email_mid: 10011,
        created: 300,
        last_updated: 400,
        settings: Vec::new(),
    });

    archive.message_texts = vec![
        text_row(1, 10001, Language::English, "Dugan's Dungeon"),
        text_row(2, 10001, Language::French, "Le Donjon de Dugan"),
        text_row(3, 10002, Language::English, "Twenty-five levels of peril."),
        text_row(4, 10003, Language::English, "Level One"),
        text_row(5, 10004, Language::English, "The antechamber."),
        text_row(6, 10005, Language::English, "Level Two"),
        text_row(7, 10006, Language::English, "Deeper down."),
        text_row(8, 10007, Language::English, "Beware the roach queen."),
        text_row(9, 10008, Language::English, "Beethro"),
        text_row(10, 10009, Language::English, "beethro@example.com"),
        text_row(11, 10010, Language::English, "Halph"),
        text_row(12, 10011, Language::English, ""),
        text_row(13, 10012, Language::English, "First steps"),
        text_row(14, 10013, Language::English, "Roach hunt"),
    ];

    archive
}

/// Creates an empty destination store under `dir`.
pub fn fresh_store(dir: &Path) -> (StoreConfig, Datastore) {
    let config = StoreConfig::new(dir.join("data"));
    let store = Datastore::create(config.clone()).unwrap();
    (config, store)
}
