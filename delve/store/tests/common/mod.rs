//! Shared fixtures for store integration tests.
#![allow(dead_code)]

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use delve_common::Orientation;
use delve_store::records::{EditAccess, Hold, Level, Room};
use delve_store::tiles;

pub fn sample_hold(id: u32, name_mid: u32, owner_player_id: u32) -> Hold {
    Hold {
        id,
        name_mid,
        description_mid: name_mid + 1,
        first_level_id: None,
        owner_player_id,
        edit_access: EditAccess::OwnerOnly,
    }
}

pub fn sample_level(id: u32, hold_id: u32, name_mid: u32) -> Level {
    Level {
        id,
        hold_id,
        owner_player_id: 1,
        name_mid,
        description_mid: name_mid + 1,
        room_x: 50,
        room_y: 50,
        entry_x: 15,
        entry_y: 27,
        entry_orientation: Orientation::North,
        required_rooms: Vec::new(),
    }
}

pub fn sample_room(id: u32, level_id: u32, room_x: u32, room_y: u32) -> Room {
    let width = 38u32;
    let height = 32u32;
    let mut squares = vec![tiles::T_FLOOR; (width * height) as usize];
    squares.resize(2 * (width * height) as usize, tiles::T_NOTHING);
    Room {
        id,
        level_id,
        room_x,
        room_y,
        width,
        height,
        style_id: 1,
        squares,
        orbs: Vec::new(),
        monsters: Vec::new(),
        scrolls: Vec::new(),
        exits: Vec::new(),
    }
}

/// Flips the final byte of a file, which lands in the payload region and
/// breaks its checksum.
pub fn corrupt_last_byte<P: AsRef<Path>>(path: P) {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .unwrap();
    let end = file.metadata().unwrap().len();
    file.seek(SeekFrom::Start(end - 1)).unwrap();
    let mut byte = [0u8; 1];
    file.read_exact(&mut byte).unwrap();
    file.seek(SeekFrom::Start(end - 1)).unwrap();
    file.write_all(&[byte[0] ^ 0xFF]).unwrap();
}
