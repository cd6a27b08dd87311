//! Tile constants for the two room layers.
//!
//! The opaque layer holds terrain, the transparent layer holds pieces laid
//! on top of it. Values are stable on disk; append new tiles, never renumber.

/// Opaque layer.
pub const T_EMPTY: u8 = 0;
pub const T_FLOOR: u8 = 1;
pub const T_PIT: u8 = 2;
pub const T_STAIRS: u8 = 3;
pub const T_WALL: u8 = 4;
pub const T_WALL_BROKEN: u8 = 5;
pub const T_DOOR_YELLOW: u8 = 6;
pub const T_DOOR_YELLOW_OPEN: u8 = 7;
pub const T_DOOR_GREEN: u8 = 8;
pub const T_DOOR_BLUE: u8 = 9;
pub const T_TRAPDOOR: u8 = 10;
pub const T_OBSTACLE: u8 = 11;

/// Transparent layer.
pub const T_NOTHING: u8 = 0;
pub const T_ORB: u8 = 20;
pub const T_SCROLL: u8 = 21;
pub const T_POTION_INVISIBILITY: u8 = 22;
pub const T_POTION_MIMIC: u8 = 23;
pub const T_TAR: u8 = 24;
pub const T_CHECKPOINT: u8 = 25;
