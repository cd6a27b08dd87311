use serde::{Deserialize, Serialize};

/// Facing of a placed monster, eight compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::North,
        Orientation::NorthEast,
        Orientation::East,
        Orientation::SouthEast,
        Orientation::South,
        Orientation::SouthWest,
        Orientation::West,
        Orientation::NorthWest,
    ];

    /// Numeric code used by legacy data files, clockwise from north.
    pub fn index(self) -> u8 {
        match self {
            Orientation::North => 0,
            Orientation::NorthEast => 1,
            Orientation::East => 2,
            Orientation::SouthEast => 3,
            Orientation::South => 4,
            Orientation::SouthWest => 5,
            Orientation::West => 6,
            Orientation::NorthWest => 7,
        }
    }

    pub fn from_index(index: u8) -> Option<Orientation> {
        Orientation::ALL.get(usize::from(index)).copied()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::South
    }
}
