//! Tile classification.

use std::fmt;

/// What occupies a single grid cell.
///
/// The numeric values are the codes used in map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TileKind {
    /// Outside the map, or an intentionally empty cell.
    #[default]
    Void = 0,
    Grass = 1,
    Wall = 2,
    Water = 3,
    Floor = 4,
}

impl TileKind {
    /// Maps a file code to a tile kind. Unknown codes return `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Void),
            1 => Some(Self::Grass),
            2 => Some(Self::Wall),
            3 => Some(Self::Water),
            4 => Some(Self::Floor),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Wall, water and void stop movement.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Void | Self::Wall | Self::Water)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Grass => "grass",
            Self::Wall => "wall",
            Self::Water => "water",
            Self::Floor => "floor",
        };
        f.write_str(name)
    }
}
