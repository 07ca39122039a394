//! Map description file format and the built-in fallback map.
//!
//! A map file is JSON:
//!
//! ```json
//! { "width": 4, "height": 3, "tileSize": 32,
//!   "tiles": [2,2,2,2, 2,1,4,2, 2,2,2,2],
//!   "spawn": { "x": 1, "y": 1 } }
//! ```
//!
//! `tiles` is row-major. `spawn` is optional.

use serde::Deserialize;

use crate::TileKind;

/// Pixel size of one tile when the map file does not say otherwise.
pub const DEFAULT_TILE_SIZE: u16 = 32;

/// A map as it appears on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescription {
    pub width: u16,
    pub height: u16,
    #[serde(default = "default_tile_size")]
    pub tile_size: u16,
    pub tiles: Vec<u32>,
    #[serde(default)]
    pub spawn: Option<SpawnPoint>,
}

/// Preferred spawn cell in a map file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpawnPoint {
    pub x: u16,
    pub y: u16,
}

fn default_tile_size() -> u16 {
    DEFAULT_TILE_SIZE
}

/// Width of the built-in map.
const DEFAULT_WIDTH: u16 = 16;
/// Height of the built-in map.
const DEFAULT_HEIGHT: u16 = 12;
/// Spawn cell of the built-in map. Grass, one step in from the corner.
pub(crate) const BUILTIN_SPAWN: SpawnPoint = SpawnPoint { x: 2, y: 2 };

/// Built-in map layout as `(width, height, row-major tiles)`: a walled
/// meadow with a pond and a paved yard.
pub(crate) fn builtin_tiles() -> (u16, u16, Vec<TileKind>) {
    let (w, h) = (DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut tiles = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let kind = if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                TileKind::Wall
            } else if (9..=12).contains(&x) && (3..=5).contains(&y) {
                TileKind::Water
            } else if (3..=6).contains(&x) && (7..=9).contains(&y) {
                TileKind::Floor
            } else {
                TileKind::Grass
            };
            tiles.push(kind);
        }
    }
    (w, h, tiles)
}

impl MapDescription {
    /// The built-in map in file form, as it would appear on disk.
    pub fn builtin() -> Self {
        let (width, height, tiles) = builtin_tiles();
        Self {
            width,
            height,
            tile_size: DEFAULT_TILE_SIZE,
            tiles: tiles.iter().map(|t| t.code() as u32).collect(),
            spawn: Some(BUILTIN_SPAWN),
        }
    }
}
