//! Error types for the world layer.

use std::path::PathBuf;

use crate::VocationId;

/// Errors that can occur while loading a map or creating a player.
///
/// Map errors never escape [`World::load`](crate::World::load): it logs
/// them and falls back to the built-in grid.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The map file could not be read.
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The map file is not a valid map description.
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),

    /// Width or height is zero.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },

    /// The tile array does not match `width * height`.
    #[error("map has {actual} tiles, expected {expected}")]
    TileCountMismatch { expected: usize, actual: usize },

    /// A tile code that is not one of the known kinds.
    #[error("unknown tile code {code} at index {index}")]
    UnknownTile { index: usize, code: u32 },

    /// Every tile blocks movement, so there is nowhere to spawn.
    #[error("map has no walkable tile")]
    NoWalkableTile,

    /// The vocation table has no entry for this id.
    #[error("unknown vocation {0}")]
    UnknownVocation(VocationId),
}
