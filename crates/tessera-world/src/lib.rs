//! World model for Tessera.
//!
//! Everything a session needs to know about the game itself, with no
//! networking:
//!
//! - [`World`]: the tile grid loaded from a map file, plus the roster of
//!   online players
//! - [`Player`]: one character's position and vitals, with validated
//!   movement
//! - [`vocation`] / [`spell_by_words`]: the static class and spell tables
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← owns a Player, mutates it per message
//!     ↕
//! World Layer (this crate)  ← grid queries, stat rules, game tables
//! ```

mod error;
mod map;
mod player;
mod registry;
mod tile;
mod world;

pub use error::WorldError;
pub use map::{MapDescription, SpawnPoint, DEFAULT_TILE_SIZE};
pub use player::{Player, PlayerId, Position};
pub use registry::{
    near_miss, spell_by_words, spells, vocation, SpellDefinition, SpellEffect,
    VocationId, VocationStats,
};
pub use tile::TileKind;
pub use world::World;
