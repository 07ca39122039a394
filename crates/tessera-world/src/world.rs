//! The shared world: an immutable tile grid plus the online-player roster.
//!
//! The grid never changes after construction, so any session can read it
//! without locking. The roster is mutated on join/leave and sits behind a
//! `tokio::sync::Mutex`.

use std::collections::HashMap;
use std::path::Path;

use tokio::sync::Mutex;

use crate::map::{builtin_tiles, BUILTIN_SPAWN};
use crate::{MapDescription, PlayerId, Position, TileKind, WorldError, DEFAULT_TILE_SIZE};

/// The game world shared by every session.
#[derive(Debug)]
pub struct World {
    width: u16,
    height: u16,
    tile_size: u16,
    /// Row-major, `width * height` entries.
    tiles: Vec<TileKind>,
    spawn: Position,
    /// Online players and their display names.
    players: Mutex<HashMap<PlayerId, String>>,
}

impl World {
    /// Builds a world from a parsed map description.
    ///
    /// # Errors
    /// Rejects zero dimensions, a tile array of the wrong length, unknown
    /// tile codes, and maps with no walkable tile.
    pub fn from_description(desc: MapDescription) -> Result<Self, WorldError> {
        if desc.width == 0 || desc.height == 0 {
            return Err(WorldError::InvalidDimensions {
                width: desc.width,
                height: desc.height,
            });
        }
        let expected = desc.width as usize * desc.height as usize;
        if desc.tiles.len() != expected {
            return Err(WorldError::TileCountMismatch {
                expected,
                actual: desc.tiles.len(),
            });
        }
        let tiles = desc
            .tiles
            .iter()
            .enumerate()
            .map(|(index, &code)| {
                TileKind::from_code(code)
                    .ok_or(WorldError::UnknownTile { index, code })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut world = Self {
            width: desc.width,
            height: desc.height,
            tile_size: desc.tile_size,
            tiles,
            spawn: Position::default(),
            players: Mutex::new(HashMap::new()),
        };
        world.spawn = world.pick_spawn(desc.spawn.map(|s| (s.x, s.y)))?;
        Ok(world)
    }

    /// Parses a JSON map description.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let desc: MapDescription = serde_json::from_str(json)?;
        Self::from_description(desc)
    }

    /// Reads and parses a map file.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            WorldError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&json)
    }

    /// Loads a map file, falling back to the built-in map on any error.
    ///
    /// A bad map never stops the server from starting.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(world) => {
                tracing::info!(
                    path = %path.display(),
                    width = world.width,
                    height = world.height,
                    "map loaded"
                );
                world
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "map load failed, using built-in map"
                );
                Self::default_grid()
            }
        }
    }

    /// The built-in map.
    ///
    /// Built straight from tile kinds, so there is nothing to validate.
    pub fn default_grid() -> Self {
        let (width, height, tiles) = builtin_tiles();
        Self {
            width,
            height,
            tile_size: DEFAULT_TILE_SIZE,
            tiles,
            spawn: Position::new(BUILTIN_SPAWN.x, BUILTIN_SPAWN.y),
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Chooses the requested spawn if it is walkable, else the first
    /// walkable tile in row-major order.
    fn pick_spawn(
        &self,
        requested: Option<(u16, u16)>,
    ) -> Result<Position, WorldError> {
        if let Some((x, y)) = requested {
            if self.is_walkable(x as i32, y as i32) {
                return Ok(Position::new(x, y));
            }
            tracing::warn!(x, y, "configured spawn is not walkable");
        }
        self.tiles
            .iter()
            .position(|t| !t.is_blocking())
            .map(|i| {
                let w = self.width as usize;
                Position::new((i % w) as u16, (i / w) as u16)
            })
            .ok_or(WorldError::NoWalkableTile)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn tile_size(&self) -> u16 {
        self.tile_size
    }

    /// Returns `true` if `(x, y)` lies on the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// The tile at `(x, y)`, or [`TileKind::Void`] off the grid.
    pub fn tile(&self, x: i32, y: i32) -> TileKind {
        if !self.in_bounds(x, y) {
            return TileKind::Void;
        }
        self.tiles[y as usize * self.width as usize + x as usize]
    }

    /// Returns `true` if a player may stand on `(x, y)`.
    ///
    /// Other players never block: several may share a cell.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        !self.tile(x, y).is_blocking()
    }

    /// Where new players appear. Always walkable.
    pub fn spawn_point(&self) -> Position {
        self.spawn
    }

    // -- Roster -------------------------------------------------------------

    /// Records a player as online. Replaces any previous entry for `id`.
    pub async fn add_player(&self, id: PlayerId, name: &str) {
        let mut players = self.players.lock().await;
        players.insert(id, name.to_string());
        tracing::info!(%id, name, online = players.len(), "player entered world");
    }

    /// Removes a player. Returns `false` if they were not online.
    pub async fn remove_player(&self, id: PlayerId) -> bool {
        let mut players = self.players.lock().await;
        let removed = players.remove(&id);
        if let Some(name) = &removed {
            tracing::info!(%id, name = %name, online = players.len(), "player left world");
        }
        removed.is_some()
    }

    pub async fn player_count(&self) -> usize {
        self.players.lock().await.len()
    }

    /// Display names of everyone online, sorted.
    pub async fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.players.lock().await.values().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 5x3:
    //   W W W W W
    //   W G F W ~
    //   W W W W W
    const SMALL: &str = r#"{
        "width": 5, "height": 3, "tileSize": 32,
        "tiles": [2,2,2,2,2, 2,1,4,2,3, 2,2,2,2,2],
        "spawn": {"x": 1, "y": 1}
    }"#;

    #[test]
    fn test_from_json_valid_map() {
        let world = World::from_json(SMALL).unwrap();

        assert_eq!(world.width(), 5);
        assert_eq!(world.height(), 3);
        assert_eq!(world.tile_size(), 32);
        assert_eq!(world.tile(1, 1), TileKind::Grass);
        assert_eq!(world.tile(2, 1), TileKind::Floor);
        assert_eq!(world.tile(4, 1), TileKind::Water);
        assert_eq!(world.spawn_point(), Position::new(1, 1));
    }

    #[test]
    fn test_tile_out_of_bounds_is_void() {
        let world = World::from_json(SMALL).unwrap();

        assert_eq!(world.tile(-1, 0), TileKind::Void);
        assert_eq!(world.tile(0, -1), TileKind::Void);
        assert_eq!(world.tile(5, 0), TileKind::Void);
        assert_eq!(world.tile(0, 3), TileKind::Void);
        assert_eq!(world.tile(i32::MAX, i32::MIN), TileKind::Void);
    }

    #[test]
    fn test_is_walkable_by_tile_kind() {
        let world = World::from_json(SMALL).unwrap();

        assert!(world.is_walkable(1, 1), "grass");
        assert!(world.is_walkable(2, 1), "floor");
        assert!(!world.is_walkable(3, 1), "wall");
        assert!(!world.is_walkable(4, 1), "water");
        assert!(!world.is_walkable(9, 9), "void");
    }

    #[test]
    fn test_from_json_zero_dimensions_rejected() {
        let result = World::from_json(r#"{"width":0,"height":3,"tiles":[]}"#);
        assert!(matches!(
            result,
            Err(WorldError::InvalidDimensions { width: 0, height: 3 })
        ));
    }

    #[test]
    fn test_from_json_tile_count_mismatch_rejected() {
        let result = World::from_json(r#"{"width":2,"height":2,"tiles":[1,1,1]}"#);
        assert!(matches!(
            result,
            Err(WorldError::TileCountMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_from_json_unknown_tile_rejected() {
        let result = World::from_json(r#"{"width":2,"height":1,"tiles":[1,9]}"#);
        assert!(matches!(
            result,
            Err(WorldError::UnknownTile { index: 1, code: 9 })
        ));
    }

    #[test]
    fn test_from_json_all_blocking_rejected() {
        let result = World::from_json(r#"{"width":2,"height":1,"tiles":[2,3]}"#);
        assert!(matches!(result, Err(WorldError::NoWalkableTile)));
    }

    #[test]
    fn test_from_json_malformed_returns_parse_error() {
        let result = World::from_json("{ not json");
        assert!(matches!(result, Err(WorldError::Parse(_))));
    }

    #[test]
    fn test_spawn_on_blocking_tile_falls_back_to_first_walkable() {
        let json = r#"{"width":3,"height":1,"tiles":[2,2,1],"spawn":{"x":0,"y":0}}"#;

        let world = World::from_json(json).unwrap();

        assert_eq!(world.spawn_point(), Position::new(2, 0));
    }

    #[test]
    fn test_default_grid_spawn_is_walkable() {
        let world = World::default_grid();
        let spawn = world.spawn_point();

        assert!(world.is_walkable(spawn.x as i32, spawn.y as i32));
        assert_eq!(world.tile(0, 0), TileKind::Wall);
    }

    #[test]
    fn test_default_grid_matches_validated_builtin_description() {
        let validated = World::from_description(MapDescription::builtin()).unwrap();
        let grid = World::default_grid();

        assert_eq!((grid.width(), grid.height()), (validated.width(), validated.height()));
        assert_eq!(grid.tile_size(), validated.tile_size());
        assert_eq!(grid.tiles, validated.tiles);
        assert_eq!(grid.spawn_point(), validated.spawn_point());
    }

    #[test]
    fn test_load_missing_file_falls_back_to_default() {
        let world = World::load("/definitely/not/a/real/map.json");

        assert_eq!(world.width(), World::default_grid().width());
    }

    #[tokio::test]
    async fn test_roster_add_remove() {
        let world = World::default_grid();

        world.add_player(PlayerId(1), "Arthur").await;
        world.add_player(PlayerId(2), "Merlin").await;
        assert_eq!(world.player_count().await, 2);
        assert_eq!(world.player_names().await, vec!["Arthur", "Merlin"]);

        assert!(world.remove_player(PlayerId(1)).await);
        assert!(!world.remove_player(PlayerId(1)).await, "second remove is a no-op");
        assert_eq!(world.player_count().await, 1);
    }

    #[tokio::test]
    async fn test_roster_add_same_id_replaces() {
        let world = World::default_grid();

        world.add_player(PlayerId(1), "Arthur").await;
        world.add_player(PlayerId(1), "Lancelot").await;

        assert_eq!(world.player_names().await, vec!["Lancelot"]);
    }
}
