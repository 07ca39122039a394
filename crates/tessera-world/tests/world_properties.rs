//! Property and file-loading tests for the world model.

use std::io::Write;

use proptest::prelude::*;
use tessera_world::{Player, PlayerId, Position, VocationId, World};

/// A 12x10 map with a scattering of walls and water to walk into.
fn obstacle_course() -> World {
    let (w, h) = (12u16, 10u16);
    let mut tiles = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let code = match (x * 7 + y * 3) % 5 {
                0 => 2, // wall
                1 => 3, // water
                2 => 4, // floor
                _ => 1, // grass
            };
            tiles.push(code);
        }
    }
    let json = serde_json::json!({
        "width": w, "height": h, "tileSize": 32, "tiles": tiles
    });
    World::from_json(&json.to_string()).expect("valid map")
}

proptest! {
    /// Property: no sequence of moves ever leaves the grid or stands on a
    /// blocking tile, and a rejected move changes nothing.
    #[test]
    fn moves_never_reach_blocking_tiles(
        steps in prop::collection::vec((-128i16..=127, -128i16..=127), 0..64),
    ) {
        let world = obstacle_course();
        let mut player = Player::new(
            PlayerId(1), "Walker", VocationId::KNIGHT, world.spawn_point(),
        ).unwrap();

        for (dx, dy) in steps {
            let before = player.position();
            let moved = player.try_move(dx, dy, &world);
            let after = player.position();

            prop_assert!(world.in_bounds(after.x as i32, after.y as i32));
            prop_assert!(world.is_walkable(after.x as i32, after.y as i32));
            if !moved {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Property: hp and mana stay within bounds under any mix of damage,
    /// healing and spending.
    #[test]
    fn vitals_stay_bounded(
        ops in prop::collection::vec((0u8..3, any::<u16>()), 0..64),
    ) {
        let mut player = Player::new(
            PlayerId(1), "Tank", VocationId::KNIGHT, Position::new(1, 1),
        ).unwrap();

        for (op, amount) in ops {
            match op {
                0 => { player.apply_damage(amount); }
                1 => { player.heal(amount); }
                _ => { player.spend_mana(amount); }
            }
            prop_assert!(player.hp() <= player.max_hp());
            prop_assert!(player.mana() <= player.max_mana());
        }
    }
}

#[test]
fn test_load_reads_map_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"width":3,"height":1,"tileSize":16,"tiles":[1,4,1],"spawn":{{"x":1,"y":0}}}}"#
    )
    .expect("write map");

    let world = World::load(file.path());

    assert_eq!(world.width(), 3);
    assert_eq!(world.tile_size(), 16);
    assert_eq!(world.spawn_point(), Position::new(1, 0));
}

#[test]
fn test_load_corrupt_file_falls_back_to_default() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "width=3").expect("write");

    let world = World::load(file.path());
    let default = World::default_grid();

    assert_eq!(world.width(), default.width());
    assert_eq!(world.height(), default.height());
    assert!(World::try_load(file.path()).is_err());
}
