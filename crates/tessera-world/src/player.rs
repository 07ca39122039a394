//! Per-session player state.

use std::fmt;

use crate::{vocation, VocationId, World, WorldError};

/// A unique identifier for a player.
///
/// The server derives it from the connection id, so it is unique among
/// live sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A cell on the grid plus the floor it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    /// Floor level. The world is a single floor today, so this is always
    /// the ground level and movement never changes it.
    pub z: u8,
}

impl Position {
    /// Ground floor level.
    pub const GROUND: u8 = 7;

    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            z: Self::GROUND,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A logged-in character.
///
/// Owned by exactly one session. The fields that carry invariants are
/// private: `hp <= max_hp`, `mana <= max_mana`, and `position` always on a
/// walkable tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    vocation: VocationId,
    position: Position,
    hp: u16,
    max_hp: u16,
    mana: u16,
    max_mana: u16,
}

impl Player {
    /// Creates a player at `spawn` with full vitals from the vocation table.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownVocation`] if `vocation` has no entry.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        vocation_id: VocationId,
        spawn: Position,
    ) -> Result<Self, WorldError> {
        let stats = vocation(vocation_id)
            .ok_or(WorldError::UnknownVocation(vocation_id))?;
        Ok(Self {
            id,
            name: name.into(),
            vocation: vocation_id,
            position: spawn,
            hp: stats.base_hp,
            max_hp: stats.base_hp,
            mana: stats.base_mana,
            max_mana: stats.base_mana,
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocation(&self) -> VocationId {
        self.vocation
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn hp(&self) -> u16 {
        self.hp
    }

    pub fn max_hp(&self) -> u16 {
        self.max_hp
    }

    pub fn mana(&self) -> u16 {
        self.mana
    }

    pub fn max_mana(&self) -> u16 {
        self.max_mana
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Steps by `(dx, dy)` if the destination is on the grid and walkable.
    ///
    /// The move is all or nothing: an invalid destination leaves the
    /// position untouched. Returns whether the player moved.
    pub fn try_move(&mut self, dx: i16, dy: i16, world: &World) -> bool {
        let tx = self.position.x as i32 + dx as i32;
        let ty = self.position.y as i32 + dy as i32;
        if !world.is_walkable(tx, ty) {
            return false;
        }
        // Walkable implies in bounds, and bounds fit in u16.
        match (u16::try_from(tx), u16::try_from(ty)) {
            (Ok(x), Ok(y)) => {
                self.position.x = x;
                self.position.y = y;
                true
            }
            _ => false,
        }
    }

    /// Subtracts damage, flooring hp at zero. Returns the hp actually lost.
    pub fn apply_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restores up to `power` hp without exceeding `max_hp`. Returns the
    /// amount healed, which is zero at full health.
    pub fn heal(&mut self, power: u16) -> u16 {
        let healed = power.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Deducts `cost` mana if the player has enough. Returns `false` and
    /// leaves mana unchanged otherwise.
    pub fn spend_mana(&mut self, cost: u16) -> bool {
        if self.mana < cost {
            return false;
        }
        self.mana -= cost;
        true
    }
}
