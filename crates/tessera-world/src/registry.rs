//! Static game tables: vocations and spells.
//!
//! Both tables are compiled in and never change at runtime. Vocations
//! seed a new player's vitals; spells are looked up by their invocation
//! words when a player speaks.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Vocations
// ---------------------------------------------------------------------------

/// Identifier of a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VocationId(pub u8);

impl VocationId {
    pub const NONE: Self = Self(0);
    pub const SORCERER: Self = Self(1);
    pub const DRUID: Self = Self(2);
    pub const PALADIN: Self = Self(3);
    pub const KNIGHT: Self = Self(4);
}

impl fmt::Display for VocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match vocation(*self) {
            Some(stats) => f.write_str(stats.name),
            None => write!(f, "V-{}", self.0),
        }
    }
}

/// Base stats of a vocation.
///
/// `hp_gain` and `mana_gain` are per-level increments and `capacity` is
/// carry weight; nothing in the server reads them yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocationStats {
    pub name: &'static str,
    pub base_hp: u16,
    pub base_mana: u16,
    pub capacity: u16,
    pub hp_gain: u16,
    pub mana_gain: u16,
}

static VOCATIONS: [(VocationId, VocationStats); 5] = [
    (
        VocationId::NONE,
        VocationStats {
            name: "None",
            base_hp: 150,
            base_mana: 0,
            capacity: 400,
            hp_gain: 5,
            mana_gain: 5,
        },
    ),
    (
        VocationId::SORCERER,
        VocationStats {
            name: "Sorcerer",
            base_hp: 150,
            base_mana: 200,
            capacity: 400,
            hp_gain: 5,
            mana_gain: 30,
        },
    ),
    (
        VocationId::DRUID,
        VocationStats {
            name: "Druid",
            base_hp: 150,
            base_mana: 200,
            capacity: 400,
            hp_gain: 5,
            mana_gain: 30,
        },
    ),
    (
        VocationId::PALADIN,
        VocationStats {
            name: "Paladin",
            base_hp: 180,
            base_mana: 100,
            capacity: 420,
            hp_gain: 10,
            mana_gain: 15,
        },
    ),
    (
        VocationId::KNIGHT,
        VocationStats {
            name: "Knight",
            base_hp: 200,
            base_mana: 50,
            capacity: 450,
            hp_gain: 15,
            mana_gain: 5,
        },
    ),
];

/// Looks up a vocation's base stats.
pub fn vocation(id: VocationId) -> Option<&'static VocationStats> {
    VOCATIONS
        .iter()
        .find(|(vid, _)| *vid == id)
        .map(|(_, stats)| stats)
}

// ---------------------------------------------------------------------------
// Spells
// ---------------------------------------------------------------------------

/// What a spell does when cast.
///
/// Only [`SpellEffect::Heal`] has a handler. The rest are table entries
/// waiting for haste, combat and item systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellEffect {
    Heal,
    Haste,
    AreaDamage,
    CreateFood,
}

/// A castable spell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellDefinition {
    pub name: &'static str,
    /// Lower-case invocation words, e.g. `"exura gran"`.
    pub words: &'static str,
    pub mana_cost: u16,
    pub level: u16,
    pub cooldown: Duration,
    pub effect: SpellEffect,
    pub power: u16,
}

static SPELLS: [SpellDefinition; 6] = [
    SpellDefinition {
        name: "Light Healing",
        words: "exura",
        mana_cost: 20,
        level: 1,
        cooldown: Duration::from_millis(1000),
        effect: SpellEffect::Heal,
        power: 50,
    },
    SpellDefinition {
        name: "Intense Healing",
        words: "exura gran",
        mana_cost: 70,
        level: 11,
        cooldown: Duration::from_millis(1000),
        effect: SpellEffect::Heal,
        power: 150,
    },
    SpellDefinition {
        name: "Ultimate Healing",
        words: "exura vita",
        mana_cost: 160,
        level: 20,
        cooldown: Duration::from_millis(1000),
        effect: SpellEffect::Heal,
        power: 400,
    },
    SpellDefinition {
        name: "Haste",
        words: "utani hur",
        mana_cost: 60,
        level: 14,
        cooldown: Duration::from_millis(2000),
        effect: SpellEffect::Haste,
        power: 30,
    },
    SpellDefinition {
        name: "Berserk",
        words: "exori",
        mana_cost: 115,
        level: 35,
        cooldown: Duration::from_millis(4000),
        effect: SpellEffect::AreaDamage,
        power: 80,
    },
    SpellDefinition {
        name: "Food",
        words: "exevo pan",
        mana_cost: 120,
        level: 14,
        cooldown: Duration::from_millis(2000),
        effect: SpellEffect::CreateFood,
        power: 1,
    },
];

/// All known spells.
pub fn spells() -> &'static [SpellDefinition] {
    &SPELLS
}

/// Finds the spell whose words match `text` exactly, ignoring case and
/// surrounding whitespace.
pub fn spell_by_words(text: &str) -> Option<&'static SpellDefinition> {
    let text = text.trim();
    SPELLS.iter().find(|s| s.words.eq_ignore_ascii_case(text))
}

/// Finds the spell a player probably meant when `text` is a near miss.
///
/// A near miss contains a spell's words, has the same number of words,
/// and is not an exact match (`"exuraa"`, `"exura grann"`). Longer
/// invocations win, so `"exura gran."` suggests `"exura gran"`.
pub fn near_miss(text: &str) -> Option<&'static SpellDefinition> {
    let lower = text.trim().to_lowercase();
    let word_count = lower.split_whitespace().count();
    SPELLS
        .iter()
        .filter(|s| {
            lower != s.words
                && lower.contains(s.words)
                && s.words.split_whitespace().count() == word_count
        })
        .max_by_key(|s| s.words.len())
}
