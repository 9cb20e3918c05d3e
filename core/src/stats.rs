//! Stat records: base stat blocks, modifiers, and skills.

use serde::{Deserialize, Serialize};

/// Denominator of the critical-hit chance formula.
///
/// Crit rate and crit resistance are expressed in points on this scale, so a
/// gap of `CRIT_SCALE` points is a guaranteed critical hit.
pub const CRIT_SCALE: f64 = 3000.0;

/// Computes `10^exponent`, saturating at `u64::MAX`.
#[must_use]
pub fn saturating_pow10(exponent: u32) -> u64 {
    10_u64.checked_pow(exponent).unwrap_or(u64::MAX)
}

/// Stat block an entity is built from, before levels and modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum health.
    pub health: u64,
    /// Maximum magic resource. Structures carry zero.
    pub magic: u64,
    /// Attack power.
    pub attack: u64,
    /// Defense subtracted from incoming damage.
    pub defense: u64,
    /// Crit rate in points on the [`CRIT_SCALE`] scale.
    pub crit_rate: i64,
    /// Crit resistance in points on the [`CRIT_SCALE`] scale.
    pub crit_resistance: i64,
    /// Multiplier applied to attack power on a critical hit.
    pub crit_damage: f64,
}

/// Stats after battle levels and modifiers have been folded in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveStats {
    /// Maximum health.
    pub max_health: u64,
    /// Maximum magic resource.
    pub max_magic: u64,
    /// Attack power.
    pub attack: u64,
    /// Defense.
    pub defense: u64,
    /// Crit rate in points.
    pub crit_rate: i64,
    /// Crit resistance in points.
    pub crit_resistance: i64,
    /// Crit damage multiplier.
    pub crit_damage: f64,
}

/// Lifetime of a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierScope {
    /// Battle-scoped and removable; stripped when the match ends.
    Rune,
    /// Permanent once applied.
    Upgrade,
}

/// Stat transform sold by shops.
///
/// Health, magic, attack and defense are multiplicative factors; the crit
/// fields are additive deltas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Display name, also used to identify the modifier for removal.
    pub name: String,
    /// Whether the modifier is a rune or an upgrade.
    pub scope: ModifierScope,
    /// Price in the scope's currency.
    pub cost: u64,
    /// Health multiplier.
    #[serde(default = "identity")]
    pub health: f64,
    /// Magic multiplier.
    #[serde(default = "identity")]
    pub magic: f64,
    /// Attack multiplier.
    #[serde(default = "identity")]
    pub attack: f64,
    /// Defense multiplier.
    #[serde(default = "identity")]
    pub defense: f64,
    /// Crit rate delta.
    #[serde(default)]
    pub crit_rate: i64,
    /// Crit resistance delta.
    #[serde(default)]
    pub crit_resistance: i64,
    /// Crit damage delta.
    #[serde(default)]
    pub crit_damage: f64,
}

fn identity() -> f64 {
    1.0
}

impl Modifier {
    /// Creates a rune that leaves every stat unchanged until fields are set.
    #[must_use]
    pub fn rune(name: impl Into<String>, cost: u64) -> Self {
        Self::neutral(name.into(), ModifierScope::Rune, cost)
    }

    /// Creates an upgrade that leaves every stat unchanged until fields are set.
    #[must_use]
    pub fn upgrade(name: impl Into<String>, cost: u64) -> Self {
        Self::neutral(name.into(), ModifierScope::Upgrade, cost)
    }

    fn neutral(name: String, scope: ModifierScope, cost: u64) -> Self {
        Self {
            name,
            scope,
            cost,
            health: 1.0,
            magic: 1.0,
            attack: 1.0,
            defense: 1.0,
            crit_rate: 0,
            crit_resistance: 0,
            crit_damage: 0.0,
        }
    }

    /// Reports whether the modifier is battle-scoped.
    #[must_use]
    pub fn is_rune(&self) -> bool {
        self.scope == ModifierScope::Rune
    }
}

/// Hero skill used in place of plain attack power.
///
/// The attack's power is the sum of the attacker's stats weighted by the four
/// multipliers; crit and defense arithmetic then apply as usual.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Display name, used to select the skill.
    pub name: String,
    /// Magic resource spent when the skill is used.
    pub cost: u64,
    /// Weight of the attacker's maximum health.
    pub health: f64,
    /// Weight of the attacker's maximum magic resource.
    pub magic: f64,
    /// Weight of the attacker's attack power.
    pub attack: f64,
    /// Weight of the attacker's defense.
    pub defense: f64,
}
