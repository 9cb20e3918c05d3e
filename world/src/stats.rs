//! Stat sheets recomputed from base stats, battle level, and active modifiers.

use skirmish_core::{BaseStats, EffectiveStats, Modifier, ModifierError};

/// Base stats plus the transforms currently stacked on top of them.
///
/// Effective values are always recomputed from scratch, so removing a rune
/// never depends on the order in which modifiers were applied.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StatSheet {
    base: BaseStats,
    level: u32,
    modifiers: Vec<Modifier>,
}

impl StatSheet {
    pub(crate) fn new(base: BaseStats) -> Self {
        Self {
            base,
            level: 1,
            modifiers: Vec::new(),
        }
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub(crate) fn raise_level(&mut self) {
        self.level = self.level.saturating_add(1);
    }

    pub(crate) fn reset_level(&mut self) {
        self.level = 1;
    }

    pub(crate) fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Removes the most recently applied rune called `name`.
    pub(crate) fn remove_rune(&mut self, name: &str) -> Result<Modifier, ModifierError> {
        let rune = self
            .modifiers
            .iter()
            .rposition(|modifier| modifier.is_rune() && modifier.name == name);
        match rune {
            Some(index) => Ok(self.modifiers.remove(index)),
            None if self.modifiers.iter().any(|modifier| modifier.name == name) => {
                Err(ModifierError::Permanent)
            }
            None => Err(ModifierError::NotApplied),
        }
    }

    /// Drops every rune, returning them in application order.
    pub(crate) fn strip_runes(&mut self) -> Vec<Modifier> {
        let (runes, kept): (Vec<_>, Vec<_>) = self
            .modifiers
            .drain(..)
            .partition(|modifier| modifier.is_rune());
        self.modifiers = kept;
        runes
    }

    pub(crate) fn effective(&self) -> EffectiveStats {
        let level_factor = 2_f64.powi(i32::try_from(self.level - 1).unwrap_or(i32::MAX));
        let product = |field: fn(&Modifier) -> f64| {
            self.modifiers
                .iter()
                .fold(level_factor, |acc, modifier| acc * field(modifier))
        };

        EffectiveStats {
            max_health: scale(self.base.health, product(|m| m.health)),
            max_magic: scale(self.base.magic, product(|m| m.magic)),
            attack: scale(self.base.attack, product(|m| m.attack)),
            defense: scale(self.base.defense, product(|m| m.defense)),
            crit_rate: self
                .modifiers
                .iter()
                .fold(self.base.crit_rate, |acc, m| acc.saturating_add(m.crit_rate)),
            crit_resistance: self
                .modifiers
                .iter()
                .fold(self.base.crit_resistance, |acc, m| {
                    acc.saturating_add(m.crit_resistance)
                }),
            crit_damage: self
                .modifiers
                .iter()
                .fold(self.base.crit_damage, |acc, m| acc + m.crit_damage),
        }
    }
}

fn scale(value: u64, factor: f64) -> u64 {
    let scaled = value as f64 * factor;
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        scaled.round() as u64
    }
}
