#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolver: critical rolls, damage arithmetic, and experience curves.
//!
//! Nothing here touches the world. The world calls the arithmetic helpers while
//! applying an attack, and the orchestrator uses [`CombatResolver`] to roll the
//! critical hit from its injected random source before submitting the attack.

use rand::Rng;
use skirmish_core::{saturating_pow10, Command, EffectiveStats, EntitySnapshot, Skill, CRIT_SCALE};

/// Probability that `attacker` lands a critical hit on `target`.
///
/// The ratio is deliberately left unclamped: values at or above one always
/// crit and values at or below zero never do.
#[must_use]
pub fn crit_chance(attacker: &EffectiveStats, target: &EffectiveStats) -> f64 {
    let gap = attacker.crit_rate.saturating_sub(target.crit_resistance);
    gap as f64 / CRIT_SCALE
}

/// Draws one uniform sample and compares it against `chance`.
///
/// Exactly one value is drawn regardless of `chance` so that replays stay
/// aligned with the random stream.
pub fn roll_critical<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    let draw: f64 = rng.gen();
    draw < chance
}

/// Offensive power of an attack before crit and defense are applied.
#[must_use]
pub fn attack_power(attacker: &EffectiveStats, skill: Option<&Skill>) -> f64 {
    match skill {
        None => attacker.attack as f64,
        Some(skill) => {
            attacker.max_health as f64 * skill.health
                + attacker.max_magic as f64 * skill.magic
                + attacker.attack as f64 * skill.attack
                + attacker.defense as f64 * skill.defense
        }
    }
}

/// Damage dealt by one attack, floored at zero.
#[must_use]
pub fn raw_damage(
    attacker: &EffectiveStats,
    target: &EffectiveStats,
    skill: Option<&Skill>,
    critical: bool,
) -> u64 {
    let mut power = attack_power(attacker, skill);
    if critical {
        power *= attacker.crit_damage;
    }

    let damage = power - target.defense as f64;
    if damage.is_nan() || damage <= 0.0 {
        0
    } else {
        damage.floor() as u64
    }
}

/// `10^(level²)`, the weight of a battle level, saturating at `u64::MAX`.
#[must_use]
pub fn level_weight(level: u32) -> u64 {
    level
        .checked_mul(level)
        .map_or(u64::MAX, saturating_pow10)
}

/// Experience needed to advance past `level`.
#[must_use]
pub fn required_experience(level: u32) -> u64 {
    level_weight(level)
}

/// Experience credited for defeating a unit at `target_level`.
#[must_use]
pub fn kill_experience(target_level: u32) -> u64 {
    level_weight(target_level)
}

/// Attack request produced by a caller before the critical roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackIntent {
    /// Name of the skill to use, if any.
    pub skill: Option<String>,
}

/// Rolls critical hits and emits attack commands.
#[derive(Debug, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rolls the critical hit for `intent` and queues the resulting attack command.
    ///
    /// Returns whether the roll succeeded. Legality is not checked here; the
    /// caller validates against the world first so rejected attacks never consume
    /// a random draw.
    pub fn handle<R: Rng + ?Sized>(
        &self,
        attacker: &EntitySnapshot,
        target: &EntitySnapshot,
        intent: AttackIntent,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> bool {
        let chance = crit_chance(&attacker.stats, &target.stats);
        let critical = roll_critical(rng, chance);
        out.push(Command::Attack {
            attacker: attacker.id,
            target: target.id,
            skill: intent.skill,
            critical,
        });
        critical
    }
}
