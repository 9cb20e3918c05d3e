//! Decision seam between the engine and whoever controls the units.

use skirmish_core::{EntityId, EntitySnapshot, Modifier, Position};
use skirmish_world::World;

use crate::ActionError;

/// Number of times a rejected decision is offered again before it is forfeited.
pub const MAX_DECISION_ATTEMPTS: usize = 4;

/// Everything a provider may inspect while deciding for one unit.
#[derive(Clone, Debug)]
pub struct DecisionContext<'a> {
    /// Battlefield state at decision time.
    pub world: &'a World,
    /// Unit the decision is for.
    pub unit: EntitySnapshot,
    /// Index of the controlling player within the team, for heroes.
    pub controller: Option<usize>,
    /// Battle currency available to the controller.
    pub battle_currency: u64,
    /// Current turn number, starting at one.
    pub turn: u32,
}

/// Target and optional skill picked for an attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackChoice {
    /// Entity to attack.
    pub target: EntityId,
    /// Skill to use, if any.
    pub skill: Option<String>,
}

/// Supplies the decisions for one team.
///
/// Every method receives the rejection of its previous answer for the same
/// slot, if any. Returning `None` declines the action.
pub trait ActionProvider {
    /// Picks a rune to buy for a hero from the affordable `offers`.
    fn choose_purchase(
        &mut self,
        context: &DecisionContext<'_>,
        offers: &[Modifier],
        rejected: Option<&ActionError>,
    ) -> Option<String>;

    /// Picks the destination of a hero or villager.
    fn choose_move(
        &mut self,
        context: &DecisionContext<'_>,
        rejected: Option<&ActionError>,
    ) -> Option<Position>;

    /// Picks which adjacent enemy a hero attacks, if any.
    fn choose_attack(
        &mut self,
        context: &DecisionContext<'_>,
        targets: &[EntitySnapshot],
        rejected: Option<&ActionError>,
    ) -> Option<AttackChoice>;
}

/// Provider that declines every decision. Units stay put and never attack.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl ActionProvider for Passive {
    fn choose_purchase(
        &mut self,
        _context: &DecisionContext<'_>,
        _offers: &[Modifier],
        _rejected: Option<&ActionError>,
    ) -> Option<String> {
        None
    }

    fn choose_move(
        &mut self,
        _context: &DecisionContext<'_>,
        _rejected: Option<&ActionError>,
    ) -> Option<Position> {
        None
    }

    fn choose_attack(
        &mut self,
        _context: &DecisionContext<'_>,
        _targets: &[EntitySnapshot],
        _rejected: Option<&ActionError>,
    ) -> Option<AttackChoice> {
        None
    }
}
