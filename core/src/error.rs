//! Typed reasons for rejected commands and invalid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EntityKind;

/// Reasons a placement or respawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the grid.
    #[error("tile lies outside the grid")]
    OutOfBounds,
    /// The requested tile already holds a unit or a structure.
    #[error("tile is already occupied")]
    Occupied,
    /// The entity named by a respawn request does not exist or is not a unit.
    #[error("no such unit")]
    UnknownEntity,
    /// Only defeated units can respawn.
    #[error("unit is still standing")]
    NotDefeated,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveError {
    /// No entity with the provided identifier exists.
    #[error("no such entity")]
    UnknownEntity,
    /// Structures are immobile.
    #[error("structures cannot move")]
    NotAUnit,
    /// Defeated units wait for a respawn.
    #[error("unit is defeated")]
    Defeated,
    /// The unit is not on the grid.
    #[error("unit is not placed")]
    NotPlaced,
    /// The unit already moved during this turn.
    #[error("unit already moved this turn")]
    AlreadyMoved,
    /// The destination lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The destination already holds a unit or a structure.
    #[error("destination is occupied")]
    Occupied,
    /// The destination is farther than the unit's movement budget.
    #[error("destination is {distance} tiles away, budget is {budget}")]
    OutOfRange {
        /// Manhattan distance to the destination.
        distance: u32,
        /// Movement budget of the unit.
        budget: u32,
    },
}

/// Reasons an attack request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AttackError {
    /// The attacker or target does not exist.
    #[error("no such entity")]
    UnknownEntity,
    /// Attacker and target belong to the same team.
    #[error("cannot attack a teammate")]
    SameTeam,
    /// Attacker and target are not adjacent.
    #[error("target is {distance} tiles away")]
    OutOfReach {
        /// Manhattan distance between attacker and target.
        distance: u32,
    },
    /// Town centers never attack.
    #[error("entity cannot attack")]
    CannotAttack,
    /// Defeated entities cannot act.
    #[error("attacker is defeated")]
    AttackerDefeated,
    /// The target has no health left.
    #[error("target is already defeated")]
    TargetDefeated,
    /// The attacker already attacked during this turn.
    #[error("attacker already attacked this turn")]
    AlreadyAttacked,
    /// The attacker or target is not on the grid.
    #[error("attacker or target is not placed")]
    NotPlaced,
}

/// Reasons a requested skill may be refused, falling back to a plain attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SkillError {
    /// Only heroes use skills.
    #[error("only heroes use skills")]
    NotAHero,
    /// The attacker does not own a skill with the requested name.
    #[error("skill is not owned")]
    NotOwned,
    /// The attacker lacks the magic resource to pay for the skill.
    #[error("skill costs {cost} magic, {available} available")]
    NotAffordable {
        /// Magic cost of the skill.
        cost: u64,
        /// Magic currently available to the attacker.
        available: u64,
    },
}

/// Reasons a modifier command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ModifierError {
    /// No entity with the provided identifier exists.
    #[error("no such entity")]
    UnknownEntity,
    /// The entity carries no modifier with the requested name.
    #[error("modifier was never applied")]
    NotApplied,
    /// Upgrades cannot be removed.
    #[error("upgrades are permanent")]
    Permanent,
}

/// Reasons a shop purchase may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// The record is not sold in this shop.
    #[error("record is not sold here")]
    WrongScope,
    /// Only heroes buy modifiers.
    #[error("only heroes buy modifiers")]
    NotAHero,
    /// Defeated heroes cannot shop.
    #[error("hero is defeated")]
    Defeated,
    /// The buyer cannot pay for the record.
    #[error("record costs {cost}, {available} available")]
    Unaffordable {
        /// Price of the record.
        cost: u64,
        /// Currency available to the buyer.
        available: u64,
    },
    /// The roster profile has no hero at the requested index.
    #[error("no such hero in the roster")]
    UnknownHero,
}

/// Fatal configuration errors raised while assembling a squad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SquadError {
    /// The squad does not contain the required number of a given kind.
    #[error("squad requires {expected} {kind} entries, found {found}")]
    Composition {
        /// Kind whose count is wrong.
        kind: EntityKind,
        /// Required count.
        expected: usize,
        /// Count supplied.
        found: usize,
    },
}
