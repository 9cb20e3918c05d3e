//! Greedy computer policy: march on the nearest enemy structure and hit whatever is weakest.

use rand::{seq::SliceRandom, Rng};
use skirmish_core::{EntitySnapshot, Modifier, Position};
use skirmish_world::query;

use crate::{ActionError, ActionProvider, AttackChoice, DecisionContext};

/// Computer-controlled provider driven by its own random source.
#[derive(Debug)]
pub struct Aggressor<R> {
    rng: R,
}

impl<R: Rng> Aggressor<R> {
    /// Creates a policy drawing its choices from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ActionProvider for Aggressor<R> {
    fn choose_purchase(
        &mut self,
        _context: &DecisionContext<'_>,
        offers: &[Modifier],
        rejected: Option<&ActionError>,
    ) -> Option<String> {
        if rejected.is_some() || !self.rng.gen_bool(0.5) {
            return None;
        }
        offers.choose(&mut self.rng).map(|rune| rune.name.clone())
    }

    fn choose_move(
        &mut self,
        context: &DecisionContext<'_>,
        rejected: Option<&ActionError>,
    ) -> Option<Position> {
        let origin = context.unit.position?;
        let budget = context.unit.movement?;
        let candidates = reachable_tiles(context, origin, budget);
        if candidates.is_empty() {
            return None;
        }
        if rejected.is_some() {
            return candidates.choose(&mut self.rng).copied();
        }

        let Some(goal) = nearest_enemy_structure(context, origin) else {
            return candidates.choose(&mut self.rng).copied();
        };
        let here = origin.manhattan_distance(goal);
        let best = candidates
            .iter()
            .map(|tile| tile.manhattan_distance(goal))
            .min()?;
        if best > here {
            return None;
        }
        let closest: Vec<Position> = candidates
            .into_iter()
            .filter(|tile| tile.manhattan_distance(goal) == best)
            .collect();
        closest.choose(&mut self.rng).copied()
    }

    fn choose_attack(
        &mut self,
        context: &DecisionContext<'_>,
        targets: &[EntitySnapshot],
        rejected: Option<&ActionError>,
    ) -> Option<AttackChoice> {
        let target = targets.iter().min_by_key(|target| target.health)?;
        let skill = if rejected.is_some() {
            None
        } else {
            context
                .unit
                .skills
                .iter()
                .filter(|skill| skill.cost <= context.unit.magic)
                .max_by_key(|skill| skill.cost)
                .filter(|_| self.rng.gen_bool(0.5))
                .map(|skill| skill.name.clone())
        };
        Some(AttackChoice {
            target: target.id,
            skill,
        })
    }
}

fn reachable_tiles(context: &DecisionContext<'_>, origin: Position, budget: u32) -> Vec<Position> {
    let occupancy = query::occupancy_view(context.world);
    let (columns, rows) = occupancy.dimensions();
    (0..rows)
        .flat_map(|y| (0..columns).map(move |x| Position::new(x, y)))
        .filter(|tile| {
            let distance = origin.manhattan_distance(*tile);
            distance > 0 && distance <= budget
        })
        .filter(|tile| occupancy.is_free(*tile))
        .collect()
}

fn nearest_enemy_structure(context: &DecisionContext<'_>, origin: Position) -> Option<Position> {
    query::entity_view(context.world)
        .iter()
        .filter(|entity| entity.team != context.unit.team)
        .filter(|entity| entity.kind.is_structure() && entity.is_alive())
        .filter_map(|entity| entity.position)
        .min_by_key(|position| origin.manhattan_distance(*position))
}
