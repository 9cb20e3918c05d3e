#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for a skirmish match.
//!
//! The world owns the occupancy grid and every registered entity. It mutates
//! only in response to [`Command`]s passed to [`apply`] and reports outcomes as
//! [`Event`]s. Read access goes through the [`query`] module.

mod entity;
mod grid;
mod stats;

use skirmish_core::{
    AttackError, Command, EntityId, EntityKind, EntitySpec, Event, ModifierError, MoveError,
    PlacementError, Position, StructureKind, TeamId, GRID_COLUMNS, GRID_ROWS,
};
use skirmish_system_combat::{kill_experience, raw_damage};
use tracing::debug;

use crate::{
    entity::{Body, Entity, EntityRegistry},
    grid::Grid,
};

/// Represents the authoritative battlefield state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    entities: EntityRegistry,
}

impl World {
    /// Creates an empty battlefield with the standard dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(GRID_COLUMNS, GRID_ROWS)
    }

    /// Creates an empty battlefield with custom dimensions.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32) -> Self {
        Self {
            grid: Grid::new(columns, rows),
            entities: EntityRegistry::new(),
        }
    }

    fn place_new(
        &mut self,
        team: TeamId,
        spec: EntitySpec,
        position: Position,
    ) -> Result<Entity, PlacementError> {
        let mut entity = Entity::from_spec(self.entities.peek_id(), team, spec);
        self.grid.place(entity.occupant(), position)?;
        entity.position = Some(position);
        Ok(entity)
    }

    fn validate_move(&self, unit: EntityId, destination: Position) -> Result<Position, MoveError> {
        let entity = self.entities.get(unit).ok_or(MoveError::UnknownEntity)?;
        let Body::Unit(body) = &entity.body else {
            return Err(MoveError::NotAUnit);
        };
        if !entity.is_alive() {
            return Err(MoveError::Defeated);
        }
        let from = entity.position.ok_or(MoveError::NotPlaced)?;
        if entity.has_moved {
            return Err(MoveError::AlreadyMoved);
        }
        match self.grid.check_vacant(destination) {
            Err(PlacementError::OutOfBounds) => return Err(MoveError::OutOfBounds),
            Err(_) => return Err(MoveError::Occupied),
            Ok(()) => {}
        }
        let distance = from.manhattan_distance(destination);
        if distance > body.movement {
            return Err(MoveError::OutOfRange {
                distance,
                budget: body.movement,
            });
        }
        Ok(from)
    }

    fn validate_attack(&self, attacker: EntityId, target: EntityId) -> Result<(), AttackError> {
        let source = self
            .entities
            .get(attacker)
            .ok_or(AttackError::UnknownEntity)?;
        let victim = self.entities.get(target).ok_or(AttackError::UnknownEntity)?;

        if !source.is_alive() {
            return Err(AttackError::AttackerDefeated);
        }
        if matches!(source.body, Body::Structure(StructureKind::TownCenter)) {
            return Err(AttackError::CannotAttack);
        }
        if source.has_attacked {
            return Err(AttackError::AlreadyAttacked);
        }
        if source.team == victim.team {
            return Err(AttackError::SameTeam);
        }
        if !victim.is_alive() {
            return Err(AttackError::TargetDefeated);
        }
        let (Some(from), Some(to)) = (source.position, victim.position) else {
            return Err(AttackError::NotPlaced);
        };
        let distance = from.manhattan_distance(to);
        if distance != 1 {
            return Err(AttackError::OutOfReach { distance });
        }
        Ok(())
    }

    fn resolve_attack(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        skill: Option<String>,
        critical: bool,
        out_events: &mut Vec<Event>,
    ) -> Option<()> {
        let source = self.entities.get(attacker)?;
        let victim = self.entities.get(target)?;

        let selected = match skill {
            Some(name) => match source.select_skill(&name) {
                Ok(skill) => Some(skill),
                Err(reason) => {
                    debug!(%attacker, skill = %name, %reason, "skill refused, falling back");
                    out_events.push(Event::SkillRejected {
                        attacker,
                        skill: name,
                        reason,
                    });
                    None
                }
            },
            None => None,
        };

        let damage = raw_damage(
            &source.stats(),
            &victim.stats(),
            selected.as_ref(),
            critical,
        );
        let victim_is_unit = matches!(victim.body, Body::Unit(_));
        let victim_level = victim.level();

        let victim = self.entities.get_mut(target)?;
        let defeated = victim.take_damage(damage);

        let source = self.entities.get_mut(attacker)?;
        source.has_attacked = true;
        if let Some(skill) = &selected {
            source.spend_magic(skill.cost);
        }
        out_events.push(Event::AttackResolved {
            attacker,
            target,
            damage,
            critical,
            skill: selected.map(|skill| skill.name),
        });
        debug!(%attacker, %target, damage, critical, "attack resolved");

        if defeated {
            out_events.push(Event::EntityDefeated {
                entity: target,
                by: Some(attacker),
            });
            if victim_is_unit {
                source.kills = source.kills.saturating_add(1);
                let amount = kill_experience(victim_level);
                push_experience(source, amount, out_events);
            }
        }
        Some(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn push_experience(entity: &mut Entity, amount: u64, out_events: &mut Vec<Event>) {
    let id = entity.id;
    out_events.push(Event::ExperienceGained { entity: id, amount });
    for level in entity.grant_experience(amount) {
        debug!(entity = %id, level, "leveled up");
        out_events.push(Event::LeveledUp { entity: id, level });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceEntity {
            team,
            spec,
            position,
        } => match world.place_new(team, spec, position) {
            Ok(entity) => {
                out_events.push(Event::EntityPlaced {
                    entity: entity.id,
                    team,
                    kind: entity.kind(),
                    position,
                });
                world.entities.insert(entity);
            }
            Err(reason) => {
                debug!(%position, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected { position, reason });
            }
        },
        Command::ClearTile { position } => {
            if let Some(occupant) = world.grid.remove(position) {
                let entity = occupant.entity();
                if let Some(cleared) = world.entities.get_mut(entity) {
                    cleared.position = None;
                }
                out_events.push(Event::TileCleared { position, entity });
            }
        }
        Command::MoveUnit { unit, destination } => match world.validate_move(unit, destination) {
            Ok(from) => {
                if let Err(reason) = world.grid.relocate(from, destination) {
                    debug!(%unit, %reason, "grid refused a validated move");
                    out_events.push(Event::MoveRejected {
                        unit,
                        reason: MoveError::Occupied,
                    });
                    return;
                }
                if let Some(entity) = world.entities.get_mut(unit) {
                    entity.position = Some(destination);
                    entity.has_moved = true;
                }
                out_events.push(Event::UnitMoved {
                    unit,
                    from,
                    to: destination,
                });
            }
            Err(reason) => {
                debug!(%unit, %destination, %reason, "move rejected");
                out_events.push(Event::MoveRejected { unit, reason });
            }
        },
        Command::Attack {
            attacker,
            target,
            skill,
            critical,
        } => match world.validate_attack(attacker, target) {
            Ok(()) => {
                let _ = world.resolve_attack(attacker, target, skill, critical, out_events);
            }
            Err(reason) => {
                debug!(%attacker, %target, %reason, "attack rejected");
                out_events.push(Event::AttackRejected {
                    attacker,
                    target,
                    reason,
                });
            }
        },
        Command::ApplyModifier { entity, modifier } => match world.entities.get_mut(entity) {
            Some(receiver) => {
                let name = modifier.name.clone();
                let scope = modifier.scope;
                receiver.apply_modifier(modifier);
                out_events.push(Event::ModifierApplied {
                    entity,
                    name,
                    scope,
                });
            }
            None => out_events.push(Event::ModifierRejected {
                entity,
                name: modifier.name,
                reason: ModifierError::UnknownEntity,
            }),
        },
        Command::RemoveModifier { entity, name } => {
            let outcome = world
                .entities
                .get_mut(entity)
                .ok_or(ModifierError::UnknownEntity)
                .and_then(|carrier| carrier.remove_rune(&name));
            match outcome {
                Ok(_) => out_events.push(Event::ModifierRemoved { entity, name }),
                Err(reason) => out_events.push(Event::ModifierRejected {
                    entity,
                    name,
                    reason,
                }),
            }
        }
        Command::StripRunes { entity } => {
            if let Some(carrier) = world.entities.get_mut(entity) {
                for rune in carrier.strip_runes() {
                    out_events.push(Event::ModifierRemoved {
                        entity,
                        name: rune.name,
                    });
                }
            }
        }
        Command::GrantExperience { entity, amount } => {
            if let Some(receiver) = world.entities.get_mut(entity) {
                push_experience(receiver, amount, out_events);
            }
        }
        Command::DamageEntity { entity, amount } => {
            if let Some(victim) = world.entities.get_mut(entity) {
                let defeated = victim.take_damage(amount);
                out_events.push(Event::EntityDamaged { entity, amount });
                if defeated {
                    out_events.push(Event::EntityDefeated { entity, by: None });
                }
            }
        }
        Command::EndTurn { team } => {
            for entity in world
                .entities
                .iter_mut()
                .filter(|entity| entity.team == team)
            {
                entity.clear_turn_flags();
                if entity.kind() == EntityKind::Hero {
                    entity.heal();
                }
            }
            out_events.push(Event::TurnEnded { team });
        }
        Command::Respawn { unit, position } => {
            let Some(fallen) = world
                .entities
                .get(unit)
                .filter(|entity| matches!(entity.body, Body::Unit(_)))
            else {
                out_events.push(Event::PlacementRejected {
                    position,
                    reason: PlacementError::UnknownEntity,
                });
                return;
            };
            if fallen.is_alive() {
                debug!(%unit, %position, "respawn rejected for a standing unit");
                out_events.push(Event::PlacementRejected {
                    position,
                    reason: PlacementError::NotDefeated,
                });
                return;
            }
            let from = fallen.position;
            if let Err(reason) = world.grid.check_vacant(position) {
                debug!(%unit, %position, %reason, "respawn rejected");
                out_events.push(Event::PlacementRejected { position, reason });
                return;
            }
            if let Some(corpse) = from {
                let _ = world.grid.remove(corpse);
            }
            if let Some(entity) = world.entities.get_mut(unit) {
                if let Err(reason) = world.grid.place(entity.occupant(), position) {
                    entity.position = None;
                    out_events.push(Event::PlacementRejected { position, reason });
                    return;
                }
                entity.revive(position);
            }
            out_events.push(Event::UnitRespawned {
                unit,
                from,
                to: position,
            });
        }
        Command::ResetToBaseLevel { entity } => {
            if let Some(target) = world.entities.get_mut(entity) {
                target.reset_to_base_level();
                out_events.push(Event::LevelReset { entity });
            }
        }
        Command::ClearTallies { entity } => {
            if let Some(target) = world.entities.get_mut(entity) {
                target.clear_tallies();
                out_events.push(Event::TalliesCleared { entity });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{
        AttackError, EntityId, EntityKind, EntitySnapshot, EntityView, MoveError, OccupancyView,
        Position, TeamId,
    };

    use super::World;

    /// Width and height of the battlefield.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Captures the state of a single entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.entities.get(id).map(super::Entity::snapshot)
    }

    /// Captures every registered entity, ordered by identifier.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.entities.iter().map(super::Entity::snapshot).collect())
    }

    /// Captures the entity standing on `position`, if any.
    #[must_use]
    pub fn entity_at(world: &World, position: Position) -> Option<EntitySnapshot> {
        world
            .grid
            .occupant(position)
            .and_then(|occupant| entity(world, occupant.entity()))
    }

    /// Unoccupied tiles in row-major order.
    #[must_use]
    pub fn free_positions(world: &World) -> Vec<Position> {
        world.grid.free_positions()
    }

    /// Alive enemies orthogonally adjacent to `id`, in north, east, south, west order.
    #[must_use]
    pub fn adjacent_enemies(world: &World, id: EntityId) -> Vec<EntitySnapshot> {
        let Some(source) = world.entities.get(id) else {
            return Vec::new();
        };
        let Some(position) = source.position else {
            return Vec::new();
        };
        let (columns, rows) = world.grid.dimensions();
        position
            .neighbors4(columns, rows)
            .filter_map(|neighbor| entity_at(world, neighbor))
            .filter(|candidate| candidate.team != source.team && candidate.is_alive())
            .collect()
    }

    /// Reports whether the command to attack `target` with `attacker` would resolve.
    pub fn check_attack(
        world: &World,
        attacker: EntityId,
        target: EntityId,
    ) -> Result<(), AttackError> {
        world.validate_attack(attacker, target)
    }

    /// Reports whether the command to move `unit` to `destination` would resolve.
    pub fn check_move(
        world: &World,
        unit: EntityId,
        destination: Position,
    ) -> Result<(), MoveError> {
        world.validate_move(unit, destination).map(|_| ())
    }

    /// Reports whether every tower and the town center of `team` are down.
    ///
    /// A team that never deployed any structure counts as eliminated.
    #[must_use]
    pub fn is_eliminated(world: &World, team: TeamId) -> bool {
        world
            .entities
            .iter()
            .filter(|entity| entity.team == team)
            .filter(|entity| {
                matches!(
                    entity.kind(),
                    EntityKind::BattleTower | EntityKind::TownCenter
                )
            })
            .all(|entity| !entity.is_alive())
    }
}
