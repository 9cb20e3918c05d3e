//! Entity templates and the fixed squad composition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BaseStats, Modifier, Skill, SquadError};

/// Heroes per squad.
pub const HERO_COUNT: usize = 5;
/// Villagers per squad.
pub const VILLAGER_COUNT: usize = 5;
/// Battle towers per squad.
pub const TOWER_COUNT: usize = 3;
/// Town centers per squad.
pub const TOWN_CENTER_COUNT: usize = 1;

/// Mobile combatants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-controlled unit with skills and a modifier slot.
    Hero,
    /// Support unit that moves and attacks opportunistically.
    Villager,
}

/// Immobile occupants that decide the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Attacks adjacent enemy units during its team's turn.
    BattleTower,
    /// Never attacks.
    TownCenter,
}

/// Flat classification of every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// See [`UnitKind::Hero`].
    Hero,
    /// See [`UnitKind::Villager`].
    Villager,
    /// See [`StructureKind::BattleTower`].
    BattleTower,
    /// See [`StructureKind::TownCenter`].
    TownCenter,
}

impl EntityKind {
    /// Reports whether the kind is a mobile unit.
    #[must_use]
    pub const fn is_unit(self) -> bool {
        matches!(self, Self::Hero | Self::Villager)
    }

    /// Reports whether the kind is an immobile structure.
    #[must_use]
    pub const fn is_structure(self) -> bool {
        !self.is_unit()
    }
}

impl From<UnitKind> for EntityKind {
    fn from(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Hero => Self::Hero,
            UnitKind::Villager => Self::Villager,
        }
    }
}

impl From<StructureKind> for EntityKind {
    fn from(kind: StructureKind) -> Self {
        match kind {
            StructureKind::BattleTower => Self::BattleTower,
            StructureKind::TownCenter => Self::TownCenter,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hero => "hero",
            Self::Villager => "villager",
            Self::BattleTower => "battle tower",
            Self::TownCenter => "town center",
        };
        f.write_str(label)
    }
}

/// Unit-only template fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Hero or villager.
    pub kind: UnitKind,
    /// Maximum Manhattan distance per move.
    pub movement: u32,
    /// Skills the unit owns. Only heroes may use them.
    pub skills: Vec<Skill>,
}

/// Unit or structure half of a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Role {
    /// Mobile combatant.
    Unit(UnitSpec),
    /// Immobile structure.
    Structure(StructureKind),
}

/// Template an entity is built from when a squad is deployed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Display name.
    pub name: String,
    /// Stats before levels and modifiers.
    pub stats: BaseStats,
    /// Unit or structure specific fields.
    pub role: Role,
    /// Permanent upgrades already bought for this entity.
    #[serde(default)]
    pub upgrades: Vec<Modifier>,
}

impl EntitySpec {
    /// Flat kind of the template.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match &self.role {
            Role::Unit(unit) => unit.kind.into(),
            Role::Structure(kind) => (*kind).into(),
        }
    }
}

/// Fixed-composition roster a team brings to a match.
#[derive(Clone, Debug, PartialEq)]
pub struct Squad {
    heroes: Vec<EntitySpec>,
    villagers: Vec<EntitySpec>,
    towers: Vec<EntitySpec>,
    town_center: EntitySpec,
}

impl Squad {
    /// Sorts templates by kind and checks the 5/5/3/1 composition.
    ///
    /// Templates keep their relative order within each kind, which fixes the
    /// action slot order of heroes and villagers.
    pub fn new(members: Vec<EntitySpec>) -> Result<Self, SquadError> {
        let mut heroes = Vec::new();
        let mut villagers = Vec::new();
        let mut towers = Vec::new();
        let mut town_centers = Vec::new();
        for member in members {
            match member.kind() {
                EntityKind::Hero => heroes.push(member),
                EntityKind::Villager => villagers.push(member),
                EntityKind::BattleTower => towers.push(member),
                EntityKind::TownCenter => town_centers.push(member),
            }
        }

        check_count(EntityKind::Hero, HERO_COUNT, heroes.len())?;
        check_count(EntityKind::Villager, VILLAGER_COUNT, villagers.len())?;
        check_count(EntityKind::BattleTower, TOWER_COUNT, towers.len())?;
        check_count(EntityKind::TownCenter, TOWN_CENTER_COUNT, town_centers.len())?;

        let town_center = town_centers
            .pop()
            .ok_or(SquadError::Composition {
                kind: EntityKind::TownCenter,
                expected: TOWN_CENTER_COUNT,
                found: 0,
            })?;

        Ok(Self {
            heroes,
            villagers,
            towers,
            town_center,
        })
    }

    /// Heroes in action slot order.
    #[must_use]
    pub fn heroes(&self) -> &[EntitySpec] {
        &self.heroes
    }

    /// Villagers in action slot order.
    #[must_use]
    pub fn villagers(&self) -> &[EntitySpec] {
        &self.villagers
    }

    /// Battle towers.
    #[must_use]
    pub fn towers(&self) -> &[EntitySpec] {
        &self.towers
    }

    /// The squad's town center.
    #[must_use]
    pub fn town_center(&self) -> &EntitySpec {
        &self.town_center
    }
}

fn check_count(kind: EntityKind, expected: usize, found: usize) -> Result<(), SquadError> {
    if expected == found {
        Ok(())
    } else {
        Err(SquadError::Composition {
            kind,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn members(heroes: usize) -> Vec<EntitySpec> {
        let mut members: Vec<EntitySpec> = (0..heroes)
            .map(|index| presets::hero(&format!("Hero {index}")))
            .collect();
        members.extend((0..VILLAGER_COUNT).map(|index| presets::villager(&format!("V{index}"))));
        members.extend((0..TOWER_COUNT).map(|index| presets::battle_tower(&format!("T{index}"))));
        members.push(presets::town_center("Keep"));
        members
    }

    #[test]
    fn standard_composition_is_accepted() {
        let squad = Squad::new(members(HERO_COUNT)).expect("valid squad");
        assert_eq!(squad.heroes().len(), HERO_COUNT);
        assert_eq!(squad.villagers().len(), VILLAGER_COUNT);
        assert_eq!(squad.towers().len(), TOWER_COUNT);
        assert_eq!(squad.town_center().kind(), EntityKind::TownCenter);
        assert_eq!(squad.heroes()[2].name, "Hero 2");
    }

    #[test]
    fn four_heroes_are_rejected() {
        assert_eq!(
            Squad::new(members(4)),
            Err(SquadError::Composition {
                kind: EntityKind::Hero,
                expected: HERO_COUNT,
                found: 4,
            })
        );
    }

    #[test]
    fn missing_town_center_is_rejected() {
        let mut members = members(HERO_COUNT);
        let _ = members.pop();
        assert!(matches!(
            Squad::new(members),
            Err(SquadError::Composition {
                kind: EntityKind::TownCenter,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn extra_tower_is_rejected() {
        let mut members = members(HERO_COUNT);
        members.push(presets::battle_tower("Spare"));
        assert!(matches!(
            Squad::new(members),
            Err(SquadError::Composition {
                kind: EntityKind::BattleTower,
                expected: TOWER_COUNT,
                found: 4,
            })
        ));
    }
}
