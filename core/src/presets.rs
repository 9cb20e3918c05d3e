//! Stock templates for quick matches, demos, and tests.

use crate::{
    BaseStats, EntitySpec, Role, Skill, Squad, SquadError, StructureKind, UnitKind, UnitSpec,
    HERO_COUNT, TOWER_COUNT, VILLAGER_COUNT,
};

/// Heavy single-target strike weighted on attack and defense.
#[must_use]
pub fn cleave() -> Skill {
    Skill {
        name: "Cleave".to_owned(),
        cost: 40,
        health: 0.0,
        magic: 0.0,
        attack: 1.5,
        defense: 0.5,
    }
}

/// Spell that converts the caster's magic pool into damage.
#[must_use]
pub fn arcane_burst() -> Skill {
    Skill {
        name: "Arcane Burst".to_owned(),
        cost: 120,
        health: 0.0,
        magic: 1.2,
        attack: 0.5,
        defense: 0.0,
    }
}

/// Stock hero with both stock skills.
#[must_use]
pub fn hero(name: &str) -> EntitySpec {
    EntitySpec {
        name: name.to_owned(),
        stats: BaseStats {
            health: 1_200,
            magic: 240,
            attack: 180,
            defense: 60,
            crit_rate: 600,
            crit_resistance: 300,
            crit_damage: 1.5,
        },
        role: Role::Unit(UnitSpec {
            kind: UnitKind::Hero,
            movement: 3,
            skills: vec![cleave(), arcane_burst()],
        }),
        upgrades: Vec::new(),
    }
}

/// Stock villager.
#[must_use]
pub fn villager(name: &str) -> EntitySpec {
    EntitySpec {
        name: name.to_owned(),
        stats: BaseStats {
            health: 360,
            magic: 0,
            attack: 70,
            defense: 20,
            crit_rate: 150,
            crit_resistance: 100,
            crit_damage: 1.5,
        },
        role: Role::Unit(UnitSpec {
            kind: UnitKind::Villager,
            movement: 2,
            skills: Vec::new(),
        }),
        upgrades: Vec::new(),
    }
}

/// Stock battle tower.
#[must_use]
pub fn battle_tower(name: &str) -> EntitySpec {
    EntitySpec {
        name: name.to_owned(),
        stats: BaseStats {
            health: 2_400,
            magic: 0,
            attack: 140,
            defense: 90,
            crit_rate: 300,
            crit_resistance: 500,
            crit_damage: 1.5,
        },
        role: Role::Structure(StructureKind::BattleTower),
        upgrades: Vec::new(),
    }
}

/// Stock town center.
#[must_use]
pub fn town_center(name: &str) -> EntitySpec {
    EntitySpec {
        name: name.to_owned(),
        stats: BaseStats {
            health: 6_000,
            magic: 0,
            attack: 0,
            defense: 120,
            crit_rate: 0,
            crit_resistance: 1_000,
            crit_damage: 1.0,
        },
        role: Role::Structure(StructureKind::TownCenter),
        upgrades: Vec::new(),
    }
}

/// Villagers, towers and town center that complete a squad around five heroes.
#[must_use]
pub fn support(prefix: &str) -> Vec<EntitySpec> {
    let mut members: Vec<EntitySpec> = (1..=VILLAGER_COUNT)
        .map(|index| villager(&format!("{prefix} Villager {index}")))
        .collect();
    members.extend((1..=TOWER_COUNT).map(|index| battle_tower(&format!("{prefix} Tower {index}"))));
    members.push(town_center(&format!("{prefix} Town Center")));
    members
}

/// Five stock heroes named after `prefix`, in slot order.
#[must_use]
pub fn heroes(prefix: &str) -> Vec<EntitySpec> {
    (1..=HERO_COUNT)
        .map(|index| hero(&format!("{prefix} Hero {index}")))
        .collect()
}

/// Stock squad built entirely from stock templates.
pub fn squad(prefix: &str) -> Result<Squad, SquadError> {
    let mut members = heroes(prefix);
    members.extend(support(prefix));
    Squad::new(members)
}
