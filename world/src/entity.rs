//! Entity state stored inside the world and the registry that allocates ids.

use std::collections::BTreeMap;

use skirmish_core::{
    EntityId, EntityKind, EntitySnapshot, EntitySpec, Modifier, ModifierError, Occupant,
    Position, Role, Skill, SkillError, StructureKind, TeamId, UnitKind,
};
use skirmish_system_combat::required_experience;

use crate::stats::StatSheet;

/// Fields only mobile units carry.
#[derive(Clone, Debug)]
pub(crate) struct UnitBody {
    pub(crate) kind: UnitKind,
    pub(crate) magic: u64,
    pub(crate) movement: u32,
    pub(crate) skills: Vec<Skill>,
    pub(crate) deaths: u32,
}

#[derive(Clone, Debug)]
pub(crate) enum Body {
    Unit(UnitBody),
    Structure(StructureKind),
}

/// One registered entity, alive or defeated.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) team: TeamId,
    pub(crate) position: Option<Position>,
    pub(crate) health: u64,
    pub(crate) experience: u64,
    pub(crate) required_experience: u64,
    pub(crate) has_moved: bool,
    pub(crate) has_attacked: bool,
    pub(crate) kills: u32,
    pub(crate) body: Body,
    sheet: StatSheet,
}

impl Entity {
    /// Builds a fresh level-one entity from its template with full vitals.
    pub(crate) fn from_spec(id: EntityId, team: TeamId, spec: EntitySpec) -> Self {
        let EntitySpec {
            name,
            stats,
            role,
            upgrades,
        } = spec;

        let mut sheet = StatSheet::new(stats);
        for upgrade in upgrades {
            sheet.push(upgrade);
        }

        let body = match role {
            Role::Unit(unit) => Body::Unit(UnitBody {
                kind: unit.kind,
                magic: 0,
                movement: unit.movement,
                skills: unit.skills,
                deaths: 0,
            }),
            Role::Structure(kind) => Body::Structure(kind),
        };

        let mut entity = Self {
            id,
            name,
            team,
            position: None,
            health: 0,
            experience: 0,
            required_experience: required_experience(1),
            has_moved: false,
            has_attacked: false,
            kills: 0,
            body,
            sheet,
        };
        entity.refill();
        entity
    }

    pub(crate) fn kind(&self) -> EntityKind {
        match &self.body {
            Body::Unit(unit) => unit.kind.into(),
            Body::Structure(kind) => (*kind).into(),
        }
    }

    pub(crate) fn occupant(&self) -> Occupant {
        match self.body {
            Body::Unit(_) => Occupant::Unit(self.id),
            Body::Structure(_) => Occupant::Structure(self.id),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) fn level(&self) -> u32 {
        self.sheet.level()
    }

    pub(crate) fn stats(&self) -> skirmish_core::EffectiveStats {
        self.sheet.effective()
    }

    pub(crate) fn magic(&self) -> u64 {
        match &self.body {
            Body::Unit(unit) => unit.magic,
            Body::Structure(_) => 0,
        }
    }

    /// Removes health and reports whether this hit defeated the entity.
    pub(crate) fn take_damage(&mut self, amount: u64) -> bool {
        let was_alive = self.is_alive();
        self.health = self.health.saturating_sub(amount);
        if was_alive && !self.is_alive() {
            if let Body::Unit(unit) = &mut self.body {
                unit.deaths = unit.deaths.saturating_add(1);
            }
            true
        } else {
            false
        }
    }

    /// Resolves the skill a hero asked for, checking ownership and magic.
    pub(crate) fn select_skill(&self, name: &str) -> Result<Skill, SkillError> {
        let Body::Unit(unit) = &self.body else {
            return Err(SkillError::NotAHero);
        };
        if unit.kind != UnitKind::Hero {
            return Err(SkillError::NotAHero);
        }
        let skill = unit
            .skills
            .iter()
            .find(|skill| skill.name == name)
            .ok_or(SkillError::NotOwned)?;
        if skill.cost > unit.magic {
            return Err(SkillError::NotAffordable {
                cost: skill.cost,
                available: unit.magic,
            });
        }
        Ok(skill.clone())
    }

    pub(crate) fn spend_magic(&mut self, cost: u64) {
        if let Body::Unit(unit) = &mut self.body {
            unit.magic = unit.magic.saturating_sub(cost);
        }
    }

    /// Adds experience and returns every level reached as a result.
    pub(crate) fn grant_experience(&mut self, amount: u64) -> Vec<u32> {
        self.experience = self.experience.saturating_add(amount);
        self.level_up()
    }

    /// Advances levels while experience covers the current threshold.
    ///
    /// A saturated threshold can never be met, which caps the level.
    pub(crate) fn level_up(&mut self) -> Vec<u32> {
        let mut reached = Vec::new();
        while self.required_experience != u64::MAX && self.experience >= self.required_experience
        {
            self.sheet.raise_level();
            self.required_experience = required_experience(self.sheet.level());
            reached.push(self.sheet.level());
        }
        if !reached.is_empty() && self.is_alive() {
            self.refill();
        }
        reached
    }

    /// Regenerates a twelfth of maximum health and magic.
    pub(crate) fn heal(&mut self) {
        if !self.is_alive() {
            return;
        }
        let stats = self.sheet.effective();
        self.health = self
            .health
            .saturating_add(stats.max_health / 12)
            .min(stats.max_health);
        if let Body::Unit(unit) = &mut self.body {
            unit.magic = unit
                .magic
                .saturating_add(stats.max_magic / 12)
                .min(stats.max_magic);
        }
    }

    pub(crate) fn apply_modifier(&mut self, modifier: Modifier) {
        self.sheet.push(modifier);
        if self.is_alive() {
            self.refill();
        }
    }

    pub(crate) fn remove_rune(&mut self, name: &str) -> Result<Modifier, ModifierError> {
        let removed = self.sheet.remove_rune(name)?;
        self.clamp_vitals();
        Ok(removed)
    }

    pub(crate) fn strip_runes(&mut self) -> Vec<Modifier> {
        let stripped = self.sheet.strip_runes();
        self.clamp_vitals();
        stripped
    }

    /// Returns to level one and forgets accumulated battle experience.
    pub(crate) fn reset_to_base_level(&mut self) {
        self.sheet.reset_level();
        self.experience = 0;
        self.required_experience = required_experience(1);
        self.clamp_vitals();
    }

    pub(crate) fn clear_tallies(&mut self) {
        self.kills = 0;
        if let Body::Unit(unit) = &mut self.body {
            unit.deaths = 0;
        }
    }

    pub(crate) fn clear_turn_flags(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
    }

    pub(crate) fn revive(&mut self, position: Position) {
        self.position = Some(position);
        self.clear_turn_flags();
        self.refill();
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        let (movement, skills, deaths) = match &self.body {
            Body::Unit(unit) => (Some(unit.movement), unit.skills.clone(), unit.deaths),
            Body::Structure(_) => (None, Vec::new(), 0),
        };
        EntitySnapshot {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            kind: self.kind(),
            position: self.position,
            health: self.health,
            magic: self.magic(),
            stats: self.sheet.effective(),
            level: self.sheet.level(),
            experience: self.experience,
            required_experience: self.required_experience,
            has_moved: self.has_moved,
            has_attacked: self.has_attacked,
            kills: self.kills,
            deaths,
            movement,
            skills,
            modifiers: self.sheet.modifiers().to_vec(),
        }
    }

    fn refill(&mut self) {
        let stats = self.sheet.effective();
        self.health = stats.max_health;
        if let Body::Unit(unit) = &mut self.body {
            unit.magic = stats.max_magic;
        }
    }

    fn clamp_vitals(&mut self) {
        let stats = self.sheet.effective();
        self.health = self.health.min(stats.max_health);
        if let Body::Unit(unit) = &mut self.body {
            unit.magic = unit.magic.min(stats.max_magic);
        }
    }
}

/// Registry that stores entities and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: EntityId::new(0),
        }
    }

    /// Identifier the next inserted entity will receive.
    pub(crate) fn peek_id(&self) -> EntityId {
        self.next_id
    }

    pub(crate) fn insert(&mut self, entity: Entity) {
        self.next_id = EntityId::new(entity.id.get().saturating_add(1));
        let _ = self.entries.insert(entity.id, entity);
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entries.values_mut()
    }
}
