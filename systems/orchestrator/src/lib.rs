#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match orchestrator: deploys two squads, runs the alternating turn loop,
//! settles rewards, and restores heroes once the match is decided.
//!
//! All randomness (critical rolls and respawn tiles) is drawn from the single
//! random source injected at construction, so a seeded match replays exactly.

mod cpu;
mod provider;
mod setup;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    saturating_pow10, AttackError, Command, EntityId, EntitySnapshot, EntitySpec, Event, Modifier,
    MoveError, PlacementError, PlayerProfile, Position, PurchaseError, RosterSnapshot, SkillError,
    TeamId, HERO_COUNT,
};
use skirmish_system_combat::{AttackIntent, CombatResolver};
use skirmish_system_shop::{Shop, ShopCatalog};
use skirmish_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use cpu::Aggressor;
pub use provider::{ActionProvider, AttackChoice, DecisionContext, Passive, MAX_DECISION_ATTEMPTS};
pub use setup::{MatchConfig, SetupError, TeamSetup};

use crate::setup::{validate_controllers, Formation};

/// How a finished match was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// The named team destroyed every enemy structure.
    Winner(TeamId),
    /// Both teams lost their last structure on the same check.
    Draw,
}

/// State of the turn machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The named team is acting.
    Turn(TeamId),
    /// The match is decided and rewards were settled.
    Over(MatchOutcome),
}

/// Reasons an in-match action was refused. The caller may retry with a different action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The match already ended.
    #[error("match is over")]
    MatchOver,
    /// The unit does not belong to the acting team.
    #[error("it is not this unit's turn")]
    NotYourTurn,
    /// The unit's team is acting but its action slot is not the open one.
    #[error("it is not this unit's action slot")]
    NotYourSlot,
    /// The hero already bought a rune this turn, or already acted.
    #[error("purchases happen once per turn, before the hero moves")]
    PurchaseClosed,
    /// No entity with the identifier exists.
    #[error("no such entity")]
    UnknownEntity,
    /// The shop does not sell a rune with the name.
    #[error("shop does not sell {0}")]
    UnknownRune(String),
    /// The world refused the move.
    #[error("move rejected: {0}")]
    Move(#[from] MoveError),
    /// The world refused the attack.
    #[error("attack rejected: {0}")]
    Attack(#[from] AttackError),
    /// The shop refused the purchase.
    #[error("purchase rejected: {0}")]
    Purchase(#[from] PurchaseError),
}

/// Outcome of a resolved attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackReport {
    /// Health removed from the target.
    pub damage: u64,
    /// Whether the critical roll succeeded.
    pub critical: bool,
    /// Whether the target was defeated by this attack.
    pub defeated: bool,
    /// Why the requested skill was refused, if it was.
    pub skill_rejected: Option<SkillError>,
}

/// Position of the open action slot within the acting team's units.
#[derive(Clone, Copy, Debug, Default)]
struct SlotCursor {
    index: usize,
    purchased: bool,
}

#[derive(Clone, Debug)]
struct TeamState {
    name: String,
    players: Vec<PlayerProfile>,
    controllers: [usize; HERO_COUNT],
    battle_currency: Vec<u64>,
    heroes: Vec<EntityId>,
    villagers: Vec<EntityId>,
    towers: Vec<EntityId>,
    town_center: EntityId,
}

impl TeamState {
    fn controller_of(&self, hero: EntityId) -> Option<usize> {
        self.heroes
            .iter()
            .position(|candidate| *candidate == hero)
            .and_then(|slot| self.controllers.get(slot).copied())
    }

    fn units(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.heroes.iter().chain(self.villagers.iter()).copied()
    }
}

/// A running or finished match between two teams.
#[derive(Debug)]
pub struct Match<R = ChaCha8Rng> {
    world: World,
    shop: Shop,
    resolver: CombatResolver,
    teams: [TeamState; 2],
    phase: Phase,
    turn: u32,
    cursor: SlotCursor,
    rng: R,
    log: Vec<Event>,
}

impl Match<ChaCha8Rng> {
    /// Creates a match whose random source is seeded from `config`.
    pub fn seeded(
        config: MatchConfig,
        teams: [TeamSetup; 2],
        catalog: ShopCatalog,
    ) -> Result<Self, SetupError> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, teams, catalog, rng)
    }
}

impl<R: Rng> Match<R> {
    /// Validates both teams and deploys them in the standard formation.
    pub fn new(
        config: MatchConfig,
        teams: [TeamSetup; 2],
        catalog: ShopCatalog,
        rng: R,
    ) -> Result<Self, SetupError> {
        for (team, setup) in TeamId::ALL.into_iter().zip(teams.iter()) {
            validate_controllers(team, setup)?;
        }

        let mut world = World::with_dimensions(config.columns, config.rows);
        let mut log = Vec::new();
        let [first, second] = teams;
        let teams = [
            deploy(&mut world, TeamId::One, first, config.rows, &mut log)?,
            deploy(&mut world, TeamId::Two, second, config.rows, &mut log)?,
        ];
        info!(
            team_one = %teams[0].name,
            team_two = %teams[1].name,
            "match deployed"
        );

        Ok(Self {
            world,
            shop: Shop::new(catalog),
            resolver: CombatResolver::new(),
            teams,
            phase: Phase::Turn(TeamId::One),
            turn: 1,
            cursor: SlotCursor::default(),
            rng,
            log,
        })
    }

    /// Current state of the turn machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current turn number. Every team turn advances it by one.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Read-only battlefield.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Shop selling this match's runes and upgrades.
    #[must_use]
    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    /// Every event the world emitted since deployment began.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.log
    }

    /// Hero identifiers of `team` in action slot order.
    #[must_use]
    pub fn heroes(&self, team: TeamId) -> &[EntityId] {
        &self.teams[team.index()].heroes
    }

    /// Villager identifiers of `team` in action slot order.
    #[must_use]
    pub fn villagers(&self, team: TeamId) -> &[EntityId] {
        &self.teams[team.index()].villagers
    }

    /// Battle tower identifiers of `team`.
    #[must_use]
    pub fn towers(&self, team: TeamId) -> &[EntityId] {
        &self.teams[team.index()].towers
    }

    /// Town center identifier of `team`.
    #[must_use]
    pub fn town_center(&self, team: TeamId) -> EntityId {
        self.teams[team.index()].town_center
    }

    /// Battle currency held by each player of `team`.
    #[must_use]
    pub fn battle_currency(&self, team: TeamId) -> &[u64] {
        &self.teams[team.index()].battle_currency
    }

    /// Player profiles of both teams, including rewards once the match is over.
    #[must_use]
    pub fn rosters(&self) -> [RosterSnapshot; 2] {
        self.teams.clone().map(|team| RosterSnapshot {
            profiles: team.players,
        })
    }

    /// Unit whose action slot is open.
    ///
    /// Heroes act first, then villagers, each in slot order. Defeated units
    /// are skipped. `None` once every slot of the acting team is closed or
    /// the match is over.
    #[must_use]
    pub fn current_slot(&self) -> Option<EntityId> {
        self.open_slot().map(|(_, unit)| unit)
    }

    /// Closes the open action slot, forfeiting whatever it did not use.
    ///
    /// Returns the unit whose slot opens next.
    pub fn end_slot(&mut self) -> Result<Option<EntityId>, ActionError> {
        if let Phase::Over(_) = self.phase {
            return Err(ActionError::MatchOver);
        }
        self.close_slot();
        Ok(self.current_slot())
    }

    #[cfg(test)]
    fn apply_command(&mut self, command: Command) -> &[Event] {
        self.submit(command)
    }

    /// Buys the named rune for `hero` with its controller's battle currency.
    ///
    /// Only the hero in the open slot may buy, once, before it moves or attacks.
    /// Returns the currency the controller has left.
    pub fn purchase_rune(&mut self, hero: EntityId, rune: &str) -> Result<u64, ActionError> {
        let (team, buyer) = self.slot_unit(hero)?;
        if self.cursor.purchased || buyer.has_moved || buyer.has_attacked {
            return Err(ActionError::PurchaseClosed);
        }
        let record = self
            .shop
            .rune(rune)
            .cloned()
            .ok_or_else(|| ActionError::UnknownRune(rune.to_owned()))?;
        let controller = self.teams[team.index()]
            .controller_of(hero)
            .ok_or(PurchaseError::NotAHero)?;
        let available = self.teams[team.index()].battle_currency[controller];

        let purchase = self.shop.purchase(&buyer, &record, available)?;
        self.teams[team.index()].battle_currency[controller] = purchase.remaining;
        self.cursor.purchased = true;
        let _ = self.submit(purchase.command);
        debug!(
            %hero,
            rune = %rune,
            cost = purchase.cost,
            remaining = purchase.remaining,
            "rune bought"
        );
        Ok(purchase.remaining)
    }

    /// Moves the unit in the open slot.
    pub fn move_unit(&mut self, unit: EntityId, destination: Position) -> Result<(), ActionError> {
        let _ = self.slot_unit(unit)?;
        query::check_move(&self.world, unit, destination)?;
        let events = self.submit(Command::MoveUnit { unit, destination });
        match events.iter().find_map(|event| match event {
            Event::MoveRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            Some(reason) => Err(ActionError::Move(reason)),
            None => Ok(()),
        }
    }

    /// Attacks with the unit in the open slot, rolling the critical hit first.
    ///
    /// The attack is the slot's last action, so a resolved attack closes it.
    pub fn attack(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        skill: Option<String>,
    ) -> Result<AttackReport, ActionError> {
        let _ = self.slot_unit(attacker)?;
        let report = self.strike(attacker, target, skill)?;
        self.close_slot();
        Ok(report)
    }

    /// Plays one full turn for the acting team with decisions from `provider`.
    pub fn play_turn<P>(&mut self, provider: &mut P) -> Phase
    where
        P: ActionProvider + ?Sized,
    {
        let Phase::Turn(team) = self.phase else {
            return self.phase;
        };

        while let Some(unit) = self.current_slot() {
            if self.teams[team.index()].heroes.contains(&unit) {
                self.offer_purchase(team, unit, provider);
                self.require_move(team, unit, provider);
                self.offer_attack(team, unit, provider);
            } else {
                self.require_move(team, unit, provider);
                self.strike_first_adjacent(unit, |_| true);
            }
            if self.current_slot() == Some(unit) {
                self.close_slot();
            }
        }

        self.finish_turn()
    }

    /// Closes any open slots, lets towers act, then runs upkeep, respawns, and
    /// the termination check.
    ///
    /// [`Match::play_turn`] calls this; callers driving units through the
    /// stepwise API call it themselves once their units are done.
    pub fn finish_turn(&mut self) -> Phase {
        let Phase::Turn(team) = self.phase else {
            return self.phase;
        };

        let towers = self.teams[team.index()].towers.clone();
        for tower in towers {
            if self.is_alive(tower) {
                self.strike_first_adjacent(tower, |target| target.is_unit());
            }
        }

        let _ = self.submit(Command::EndTurn { team });
        self.accrue_currency(team);
        self.respawn_defeated(team.opponent());
        self.turn = self.turn.saturating_add(1);
        self.cursor = SlotCursor::default();

        let eliminated = TeamId::ALL.map(|candidate| query::is_eliminated(&self.world, candidate));
        self.phase = match eliminated {
            [true, true] => Phase::Over(MatchOutcome::Draw),
            [true, false] => Phase::Over(MatchOutcome::Winner(TeamId::Two)),
            [false, true] => Phase::Over(MatchOutcome::Winner(TeamId::One)),
            [false, false] => Phase::Turn(team.opponent()),
        };
        if let Phase::Over(outcome) = self.phase {
            info!(?outcome, turn = self.turn, "match decided");
            self.settle(outcome);
        }
        self.phase
    }

    /// Resolves an attack without slot bookkeeping. Towers and villagers strike through this.
    fn strike(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        skill: Option<String>,
    ) -> Result<AttackReport, ActionError> {
        let source = query::entity(&self.world, attacker).ok_or(ActionError::UnknownEntity)?;
        query::check_attack(&self.world, attacker, target)?;
        let victim = query::entity(&self.world, target).ok_or(ActionError::UnknownEntity)?;

        let mut commands = Vec::new();
        let _ = self.resolver.handle(
            &source,
            &victim,
            AttackIntent { skill },
            &mut self.rng,
            &mut commands,
        );

        let mut report = AttackReport {
            damage: 0,
            critical: false,
            defeated: false,
            skill_rejected: None,
        };
        for command in commands {
            for event in self.submit(command) {
                match event {
                    Event::AttackResolved {
                        damage, critical, ..
                    } => {
                        report.damage = *damage;
                        report.critical = *critical;
                    }
                    Event::EntityDefeated { entity, .. } if *entity == target => {
                        report.defeated = true;
                    }
                    Event::SkillRejected { reason, .. } => report.skill_rejected = Some(*reason),
                    Event::AttackRejected { reason, .. } => {
                        return Err(ActionError::Attack(*reason));
                    }
                    _ => {}
                }
            }
        }
        debug!(%attacker, %target, damage = report.damage, critical = report.critical, "attack");
        Ok(report)
    }

    /// Plays turns until the match is decided.
    pub fn run<A, B>(&mut self, team_one: &mut A, team_two: &mut B) -> MatchOutcome
    where
        A: ActionProvider + ?Sized,
        B: ActionProvider + ?Sized,
    {
        loop {
            if let Some(outcome) = self.run_for(team_one, team_two, u32::MAX) {
                return outcome;
            }
        }
    }

    /// Plays at most `max_turns` turns, returning the outcome if the match was decided.
    pub fn run_for<A, B>(
        &mut self,
        team_one: &mut A,
        team_two: &mut B,
        max_turns: u32,
    ) -> Option<MatchOutcome>
    where
        A: ActionProvider + ?Sized,
        B: ActionProvider + ?Sized,
    {
        for _ in 0..max_turns {
            let phase = match self.phase {
                Phase::Turn(TeamId::One) => self.play_turn(team_one),
                Phase::Turn(TeamId::Two) => self.play_turn(team_two),
                Phase::Over(outcome) => return Some(outcome),
            };
            if let Phase::Over(outcome) = phase {
                return Some(outcome);
            }
        }
        match self.phase {
            Phase::Over(outcome) => Some(outcome),
            Phase::Turn(_) => None,
        }
    }

    fn submit(&mut self, command: Command) -> &[Event] {
        let start = self.log.len();
        world::apply(&mut self.world, command, &mut self.log);
        let emitted = &self.log[start..];
        for event in emitted {
            if let Event::LeveledUp { entity, level } = event {
                info!(%entity, level, "leveled up");
            }
        }
        emitted
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        query::entity(&self.world, entity).is_some_and(|snapshot| snapshot.is_alive())
    }

    fn turn_unit(&self, entity: EntityId) -> Result<(TeamId, EntitySnapshot), ActionError> {
        let team = match self.phase {
            Phase::Turn(team) => team,
            Phase::Over(_) => return Err(ActionError::MatchOver),
        };
        let snapshot = query::entity(&self.world, entity).ok_or(ActionError::UnknownEntity)?;
        if snapshot.team != team {
            return Err(ActionError::NotYourTurn);
        }
        Ok((team, snapshot))
    }

    fn slot_unit(&self, entity: EntityId) -> Result<(TeamId, EntitySnapshot), ActionError> {
        let acting = self.turn_unit(entity)?;
        if self.current_slot() != Some(entity) {
            return Err(ActionError::NotYourSlot);
        }
        Ok(acting)
    }

    fn open_slot(&self) -> Option<(usize, EntityId)> {
        let Phase::Turn(team) = self.phase else {
            return None;
        };
        self.teams[team.index()]
            .units()
            .enumerate()
            .skip(self.cursor.index)
            .find(|(_, unit)| self.is_alive(*unit))
    }

    fn close_slot(&mut self) {
        if let Some((index, _)) = self.open_slot() {
            self.cursor = SlotCursor {
                index: index + 1,
                purchased: false,
            };
        }
    }

    fn context(&self, team: TeamId, unit: EntityId) -> Option<DecisionContext<'_>> {
        let snapshot = query::entity(&self.world, unit)?;
        let state = &self.teams[team.index()];
        let controller = state.controller_of(unit);
        let battle_currency = controller
            .and_then(|index| state.battle_currency.get(index).copied())
            .unwrap_or(0);
        Some(DecisionContext {
            world: &self.world,
            unit: snapshot,
            controller,
            battle_currency,
            turn: self.turn,
        })
    }

    fn offer_purchase<P>(&mut self, team: TeamId, hero: EntityId, provider: &mut P)
    where
        P: ActionProvider + ?Sized,
    {
        let mut rejected = None;
        for _ in 0..MAX_DECISION_ATTEMPTS {
            let Some(context) = self.context(team, hero) else {
                return;
            };
            let offers: Vec<Modifier> = self
                .shop
                .offers(context.battle_currency)
                .cloned()
                .collect();
            if offers.is_empty() {
                return;
            }
            let Some(rune) = provider.choose_purchase(&context, &offers, rejected.as_ref()) else {
                return;
            };
            match self.purchase_rune(hero, &rune) {
                Ok(_) => return,
                Err(error) => {
                    debug!(%hero, rune = %rune, %error, "purchase refused");
                    rejected = Some(error);
                }
            }
        }
        warn!(%hero, "purchase forfeited after repeated rejections");
    }

    fn require_move<P>(&mut self, team: TeamId, unit: EntityId, provider: &mut P)
    where
        P: ActionProvider + ?Sized,
    {
        let mut rejected = None;
        for _ in 0..MAX_DECISION_ATTEMPTS {
            let Some(context) = self.context(team, unit) else {
                return;
            };
            let Some(destination) = provider.choose_move(&context, rejected.as_ref()) else {
                debug!(%unit, "move declined by provider");
                return;
            };
            match self.move_unit(unit, destination) {
                Ok(()) => return,
                Err(error) => {
                    debug!(%unit, %destination, %error, "move refused");
                    rejected = Some(error);
                }
            }
        }
        warn!(%unit, "move forfeited after repeated rejections");
    }

    fn offer_attack<P>(&mut self, team: TeamId, hero: EntityId, provider: &mut P)
    where
        P: ActionProvider + ?Sized,
    {
        let mut rejected = None;
        for _ in 0..MAX_DECISION_ATTEMPTS {
            let targets = query::adjacent_enemies(&self.world, hero);
            if targets.is_empty() {
                return;
            }
            let Some(context) = self.context(team, hero) else {
                return;
            };
            let Some(choice) = provider.choose_attack(&context, &targets, rejected.as_ref()) else {
                return;
            };
            match self.attack(hero, choice.target, choice.skill) {
                Ok(_) => return,
                Err(error) => {
                    debug!(%hero, target = %choice.target, %error, "attack refused");
                    rejected = Some(error);
                }
            }
        }
        warn!(%hero, "attack forfeited after repeated rejections");
    }

    fn strike_first_adjacent<F>(&mut self, attacker: EntityId, eligible: F)
    where
        F: Fn(&EntitySnapshot) -> bool,
    {
        let target = query::adjacent_enemies(&self.world, attacker)
            .into_iter()
            .find(|candidate| eligible(candidate));
        if let Some(target) = target {
            if let Err(error) = self.strike(attacker, target.id, None) {
                debug!(%attacker, target = %target.id, %error, "automatic attack refused");
            }
        }
    }

    fn accrue_currency(&mut self, team: TeamId) {
        let income = saturating_pow10(self.turn);
        let state = &mut self.teams[team.index()];
        for slot in 0..state.heroes.len() {
            let Some(controller) = state.controllers.get(slot).copied() else {
                continue;
            };
            if let Some(purse) = state.battle_currency.get_mut(controller) {
                *purse = purse.saturating_add(income);
            }
        }
    }

    fn respawn_defeated(&mut self, team: TeamId) {
        let fallen: Vec<EntityId> = self.teams[team.index()]
            .units()
            .filter(|unit| !self.is_alive(*unit))
            .collect();
        for unit in fallen {
            let free = query::free_positions(&self.world);
            if free.is_empty() {
                warn!(%unit, "no free tile to respawn on");
                continue;
            }
            let position = free[self.rng.gen_range(0..free.len())];
            let _ = self.submit(Command::Respawn { unit, position });
            debug!(%unit, %position, "respawned");
        }
    }

    fn settle(&mut self, outcome: MatchOutcome) {
        for team in TeamId::ALL {
            let won = outcome == MatchOutcome::Winner(team);
            let heroes = self.teams[team.index()].heroes.clone();
            for (slot, hero) in heroes.iter().enumerate() {
                let kills = query::entity(&self.world, *hero).map_or(0, |snapshot| snapshot.kills);
                let reward = hero_reward(kills, won);
                let state = &mut self.teams[team.index()];
                let controller = state.controllers.get(slot).copied();
                let Some(player) = controller.and_then(|index| state.players.get_mut(index)) else {
                    continue;
                };
                player.currency = player.currency.saturating_add(reward);
                debug!(%hero, kills, reward, player = %player.name, "reward credited");
            }

            let state = &mut self.teams[team.index()];
            if won {
                for player in &mut state.players {
                    player.rank = player.rank.saturating_add(1);
                }
            }
            state.battle_currency.fill(0);

            for hero in heroes {
                for command in [
                    Command::StripRunes { entity: hero },
                    Command::ResetToBaseLevel { entity: hero },
                    Command::ClearTallies { entity: hero },
                ] {
                    let _ = self.submit(command);
                }
            }
        }
    }
}

/// Persistent currency a hero earns for its controller when the match ends.
#[must_use]
pub fn hero_reward(kills: u32, won: bool) -> u64 {
    if won {
        saturating_pow10(kills)
    } else {
        saturating_pow10(kills / 5)
    }
}

fn deploy(
    world: &mut World,
    team: TeamId,
    setup: TeamSetup,
    rows: u32,
    log: &mut Vec<Event>,
) -> Result<TeamState, SetupError> {
    let formation = Formation::for_team(team, rows);
    let squad = setup.squad;
    let mut place = |spec: &EntitySpec, position: Position| -> Result<EntityId, SetupError> {
        let start = log.len();
        world::apply(
            world,
            Command::PlaceEntity {
                team,
                spec: spec.clone(),
                position,
            },
            log,
        );
        match log.get(start) {
            Some(Event::EntityPlaced { entity, .. }) => Ok(*entity),
            Some(Event::PlacementRejected { reason, .. }) => Err(SetupError::Deployment {
                team,
                position,
                reason: *reason,
            }),
            _ => Err(SetupError::Deployment {
                team,
                position,
                reason: PlacementError::UnknownEntity,
            }),
        }
    };

    let town_center = place(squad.town_center(), formation.town_center)?;
    let towers = squad
        .towers()
        .iter()
        .zip(formation.towers)
        .map(|(spec, position)| place(spec, position))
        .collect::<Result<Vec<_>, _>>()?;
    let heroes = squad
        .heroes()
        .iter()
        .zip(formation.heroes)
        .map(|(spec, position)| place(spec, position))
        .collect::<Result<Vec<_>, _>>()?;
    let villagers = squad
        .villagers()
        .iter()
        .zip(formation.villagers)
        .map(|(spec, position)| place(spec, position))
        .collect::<Result<Vec<_>, _>>()?;

    let battle_currency = vec![0; setup.players.len()];
    Ok(TeamState {
        name: setup.name,
        players: setup.players,
        controllers: setup.controllers,
        battle_currency,
        heroes,
        villagers,
        towers,
        town_center,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use skirmish_core::{presets, EntityKind, Squad};

    fn stock_team(prefix: &str) -> TeamSetup {
        team_with(prefix, presets::squad(prefix).expect("stock squad"))
    }

    fn team_with(prefix: &str, squad: Squad) -> TeamSetup {
        TeamSetup {
            name: prefix.to_owned(),
            squad,
            players: vec![PlayerProfile {
                name: format!("{prefix} Player"),
                currency: 0,
                rank: 0,
                heroes: Vec::new(),
            }],
            controllers: [0; HERO_COUNT],
        }
    }

    // A zero draw crits whenever the chance is positive and picks the first
    // free tile for respawns.
    fn match_between(one: TeamSetup, two: TeamSetup) -> Match<StepRng> {
        Match::new(
            MatchConfig::default(),
            [one, two],
            ShopCatalog::standard(),
            StepRng::new(0, 0),
        )
        .expect("match deploys")
    }

    fn stock_match() -> Match<StepRng> {
        match_between(stock_team("North"), stock_team("South"))
    }

    fn drop_in(
        game: &mut Match<StepRng>,
        team: TeamId,
        spec: EntitySpec,
        x: u32,
        y: u32,
    ) -> EntityId {
        let events = game.apply_command(Command::PlaceEntity {
            team,
            spec,
            position: Position::new(x, y),
        });
        match events.first() {
            Some(Event::EntityPlaced { entity, .. }) => *entity,
            other => panic!("placement failed: {other:?}"),
        }
    }

    fn demolish(game: &mut Match<StepRng>, team: TeamId) {
        let mut structures = game.towers(team).to_vec();
        structures.push(game.town_center(team));
        for entity in structures {
            let _ = game.apply_command(Command::DamageEntity {
                entity,
                amount: u64::MAX,
            });
        }
    }

    fn attacks_since(game: &Match<StepRng>, start: usize) -> Vec<(EntityId, EntityId, u64)> {
        game.events()[start..]
            .iter()
            .filter_map(|event| match event {
                Event::AttackResolved {
                    attacker,
                    target,
                    damage,
                    ..
                } => Some((*attacker, *target, *damage)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn deployment_places_both_squads() {
        let game = stock_match();
        assert_eq!(game.phase(), Phase::Turn(TeamId::One));
        assert_eq!(game.turn(), 1);
        assert_eq!(query::entity_view(game.world()).iter().count(), 28);
        let keep = query::entity(game.world(), game.town_center(TeamId::Two)).expect("keep");
        assert_eq!(keep.position, Some(Position::new(9, 19)));
        assert_eq!(keep.kind, EntityKind::TownCenter);
        assert_eq!(game.current_slot(), Some(game.heroes(TeamId::One)[0]));
    }

    #[test]
    fn passive_turn_accrues_currency_and_passes_control() {
        let mut game = stock_match();
        assert_eq!(game.play_turn(&mut Passive), Phase::Turn(TeamId::Two));
        assert_eq!(game.battle_currency(TeamId::One), &[50]);
        assert_eq!(game.battle_currency(TeamId::Two), &[0]);
        assert_eq!(game.turn(), 2);
        assert_eq!(game.current_slot(), Some(game.heroes(TeamId::Two)[0]));

        assert_eq!(game.play_turn(&mut Passive), Phase::Turn(TeamId::One));
        assert_eq!(game.battle_currency(TeamId::Two), &[500]);
    }

    #[test]
    fn units_of_the_waiting_team_cannot_act() {
        let mut game = stock_match();
        let hero = game.heroes(TeamId::Two)[0];
        assert_eq!(
            game.move_unit(hero, Position::new(5, 14)),
            Err(ActionError::NotYourTurn)
        );
        assert_eq!(
            game.purchase_rune(hero, "Rune of Fury"),
            Err(ActionError::NotYourTurn)
        );
    }

    #[test]
    fn purchase_spends_controller_currency_once_per_slot() {
        let mut game = stock_match();
        let _ = game.finish_turn();
        let _ = game.finish_turn();
        let hero = game.heroes(TeamId::One)[0];
        assert_eq!(game.battle_currency(TeamId::One), &[50]);

        assert_eq!(
            game.purchase_rune(hero, "Rune of Stone"),
            Err(ActionError::Purchase(PurchaseError::Unaffordable {
                cost: 100,
                available: 50
            }))
        );
        assert_eq!(
            game.purchase_rune(hero, "Rune of Nothing"),
            Err(ActionError::UnknownRune("Rune of Nothing".to_owned()))
        );
        assert_eq!(game.purchase_rune(hero, "Rune of Fury"), Ok(40));
        assert_eq!(
            game.purchase_rune(hero, "Rune of Fury"),
            Err(ActionError::PurchaseClosed)
        );
        assert_eq!(game.battle_currency(TeamId::One), &[40]);
        let snapshot = query::entity(game.world(), hero).expect("hero");
        assert_eq!(snapshot.stats.attack, 225);
        assert_eq!(snapshot.modifiers.len(), 1);
    }

    #[test]
    fn purchase_closes_once_the_hero_moved() {
        let mut game = stock_match();
        let _ = game.finish_turn();
        let _ = game.finish_turn();
        let hero = game.heroes(TeamId::One)[0];

        game.move_unit(hero, Position::new(5, 4)).expect("two tiles south");
        assert_eq!(
            game.purchase_rune(hero, "Rune of Fury"),
            Err(ActionError::PurchaseClosed)
        );
        assert_eq!(game.battle_currency(TeamId::One), &[50]);
    }

    #[test]
    fn simultaneous_elimination_is_a_draw() {
        let mut game = stock_match();
        demolish(&mut game, TeamId::One);
        demolish(&mut game, TeamId::Two);

        assert_eq!(game.finish_turn(), Phase::Over(MatchOutcome::Draw));
        let [north, south] = game.rosters();
        assert_eq!(north.profiles[0].currency, 5);
        assert_eq!(south.profiles[0].currency, 5);
        assert_eq!(north.profiles[0].rank, 0);
        assert_eq!(south.profiles[0].rank, 0);
        assert_eq!(game.current_slot(), None);
        assert_eq!(
            game.move_unit(game.heroes(TeamId::One)[0], Position::new(5, 5)),
            Err(ActionError::MatchOver)
        );
        assert_eq!(game.end_slot(), Err(ActionError::MatchOver));
    }

    #[test]
    fn winner_gains_rank_and_battle_currency_is_cleared() {
        let mut game = stock_match();
        demolish(&mut game, TeamId::Two);

        assert_eq!(
            game.finish_turn(),
            Phase::Over(MatchOutcome::Winner(TeamId::One))
        );
        let [north, south] = game.rosters();
        assert_eq!(north.profiles[0].rank, 1);
        assert_eq!(north.profiles[0].currency, 5);
        assert_eq!(south.profiles[0].rank, 0);
        assert_eq!(game.battle_currency(TeamId::One), &[0]);
        assert_eq!(
            game.finish_turn(),
            Phase::Over(MatchOutcome::Winner(TeamId::One))
        );
    }

    #[test]
    fn defeated_enemy_units_respawn_at_end_of_turn() {
        let mut game = stock_match();
        let fallen = game.heroes(TeamId::Two)[1];
        let before = query::entity(game.world(), fallen)
            .and_then(|snapshot| snapshot.position)
            .expect("hero placed");
        let _ = game.apply_command(Command::DamageEntity {
            entity: fallen,
            amount: u64::MAX,
        });

        assert_eq!(game.finish_turn(), Phase::Turn(TeamId::Two));
        let revived = query::entity(game.world(), fallen).expect("hero exists");
        assert!(revived.is_alive());
        assert_eq!(revived.health, revived.stats.max_health);
        assert_eq!(revived.position, Some(Position::new(0, 0)));
        assert!(game.events().iter().any(|event| matches!(
            event,
            Event::UnitRespawned { unit, from: Some(from), .. } if *unit == fallen && *from == before
        )));
    }

    #[test]
    fn runes_and_levels_are_reset_when_the_match_ends() {
        let mut game = stock_match();
        let _ = game.finish_turn();
        let _ = game.finish_turn();
        let hero = game.heroes(TeamId::One)[0];
        assert_eq!(game.purchase_rune(hero, "Rune of Fury"), Ok(40));
        let _ = game.apply_command(Command::GrantExperience {
            entity: hero,
            amount: 10,
        });
        assert_eq!(query::entity(game.world(), hero).map(|s| s.level), Some(2));

        demolish(&mut game, TeamId::Two);
        let _ = game.finish_turn();

        let snapshot = query::entity(game.world(), hero).expect("hero");
        assert!(snapshot.modifiers.is_empty());
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.experience, 0);
        assert_eq!(snapshot.stats.attack, 180);
        assert_eq!(snapshot.kills, 0);
    }

    #[test]
    fn defeated_units_lose_their_slot() {
        let mut game = stock_match();
        let heroes = game.heroes(TeamId::One).to_vec();
        let _ = game.apply_command(Command::DamageEntity {
            entity: heroes[0],
            amount: u64::MAX,
        });

        assert_eq!(game.current_slot(), Some(heroes[1]));
        assert_eq!(
            game.move_unit(heroes[0], Position::new(5, 4)),
            Err(ActionError::NotYourSlot)
        );
    }

    #[test]
    fn towers_strike_adjacent_units_but_never_structures() {
        let mut game = stock_match();
        let tower = game.towers(TeamId::One)[0];
        let keep = game.town_center(TeamId::One);
        let intruder = drop_in(&mut game, TeamId::Two, presets::villager("Intruder"), 4, 1);
        let rival = drop_in(&mut game, TeamId::Two, presets::battle_tower("Rival"), 6, 1);
        let _ = drop_in(&mut game, TeamId::Two, presets::villager("Loiterer"), 10, 0);

        let start = game.events().len();
        assert_eq!(game.finish_turn(), Phase::Turn(TeamId::Two));

        let attacks = attacks_since(&game, start);
        assert_eq!(attacks, vec![(tower, intruder, 190)]);
        assert!(attacks.iter().all(|(attacker, _, _)| *attacker != keep));
        assert!(attacks.iter().all(|(_, target, _)| *target != rival));
    }

    #[test]
    fn villagers_strike_the_first_enemy_in_compass_order() {
        let mut game = stock_match();
        let villager = game.villagers(TeamId::One)[0];
        let south = drop_in(&mut game, TeamId::Two, presets::villager("South Pest"), 5, 4);
        let east = drop_in(&mut game, TeamId::Two, presets::hero("East Raider"), 6, 3);

        let start = game.events().len();
        assert_eq!(game.play_turn(&mut Passive), Phase::Turn(TeamId::Two));

        let by_villager: Vec<_> = attacks_since(&game, start)
            .into_iter()
            .filter(|(attacker, _, _)| *attacker == villager)
            .collect();
        assert_eq!(by_villager, vec![(villager, east, 10)]);
        assert_eq!(
            query::entity(game.world(), south).map(|s| s.health),
            Some(360)
        );
    }

    #[test]
    fn tower_kills_earn_experience_and_levels() {
        let mut game = stock_match();
        let tower = game.towers(TeamId::One)[0];
        let raider = drop_in(&mut game, TeamId::Two, presets::hero("Raider"), 4, 1);
        let _ = game.apply_command(Command::DamageEntity {
            entity: raider,
            amount: 1_190,
        });

        let start = game.events().len();
        let _ = game.finish_turn();

        let emitted = &game.events()[start..];
        assert!(emitted.contains(&Event::EntityDefeated {
            entity: raider,
            by: Some(tower),
        }));
        assert!(emitted.contains(&Event::ExperienceGained {
            entity: tower,
            amount: 10,
        }));
        assert!(emitted.contains(&Event::LeveledUp {
            entity: tower,
            level: 2,
        }));
        let snapshot = query::entity(game.world(), tower).expect("tower");
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.kills, 1);
        assert_eq!(snapshot.stats.attack, 280);
    }

    #[test]
    fn unaffordable_skill_still_lands_a_plain_attack() {
        let mut heroes = presets::heroes("North");
        heroes[0].stats.magic = 30;
        heroes.extend(presets::support("North"));
        let squad = Squad::new(heroes).expect("valid squad");
        let mut game = match_between(team_with("North", squad), stock_team("South"));
        let [drained, fresh] = [game.heroes(TeamId::One)[0], game.heroes(TeamId::One)[1]];
        let target = drop_in(&mut game, TeamId::Two, presets::villager("Target"), 6, 2);

        let report = game
            .attack(drained, target, Some("Cleave".to_owned()))
            .expect("adjacent enemy");
        assert_eq!(
            report,
            AttackReport {
                damage: 250,
                critical: true,
                defeated: false,
                skill_rejected: Some(SkillError::NotAffordable {
                    cost: 40,
                    available: 30
                }),
            }
        );
        assert_eq!(query::entity(game.world(), drained).map(|s| s.magic), Some(30));
        assert_eq!(game.current_slot(), Some(fresh));

        let report = game
            .attack(fresh, target, Some("Cleave".to_owned()))
            .expect("adjacent enemy");
        assert_eq!(report.damage, 430);
        assert!(report.defeated);
        assert_eq!(report.skill_rejected, None);
        assert_eq!(query::entity(game.world(), fresh).map(|s| s.magic), Some(200));
    }

    #[test]
    fn reward_curves() {
        assert_eq!(hero_reward(0, true), 1);
        assert_eq!(hero_reward(3, true), 1_000);
        assert_eq!(hero_reward(4, false), 1);
        assert_eq!(hero_reward(10, false), 100);
    }
}
