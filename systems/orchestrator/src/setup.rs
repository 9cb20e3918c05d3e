//! Match configuration, team setup, and the standard deployment formation.

use skirmish_core::{
    presets, EntitySpec, PlacementError, PlayerProfile, Position, Squad, SquadError, TeamId,
    GRID_COLUMNS, GRID_ROWS, HERO_COUNT,
};
use thiserror::Error;

/// Columns used by the five hero and villager slots, in slot order.
const SLOT_COLUMNS: [u32; HERO_COUNT] = [5, 7, 9, 11, 13];
/// Columns used by the three battle towers.
const TOWER_COLUMNS: [u32; 3] = [5, 9, 13];
const TOWN_CENTER_COLUMN: u32 = 9;

const TOWN_CENTER_ROW: u32 = 0;
const TOWER_ROW: u32 = 1;
const HERO_ROW: u32 = 2;
const VILLAGER_ROW: u32 = 3;

/// Battlefield settings shared by both teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Width of the battlefield.
    pub columns: u32,
    /// Height of the battlefield.
    pub rows: u32,
    /// Seed for the match random source; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            seed: None,
        }
    }
}

/// A squad together with the players controlling its heroes.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamSetup {
    /// Display name of the team.
    pub name: String,
    /// Units and structures the team deploys.
    pub squad: Squad,
    /// Players on the team. Rewards and ranks are credited here.
    pub players: Vec<PlayerProfile>,
    /// Index into `players` of the controller of each hero slot.
    pub controllers: [usize; HERO_COUNT],
}

impl TeamSetup {
    /// Builds a single-player team from a profile's first five heroes plus stock support.
    pub fn from_profile(profile: PlayerProfile) -> Result<Self, SquadError> {
        let mut members: Vec<EntitySpec> =
            profile.heroes.iter().take(HERO_COUNT).cloned().collect();
        members.extend(presets::support(&profile.name));
        let squad = Squad::new(members)?;
        Ok(Self {
            name: profile.name.clone(),
            squad,
            players: vec![profile],
            controllers: [0; HERO_COUNT],
        })
    }
}

/// Fatal errors raised while assembling a match. No match logic runs after one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A squad does not have the standard composition.
    #[error("invalid squad: {0}")]
    Squad(#[from] SquadError),
    /// A team has no players to control its heroes.
    #[error("team {team} has no players")]
    NoPlayers {
        /// Team without players.
        team: TeamId,
    },
    /// A hero slot names a controller outside the team's player list.
    #[error("team {team} hero slot {slot} names unknown controller {controller}")]
    UnknownController {
        /// Team with the broken slot.
        team: TeamId,
        /// Hero slot index.
        slot: usize,
        /// Controller index that does not exist.
        controller: usize,
    },
    /// The formation does not fit on the configured battlefield.
    #[error("team {team} cannot deploy at {position}: {reason}")]
    Deployment {
        /// Team being deployed.
        team: TeamId,
        /// Tile that rejected the placement.
        position: Position,
        /// Reason reported by the world.
        reason: PlacementError,
    },
}

/// Standard tiles for one team, mirrored vertically for the second team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Formation {
    pub(crate) town_center: Position,
    pub(crate) towers: Vec<Position>,
    pub(crate) heroes: Vec<Position>,
    pub(crate) villagers: Vec<Position>,
}

impl Formation {
    pub(crate) fn for_team(team: TeamId, rows: u32) -> Self {
        let row = |y: u32| match team {
            TeamId::One => y,
            TeamId::Two => rows.saturating_sub(1).saturating_sub(y),
        };
        Self {
            town_center: Position::new(TOWN_CENTER_COLUMN, row(TOWN_CENTER_ROW)),
            towers: TOWER_COLUMNS
                .iter()
                .map(|x| Position::new(*x, row(TOWER_ROW)))
                .collect(),
            heroes: SLOT_COLUMNS
                .iter()
                .map(|x| Position::new(*x, row(HERO_ROW)))
                .collect(),
            villagers: SLOT_COLUMNS
                .iter()
                .map(|x| Position::new(*x, row(VILLAGER_ROW)))
                .collect(),
        }
    }
}

pub(crate) fn validate_controllers(team: TeamId, setup: &TeamSetup) -> Result<(), SetupError> {
    if setup.players.is_empty() {
        return Err(SetupError::NoPlayers { team });
    }
    for (slot, controller) in setup.controllers.iter().copied().enumerate() {
        if controller >= setup.players.len() {
            return Err(SetupError::UnknownController {
                team,
                slot,
                controller,
            });
        }
    }
    Ok(())
}
