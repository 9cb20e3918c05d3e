//! JSON persistence of player rosters and their conversion into match teams.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use skirmish_core::{presets, EntityKind, PlayerProfile, RosterSnapshot, Squad, HERO_COUNT};
use skirmish_system_orchestrator::TeamSetup;

/// Builds the team called `name` from the roster at `path`, or a stock team without one.
pub(crate) fn team_setup(name: &str, path: Option<&Path>) -> Result<TeamSetup> {
    let roster = match path {
        Some(path) => load_roster(path)?,
        None => stock_roster(name),
    };
    team_from_roster(name, roster)
}

pub(crate) fn load_roster(path: &Path) -> Result<RosterSnapshot> {
    let contents = fs::read(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("failed to parse roster {}", path.display()))
}

pub(crate) fn save_roster(path: &Path, roster: &RosterSnapshot) -> Result<()> {
    let json = serde_json::to_vec_pretty(roster).context("failed to serialise roster")?;
    fs::write(path, json).with_context(|| format!("failed to write roster {}", path.display()))
}

/// Fills the hero slots from the profiles in order; each slot is controlled by
/// the profile that owns the hero.
fn team_from_roster(name: &str, roster: RosterSnapshot) -> Result<TeamSetup> {
    if roster.profiles.is_empty() {
        bail!("roster for {name} has no players");
    }

    let mut controllers = [0; HERO_COUNT];
    let mut members = Vec::new();
    let owned = roster.profiles.iter().enumerate().flat_map(|(owner, profile)| {
        profile
            .heroes
            .iter()
            .filter(|hero| hero.kind() == EntityKind::Hero)
            .map(move |hero| (owner, hero))
    });
    for (slot, (owner, hero)) in owned.take(HERO_COUNT).enumerate() {
        controllers[slot] = owner;
        members.push(hero.clone());
    }
    members.extend(presets::support(name));
    let squad = Squad::new(members).with_context(|| format!("roster for {name} is unusable"))?;

    Ok(TeamSetup {
        name: name.to_owned(),
        squad,
        players: roster.profiles,
        controllers,
    })
}

fn stock_roster(name: &str) -> RosterSnapshot {
    RosterSnapshot {
        profiles: vec![PlayerProfile {
            name: format!("{name} Captain"),
            currency: 0,
            rank: 0,
            heroes: presets::heroes(name),
        }],
    }
}
