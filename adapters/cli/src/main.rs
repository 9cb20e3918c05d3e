#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a seeded computer-versus-computer skirmish.

mod catalog;
mod roster;
mod upgrades;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::TeamId;
use skirmish_system_orchestrator::{Aggressor, Match, MatchConfig, MatchOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TEAM_NAMES: [&str; 2] = ["North", "South"];
const ROSTER_FILES: [&str; 2] = ["team-one.json", "team-two.json"];

/// Runs a skirmish between two computer-controlled squads.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct Args {
    /// Seed for the match and both computer players. Drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of team turns to play before stopping an undecided match.
    #[arg(long, default_value_t = 400)]
    max_turns: u32,

    /// TOML shop catalog replacing the standard runes and upgrades.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// JSON roster for the first team.
    #[arg(long, value_name = "FILE")]
    roster_one: Option<PathBuf>,

    /// JSON roster for the second team.
    #[arg(long, value_name = "FILE")]
    roster_two: Option<PathBuf>,

    /// Spend each player's rewards on upgrades for their heroes after the match.
    #[arg(long)]
    buy_upgrades: bool,

    /// Directory receiving the updated rosters once the match is over.
    #[arg(long, value_name = "DIR")]
    save_rosters: Option<PathBuf>,
}

/// Entry point for the skirmish command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "starting skirmish");

    let catalog = catalog::load_catalog(args.catalog.as_deref())?;
    let teams = [
        roster::team_setup(TEAM_NAMES[0], args.roster_one.as_deref())?,
        roster::team_setup(TEAM_NAMES[1], args.roster_two.as_deref())?,
    ];
    let config = MatchConfig {
        seed: Some(seed),
        ..MatchConfig::default()
    };
    let mut game = Match::seeded(config, teams, catalog).context("failed to set up the match")?;

    let mut north = Aggressor::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)));
    let mut south = Aggressor::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(2)));
    match game.run_for(&mut north, &mut south, args.max_turns) {
        Some(MatchOutcome::Winner(team)) => {
            println!("{} wins on turn {}", team_name(team), game.turn());
        }
        Some(MatchOutcome::Draw) => println!("draw on turn {}", game.turn()),
        None => println!("undecided after {} team turns", args.max_turns),
    }

    let mut rosters = game.rosters();
    if args.buy_upgrades {
        for roster in &mut rosters {
            let bought = upgrades::buy_upgrades(game.shop(), roster)?;
            info!(bought, "upgrades bought");
        }
    }
    for (team, roster) in TeamId::ALL.into_iter().zip(&rosters) {
        for profile in &roster.profiles {
            println!(
                "{}: {} currency {} rank {}",
                team_name(team),
                profile.name,
                profile.currency,
                profile.rank
            );
        }
    }

    if let Some(dir) = args.save_rosters {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for (file, roster) in ROSTER_FILES.iter().zip(&rosters) {
            roster::save_roster(&dir.join(file), roster)?;
        }
        info!(dir = %dir.display(), "rosters saved");
    }
    Ok(())
}

fn team_name(team: TeamId) -> &'static str {
    match team {
        TeamId::One => TEAM_NAMES[0],
        TeamId::Two => TEAM_NAMES[1],
    }
}
