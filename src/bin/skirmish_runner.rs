//! Headless Skirmish Runner
//!
//! Generates one hostile sector and lets two agents fight it out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use skirmish::battle::{generate_from_seed, Battlefield, EncounterStatus, IdAllocator, TeamAgent};
use skirmish::core::{IslandConfig, Result, TeamId};

/// Headless Skirmish Runner - agent vs agent encounters
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run an agent vs agent encounter on a generated sector")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum turns (one per team) before calling a draw
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Island config (TOML); its sector and team sizes are used
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct EncounterSummary {
    outcome: String,
    winner: Option<u8>,
    turns: u32,
    player_survivors: usize,
    enemy_survivors: usize,
    player_health: u32,
    enemy_health: u32,
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("skirmish_runner: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => IslandConfig::load(path)?,
        None => IslandConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let sector = generate_from_seed(&config.generation, seed);
    let mut bf = Battlefield::from_sector(sector, false, IdAllocator::default(), &mut rng);
    bf.set_interrupt_on_contact(config.interrupt_on_contact);

    let width = bf.grid.width as i32;
    bf.spawn_team(TeamId::PLAYER, config.soldiers_per_team, 0..width / 4, &mut rng);
    bf.spawn_team(TeamId::ENEMY, config.enemies_per_sector, width - width / 4..width, &mut rng);
    bf.start_turn(TeamId::PLAYER);

    let mut agents = [
        TeamAgent::new(TeamId::PLAYER, &bf, &mut rng),
        TeamAgent::new(TeamId::ENEMY, &bf, &mut rng),
    ];

    let mut turns = 0;
    let mut status = bf.encounter_status();
    while !status.is_decided() && turns < args.max_turns {
        let agent = &mut agents[bf.current_team().0 as usize % 2];
        status = agent.take_turn(&mut bf, &mut rng);
        turns += 1;
    }

    let team_health = |team| -> u32 {
        bf.soldiers_in_team(team)
            .iter()
            .map(|s| s.attributes.health)
            .sum()
    };
    let summary = EncounterSummary {
        outcome: match status {
            EncounterStatus::Decided { .. } => "decided".to_string(),
            EncounterStatus::Ongoing => "draw".to_string(),
        },
        winner: match status {
            EncounterStatus::Decided { winner } => Some(winner.0),
            EncounterStatus::Ongoing => None,
        },
        turns,
        player_survivors: bf.soldiers_in_team(TeamId::PLAYER).len(),
        enemy_survivors: bf.soldiers_in_team(TeamId::ENEMY).len(),
        player_health: team_health(TeamId::PLAYER),
        enemy_health: team_health(TeamId::ENEMY),
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("Encounter Result");
            println!("================");
            println!("Outcome: {}", summary.outcome);
            if let Some(winner) = summary.winner {
                println!("Winner: team {}", winner);
            }
            println!("Turns: {}", summary.turns);
            println!(
                "Survivors: {} player ({} hp), {} enemy ({} hp)",
                summary.player_survivors, summary.player_health, summary.enemy_survivors, summary.enemy_health
            );
            println!("Seed: {}", summary.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
