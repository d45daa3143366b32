//! Headless encounter runner
//!
//! Runs the colosseum encounter with a scripted player and prints a summary.

use std::path::PathBuf;

use clap::Parser;
use colosseum_sim::core::config::SimulationConfig;
use colosseum_sim::core::error::Result;
use colosseum_sim::core::types::UnitId;
use colosseum_sim::units::Loadout;
use colosseum_sim::world::arena::{colosseum, colosseum_encounter, PLAYER_START};
use colosseum_sim::world::{InputScript, Scenario, ScriptCommand, ScriptStep, SimulationEvent, World};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Colosseum encounter runner
#[derive(Parser, Debug)]
#[command(name = "colosseum-sim")]
#[command(about = "Run a Sol Heredit encounter headless and print a summary")]
struct Args {
    /// Random seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before the run is called a timeout
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player loadout (TOML); a melee setup when omitted
    #[arg(long)]
    loadout: Option<PathBuf>,

    /// Replay query, e.g. "?x=27&y=29&sol=[[14,10]]"
    #[arg(long)]
    spawns: Option<String>,

    /// Player input script (TOML); attacks the first mob when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Default, Serialize)]
struct EncounterSummary {
    outcome: String,
    ticks: u64,
    seed: u64,
    player_hitpoints: i32,
    damage_taken: i32,
    damage_dealt: i32,
    hits_blocked: usize,
    boss_phase: i32,
    hazards_placed: usize,
    events: usize,
}

impl EncounterSummary {
    fn record(&mut self, player: UnitId, events: &[SimulationEvent]) {
        self.events += events.len();
        for event in events {
            match event {
                SimulationEvent::Hitsplat {
                    target,
                    damage,
                    blocked,
                    ..
                } => {
                    if *target == player {
                        self.damage_taken += damage;
                        self.hits_blocked += usize::from(*blocked);
                    } else {
                        self.damage_dealt += damage;
                    }
                }
                SimulationEvent::PhaseChanged { phase, .. } => {
                    self.boss_phase = self.boss_phase.max(*phase);
                }
                SimulationEvent::HazardsPlaced { tiles, .. } => {
                    self.hazards_placed += tiles.len();
                }
                _ => {}
            }
        }
    }
}

fn default_script() -> InputScript {
    InputScript {
        steps: vec![ScriptStep {
            tick: 1,
            command: ScriptCommand::Attack { mob: 0 },
        }],
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("colosseum_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let loadout = match &args.loadout {
        Some(path) => Loadout::load(path)?,
        None => Loadout::melee(),
    };
    let script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => default_script(),
    };

    let (region, player) = match &args.spawns {
        Some(query) => {
            let scenario = Scenario::from_query(query)?;
            let mut region = colosseum();
            let player = region.spawn_player(PLAYER_START, loadout)?;
            scenario.apply(&mut region);
            (region, player)
        }
        None => {
            let (region, player, _) = colosseum_encounter(loadout)?;
            (region, player)
        }
    };

    let seed = config.seed;
    let tick_duration = config.tick_duration();
    let mut world = World::new(region, config);
    let mut summary = EncounterSummary {
        seed,
        ..EncounterSummary::default()
    };

    tracing::info!(seed, ticks = args.ticks, "encounter starting");
    while world.current_tick() < args.ticks && world.player_alive() && world.mobs_alive() {
        for input in script.inputs_for(world.current_tick() + 1, &world.region) {
            world.queue_input(input);
        }
        let events = if args.realtime {
            std::thread::sleep(tick_duration);
            world.advance(tick_duration)
        } else {
            world.tick_world()
        };
        summary.record(player, &events);
    }

    summary.ticks = world.current_tick();
    summary.player_hitpoints = world
        .region
        .unit(player)
        .map_or(0, |unit| unit.current_stats.hitpoint);
    summary.outcome = if !world.player_alive() {
        "defeat"
    } else if !world.mobs_alive() {
        "victory"
    } else {
        "timeout"
    }
    .to_string();
    tracing::info!(outcome = %summary.outcome, ticks = summary.ticks, "encounter finished");

    if args.format == "text" {
        println!("Outcome:        {}", summary.outcome);
        println!(
            "Ticks:          {} ({:.1}s)",
            summary.ticks,
            tick_duration.as_secs_f64() * summary.ticks as f64
        );
        println!("Seed:           {}", summary.seed);
        println!("Player HP:      {}", summary.player_hitpoints);
        println!("Damage taken:   {} ({} hits blocked)", summary.damage_taken, summary.hits_blocked);
        println!("Damage dealt:   {}", summary.damage_dealt);
        println!("Boss phase:     {}", summary.boss_phase);
        println!("Hazard tiles:   {}", summary.hazards_placed);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
