#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a seeded Tower Siege session without a
//! screen and prints the outcome as JSON.

mod autopilot;
mod build_code;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tower_siege_core::{Command, Event, FinalScore, GameMode, Phase};
use tower_siege_world::{self as world, query, Config, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    autopilot::{Autopilot, Tally},
    build_code::BuildCode,
};

/// Command-line arguments accepted by the `tower-siege` binary.
#[derive(Debug, Parser)]
#[command(name = "tower-siege", about = "Plays a seeded Tower Siege session headlessly")]
struct CliArgs {
    /// Game mode to play.
    #[arg(long, value_enum, default_value_t = ModeArg::Normal)]
    mode: ModeArg,
    /// Map seed, overriding the configuration file and any build code.
    #[arg(long)]
    seed: Option<u64>,
    /// Seed of the gameplay random stream, overriding the configuration file.
    #[arg(long)]
    rng_seed: Option<u64>,
    /// Number of waves to play before stopping.
    #[arg(long, default_value_t = 10)]
    waves: u32,
    /// TOML file with balance overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    tick_ms: u64,
    /// Build code whose towers are placed before the first wave.
    #[arg(long)]
    build: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Normal,
    Surprise,
    Campaign,
    Preview,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => GameMode::Normal,
            ModeArg::Surprise => GameMode::Surprise,
            ModeArg::Campaign => GameMode::Campaign,
            ModeArg::Preview => GameMode::CampaignPreview,
        }
    }
}

/// Outcome printed once the session ends.
#[derive(Debug, Serialize)]
struct Summary {
    mode: GameMode,
    phase: Phase,
    map_seed: u64,
    map_number: u32,
    wave: u32,
    gold: u32,
    lives: u32,
    score: u64,
    towers: usize,
    placed: u32,
    upgraded: u32,
    rejected: u32,
    ticks: u64,
    final_score: Option<FinalScore>,
    build_code: String,
}

/// Entry point for the Tower Siege command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let summary = run(&args)?;
    let json = serde_json::to_string_pretty(&summary).context("failed to serialise the summary")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: &CliArgs) -> Result<Summary> {
    let build = args
        .build
        .as_deref()
        .map(BuildCode::decode)
        .transpose()
        .context("invalid build code")?;
    let config = load_config(args, build.as_ref())?;
    let mut world = World::new(config);

    let mode = GameMode::from(args.mode);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartMode { mode }, &mut events);
    if let Some(Event::CommandRejected { reason }) = events.first() {
        anyhow::bail!("could not start a {mode:?} session: {reason}");
    }

    let autopilot = Autopilot::new(Duration::from_millis(args.tick_ms), args.waves);
    let mut tally = Tally::default();
    if let Some(code) = &build {
        autopilot.restore(&mut world, code, &mut tally);
    }
    autopilot.play(&mut world, &mut tally);

    let hud = query::hud(&world);
    let towers = query::towers(&world);
    let build_code = BuildCode::capture(query::map_seed(&world), &towers)
        .encode()
        .context("failed to encode the final build")?;
    info!(score = hud.score, wave = hud.wave, phase = ?hud.phase, "session finished");

    Ok(Summary {
        mode: hud.mode,
        phase: hud.phase,
        map_seed: query::map_seed(&world),
        map_number: hud.map_number,
        wave: hud.wave,
        gold: hud.gold,
        lives: hud.lives,
        score: hud.score,
        towers: towers.len(),
        placed: tally.placed,
        upgraded: tally.upgraded,
        rejected: tally.rejected,
        ticks: tally.ticks,
        final_score: query::final_score(&world),
        build_code,
    })
}

fn load_config(args: &CliArgs, build: Option<&BuildCode>) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_toml_str(&source)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(seed) = args.seed.or(build.map(|code| code.map_seed)) {
        config.map_seed = seed;
    }
    if let Some(seed) = args.rng_seed {
        config.rng_seed = seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
