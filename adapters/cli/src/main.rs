#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Grid Siege encounter headlessly.

mod config;
mod encounter;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Scenario, encounter::Encounter};

/// Runs a tower-defense encounter and prints its outcome.
#[derive(Debug, Parser)]
#[command(name = "grid-siege", about = "Runs a Grid Siege encounter without rendering")]
struct CliArgs {
    /// Scenario file to load instead of the built-in encounter.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 20_000)]
    ticks: u32,
    /// Simulated duration of a single tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Entry point for the Grid Siege command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)),
        )
        .init();

    ensure!(args.tick_ms > 0, "--tick-ms must be greater than zero");
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::builtin()?,
    };

    info!(
        rows = scenario.layout.rows(),
        columns = scenario.layout.columns(),
        towers = scenario.towers.len(),
        waves = scenario.waves.len(),
        "encounter loaded"
    );

    let mut encounter = Encounter::new(scenario);
    let report = encounter.run(args.ticks, Duration::from_millis(args.tick_ms));
    info!(
        ticks = report.ticks,
        finished = encounter.is_finished(),
        remaining = encounter.enemies().len(),
        "encounter ended"
    );

    let summary = format!(
        "spawned={} kills={} leaks={} stranded={} gold={} towers_standing={}",
        report.spawned,
        report.kills,
        report.leaks,
        report.stranded,
        report.gold,
        report.towers_standing
    );
    println!("{summary}");

    Ok(())
}
