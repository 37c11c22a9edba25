// slam_sim/src/main.rs

use anyhow::Context;
use clap::Parser;
use slam_sim::cli::Cli;
use slam_sim::simulation::{config::load_scenario, driver::run};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins; otherwise info, or warn with --quiet.
    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let scenario = load_scenario(&cli).context("could not resolve the scenario")?;

    if cli.dump_config {
        print!("{}", toml::to_string(&scenario)?);
        return Ok(());
    }

    let outcome = run(&scenario).context("simulation aborted")?;
    if cli.quiet {
        println!("{}", outcome.summary);
    }
    Ok(())
}
