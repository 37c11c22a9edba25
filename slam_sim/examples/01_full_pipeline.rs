// slam_sim/examples/01_full_pipeline.rs

//! A full end-to-end run of the EKF-SLAM pipeline.
//!
//! This example demonstrates how to:
//! 1. Load a simulation scenario from a TOML file.
//! 2. Drive the world simulator and the estimator tick by tick.
//! 3. Read back the landmark map with its confidence ellipses.
//!
//! To run this example:
//! `cargo run -p slam_sim --example 01_full_pipeline`

use anyhow::Context;
use slam_sim::prelude::*;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // --- 1. Load Simulation Configuration ---
    let scenario_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios/default.toml");
    println!("Loading scenario from: {}", scenario_path.display());
    let scenario = load_scenario(&slam_sim::cli::Cli {
        scenario: Some(scenario_path),
        ..Default::default()
    })
    .context("failed to load the scenario")?;

    // --- 2. Build the world and the estimator ---
    let mut world = WorldSimulator::new(
        scenario.world.clone(),
        scenario.filter.initial_pose,
        scenario.filter.time_step,
        SimulationRng::from_seed(scenario.simulation.seed),
    );
    let mut ekf = EkfSlam::new(scenario.filter.clone())?;

    // --- 3. Run ---
    for tick in 0..scenario.tick_count() {
        let step = world.step();
        let report = ekf.step(&step.measured_control, &step.observations)?;
        for outcome in report.correction.outcomes.iter().filter(|o| o.created) {
            println!("tick {tick:4}: new landmark {}", outcome.landmark_index);
        }
    }

    // --- 4. Inspect the map ---
    let map = ekf.map()?;
    let truth = world.true_pose();
    println!(
        "final pose  est ({:7.3}, {:7.3}, {:6.1}°)  true ({:7.3}, {:7.3}, {:6.1}°)",
        map.pose.x,
        map.pose.y,
        map.pose.z.to_degrees(),
        truth.x,
        truth.y,
        truth.z.to_degrees()
    );
    for lm in &map.landmarks {
        println!(
            "landmark {}: ({:7.3}, {:7.3})  99% ellipse {:.2} x {:.2} m",
            lm.index, lm.position.x, lm.position.y, lm.ellipse.semi_major, lm.ellipse.semi_minor
        );
    }
    Ok(())
}
