// slam_sim/src/simulation/config/mod.rs

//! This module handles loading, layering, and validating the scenario
//! configuration: built-in defaults, then the scenario file, then
//! `SLAM_SIM_` environment variables, then command-line overrides.

pub mod structs;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use slam_core::prelude::SlamError;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::cli::Cli;
pub use structs::{ScenarioConfig, SimulationSection, WorldConfig};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("estimator error: {0}")]
    Estimator(#[from] SlamError),
}

/// Builds the figment for a scenario, without CLI overrides.
pub fn scenario_figment(path: Option<&Path>) -> Figment {
    let figment = Figment::from(Serialized::defaults(ScenarioConfig::default()));
    let figment = match path {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment,
    };
    figment.merge(Env::prefixed("SLAM_SIM_").split("__"))
}

/// Resolves the full scenario for a command line and validates it.
pub fn load_scenario(cli: &Cli) -> Result<ScenarioConfig, SimError> {
    if let Some(path) = &cli.scenario {
        info!("Loading scenario from: {}", path.display());
    }

    let mut figment = scenario_figment(cli.scenario.as_deref());
    if let Some(seed) = cli.seed {
        figment = figment.merge(Serialized::default("simulation.seed", seed));
    }
    if let Some(duration) = cli.duration {
        figment = figment.merge(Serialized::default("simulation.duration_seconds", duration));
    }

    let scenario: ScenarioConfig = figment.extract()?;
    scenario.validate()?;
    Ok(scenario)
}

impl ScenarioConfig {
    /// Rejects scenarios the simulator or the estimator cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        self.filter.validate()?;

        let sim = &self.simulation;
        if !(sim.duration_seconds.is_finite() && sim.duration_seconds >= 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "duration_seconds must be non-negative, got {}",
                sim.duration_seconds
            )));
        }

        let world = &self.world;
        if !(world.max_range.is_finite() && world.max_range > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "max_range must be positive, got {}",
                world.max_range
            )));
        }
        if !(0.0..=1.0).contains(&world.detection_probability) {
            return Err(SimError::InvalidScenario(format!(
                "detection_probability must lie in [0, 1], got {}",
                world.detection_probability
            )));
        }
        let noise_ok = world
            .observation_noise_std
            .iter()
            .chain(world.control_noise_std.iter())
            .all(|s| s.is_finite() && *s >= 0.0);
        if !noise_ok {
            return Err(SimError::InvalidScenario(
                "noise standard deviations must be finite and non-negative".into(),
            ));
        }
        if !(world.commanded_velocity.is_finite() && world.commanded_yaw_rate_deg.is_finite()) {
            return Err(SimError::InvalidScenario("commanded input must be finite".into()));
        }
        if let Some(bad) = world.landmarks.iter().position(|l| !l.iter().all(|v| v.is_finite())) {
            return Err(SimError::InvalidScenario(format!(
                "landmark {bad} has a non-finite position"
            )));
        }
        Ok(())
    }

    /// Number of ticks the run lasts: `duration / dt`, rounded.
    ///
    /// Zero duration means zero ticks, and a 50 s run at 0.1 s is exactly 500.
    pub fn tick_count(&self) -> usize {
        (self.simulation.duration_seconds / self.filter.time_step).round() as usize
    }
}
