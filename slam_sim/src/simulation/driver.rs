// slam_sim/src/simulation/driver.rs

use slam_core::prelude::{EkfSlam, ErrorEllipse, Pose2D, Snapshot, CHI_SQUARE_99_2DOF};
use tracing::{debug, error, info};

use crate::simulation::config::{ScenarioConfig, SimError};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::report::RunSummary;
use crate::simulation::world::WorldSimulator;

/// Per-tick trajectories recorded during a run, one entry per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHistory {
    pub true_poses: Vec<Pose2D>,
    pub dead_reckoning: Vec<Pose2D>,
    pub estimates: Vec<Pose2D>,
    /// 99% confidence ellipse of the estimated position.
    pub pose_ellipses: Vec<ErrorEllipse>,
}

impl RunHistory {
    pub fn with_capacity(ticks: usize) -> Self {
        Self {
            true_poses: Vec::with_capacity(ticks),
            dead_reckoning: Vec::with_capacity(ticks),
            estimates: Vec::with_capacity(ticks),
            pose_ellipses: Vec::with_capacity(ticks),
        }
    }

    pub fn len(&self) -> usize {
        self.true_poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_poses.is_empty()
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub history: RunHistory,
    pub final_snapshot: Snapshot,
    pub summary: RunSummary,
}

/// Runs one scenario to completion.
///
/// The world and the estimator start from the same pose. Each tick the world
/// moves and senses first, then the estimator steps with the measured control
/// and that tick's detections. An estimator failure ends the run.
pub fn run(scenario: &ScenarioConfig) -> Result<RunOutcome, SimError> {
    scenario.validate()?;
    let mut ekf = EkfSlam::new(scenario.filter.clone())?;
    let mut world = WorldSimulator::new(
        scenario.world.clone(),
        scenario.filter.initial_pose,
        scenario.filter.time_step,
        SimulationRng::from_seed(scenario.simulation.seed),
    );

    let ticks = scenario.tick_count();
    info!(
        ticks,
        seed = scenario.simulation.seed,
        true_landmarks = world.landmarks().len(),
        "starting run"
    );

    let mut history = RunHistory::with_capacity(ticks);
    for tick_index in 0..ticks {
        let tick = world.step();

        let report = ekf
            .step(&tick.measured_control, &tick.observations)
            .map_err(|e| {
                error!(tick = tick_index, error = %e, "estimator step failed");
                e
            })?;
        debug!(
            tick = tick_index,
            detections = tick.observations.len(),
            new_landmarks = report.correction.new_landmarks(),
            landmarks = report.landmark_count,
            "tick complete"
        );

        let snapshot = ekf.snapshot();
        let position_cov = snapshot.pose_covariance().fixed_view::<2, 2>(0, 0).into_owned();
        history.true_poses.push(tick.true_pose);
        history.dead_reckoning.push(tick.dead_reckoning);
        history.estimates.push(snapshot.pose());
        history
            .pose_ellipses
            .push(ErrorEllipse::from_covariance(&position_cov, CHI_SQUARE_99_2DOF)?);
    }

    let final_snapshot = ekf.snapshot();
    let summary = RunSummary::compute(&history, &final_snapshot, world.landmarks());
    summary.log();

    Ok(RunOutcome {
        history,
        final_snapshot,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::SimulationSection;

    #[test]
    fn test_zero_duration_run_is_empty() {
        let scenario = ScenarioConfig {
            simulation: SimulationSection {
                seed: 1,
                duration_seconds: 0.0,
            },
            ..Default::default()
        };
        let outcome = run(&scenario).unwrap();
        assert!(outcome.history.is_empty());
        assert_eq!(outcome.summary.landmark_count, 0);
        assert_eq!(outcome.final_snapshot.mean.len(), 3);
    }

    #[test]
    fn test_history_has_one_entry_per_tick() {
        let scenario = ScenarioConfig {
            simulation: SimulationSection {
                seed: 2,
                duration_seconds: 3.0,
            },
            ..Default::default()
        };
        let outcome = run(&scenario).unwrap();
        assert_eq!(outcome.history.len(), 30);
        assert_eq!(outcome.history.estimates.len(), 30);
        assert_eq!(outcome.history.pose_ellipses.len(), 30);
        assert_eq!(outcome.summary.ticks, 30);
    }
}
