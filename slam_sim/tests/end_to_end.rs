// slam_sim/tests/end_to_end.rs

use nalgebra::Matrix3;
use slam_sim::cli::Cli;
use slam_sim::prelude::*;
use std::path::PathBuf;

fn scenario(seed: u64, duration: f64) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::default();
    scenario.simulation.seed = seed;
    scenario.simulation.duration_seconds = duration;
    scenario
}

#[test]
fn same_seed_gives_identical_runs() {
    let a = run(&scenario(17, 20.0)).unwrap();
    let b = run(&scenario(17, 20.0)).unwrap();
    assert_eq!(a.final_snapshot, b.final_snapshot);
    assert_eq!(a.history, b.history);
    assert_eq!(a.summary, b.summary);
}

#[test]
fn different_seeds_diverge() {
    let a = run(&scenario(1, 10.0)).unwrap();
    let b = run(&scenario(2, 10.0)).unwrap();
    assert_ne!(a.history.dead_reckoning, b.history.dead_reckoning);
}

#[test]
fn default_run_builds_a_finite_map() {
    let outcome = run(&ScenarioConfig::default()).unwrap();
    let snapshot = &outcome.final_snapshot;

    assert_eq!(outcome.summary.ticks, 500);
    assert!(outcome.summary.landmark_count >= 1);
    assert_eq!(snapshot.mean.len(), 3 + 2 * outcome.summary.landmark_count);
    assert!(snapshot.mean.iter().all(|v| v.is_finite()));
    assert!(snapshot.covariance.iter().all(|v| v.is_finite()));
    assert!(outcome.summary.final_position_error.is_finite());
    assert!(outcome
        .history
        .pose_ellipses
        .iter()
        .all(|e| e.semi_major >= e.semi_minor && e.semi_minor >= 0.0));
}

#[test]
fn noise_free_world_is_tracked_exactly() {
    let mut scenario = scenario(5, 20.0);
    scenario.world.detection_probability = 1.0;
    scenario.world.observation_noise_std = [0.0, 0.0];
    scenario.world.control_noise_std = [0.0, 0.0];
    // Tight assumed noise keeps distinct landmarks far apart in Mahalanobis terms.
    scenario.filter.process_noise = Matrix3::identity() * 1e-4;
    scenario.filter.initial_covariance_scale = 1e-4;

    let outcome = run(&scenario).unwrap();
    assert!(outcome.summary.final_position_error < 1e-6);
    assert!(outcome.summary.mean_dead_reckoning_error < 1e-9);
    assert!(outcome
        .summary
        .landmark_errors
        .iter()
        .all(|e| e.distance < 1e-6));
}

#[test]
fn bundled_scenario_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios/default.toml");
    let cli = Cli {
        scenario: Some(path),
        duration: Some(5.0),
        ..Default::default()
    };
    let scenario = load_scenario(&cli).unwrap();
    assert_eq!(scenario.simulation.duration_seconds, 5.0);
    assert_eq!(scenario.world.landmarks.len(), 4);
    assert_eq!(scenario.filter.prediction_policy, PredictionPolicy::Additive);

    let outcome = run(&scenario).unwrap();
    assert_eq!(outcome.history.len(), 50);
}
