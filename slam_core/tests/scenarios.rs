// slam_core/tests/scenarios.rs

use approx::assert_abs_diff_eq;
use nalgebra::Matrix3;
use slam_core::prelude::*;

fn filter() -> EkfSlam {
    EkfSlam::new(EkfSlamConfig::default()).unwrap()
}

#[test]
fn straight_line_prediction_from_origin() {
    let mut ekf = filter();
    ekf.predict(&Control::new(1.0, 0.0), 0.1).unwrap();

    let pose = ekf.snapshot().pose();
    assert_abs_diff_eq!(pose.x, 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(pose.y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pose.z, 0.0, epsilon = 1e-12);
}

#[test]
fn first_observation_creates_landmark_ahead() {
    let mut ekf = filter();
    ekf.correct(&[Observation::new(5.0, 0.0)]).unwrap();

    assert_eq!(ekf.landmark_count().unwrap(), 1);
    let (position, _) = ekf.snapshot().landmark(0).unwrap();
    assert_abs_diff_eq!(position.x, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(position.y, 0.0, epsilon = 1e-9);
}

#[test]
fn noisy_reobservation_associates_inside_gate() {
    let mut ekf = filter();
    ekf.correct(&[Observation::new(5.0, 0.0)]).unwrap();

    let report = ekf.correct(&[Observation::new(5.1, 0.005)]).unwrap();
    assert_eq!(ekf.landmark_count().unwrap(), 1);
    assert_eq!(report.outcomes[0].landmark_index, 0);
    assert!(report.outcomes[0].distance < CHI_SQUARE_99_2DOF);
}

#[test]
fn observation_outside_gate_creates_second_landmark() {
    let mut ekf = filter();
    ekf.correct(&[Observation::new(5.0, 0.0)]).unwrap();

    let report = ekf.correct(&[Observation::new(18.0, -2.0)]).unwrap();
    assert_eq!(ekf.landmark_count().unwrap(), 2);
    assert!(report.outcomes[0].created);
    assert_eq!(report.outcomes[0].landmark_index, 1);
}

#[test]
fn zero_motion_empty_tick_is_identity() {
    let mut ekf = filter();
    ekf.step(&Control::new(1.0, 0.1), &[Observation::new(6.0, 0.4)])
        .unwrap();
    let before = ekf.snapshot();

    ekf.predict(&Control::new(0.0, 0.0), 0.1).unwrap();
    ekf.correct(&[]).unwrap();

    let after = ekf.snapshot();
    assert_abs_diff_eq!(after.mean, before.mean, epsilon = 1e-12);
    assert_abs_diff_eq!(after.covariance, before.covariance, epsilon = 1e-12);
}

#[test]
fn noise_free_run_recovers_map_exactly() {
    let landmarks = [
        Position2D::new(10.0, -2.0),
        Position2D::new(15.0, 10.0),
        Position2D::new(3.0, 15.0),
        Position2D::new(-5.0, 20.0),
    ];
    let control = Control::new(1.0, 0.1);
    // Tight assumed noise keeps distinct landmarks far apart in Mahalanobis terms.
    let mut ekf = EkfSlam::new(EkfSlamConfig {
        process_noise: Matrix3::identity() * 1e-4,
        initial_covariance_scale: 1e-4,
        ..Default::default()
    })
    .unwrap();
    let mut truth = Pose2D::zeros();

    for _ in 0..300 {
        truth = motion_model(&truth, &control, 0.1);
        truth.z = normalize_angle(truth.z);
        let observations: Vec<_> = landmarks
            .iter()
            .enumerate()
            .filter_map(|(id, lm)| {
                let z = observation_model(&truth, lm);
                (z.x <= 20.0).then(|| Observation::new(z.x, z.y).with_true_id(id))
            })
            .collect();
        ekf.step(&control, &observations).unwrap();
    }

    let map = ekf.map().unwrap();
    assert_eq!(map.landmarks.len(), landmarks.len());
    for mapped in &map.landmarks {
        let nearest = landmarks
            .iter()
            .map(|lm| (lm - mapped.position).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 1e-6, "landmark {} off by {}", mapped.index, nearest);
    }
    assert_abs_diff_eq!(map.pose.x, truth.x, epsilon = 1e-6);
    assert_abs_diff_eq!(map.pose.y, truth.y, epsilon = 1e-6);
}

#[test]
fn linearized_policy_propagates_through_motion_jacobian() {
    let config = EkfSlamConfig {
        prediction_policy: PredictionPolicy::Linearized,
        initial_covariance_scale: 0.1,
        ..Default::default()
    };
    let mut ekf = EkfSlam::new(config).unwrap();
    ekf.predict(&Control::new(2.0, 0.0), 0.5).unwrap();

    // G = I with d(y)/d(yaw) = dt·v = 1, so var(y) picks up var(yaw).
    let expected = Matrix3::new(0.1, 0.0, 0.0, 0.0, 0.2, 0.1, 0.0, 0.1, 0.1)
        + ekf.config().process_noise;
    assert_abs_diff_eq!(ekf.snapshot().pose_covariance(), expected, epsilon = 1e-12);
}

#[test]
fn out_of_range_landmark_lookup_is_reported() {
    let ekf = filter();
    assert_eq!(
        ekf.state().landmark_position(0).unwrap_err(),
        SlamError::IndexOutOfRange { index: 0, count: 0 }
    );
}
