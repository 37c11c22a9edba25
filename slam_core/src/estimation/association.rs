// slam_core/src/estimation/association.rs

//! Nearest-neighbour data association with a Mahalanobis gate.
//!
//! Every observation is compared against each mapped landmark independently
//! and the closest one wins, unless the synthetic "new landmark" hypothesis
//! (whose distance is the gate itself) is closer. This is single-hypothesis
//! association: with dense landmarks or a very uncertain pose it can pick the
//! wrong landmark, and nothing here tries to recover from that.

use crate::error::{Result, SlamError};
use crate::messages::Observation;
use crate::models::{observation_jacobian, observation_model, scatter_observation_jacobian};
use crate::state::SlamState;
use crate::utils::angles::normalize_angle;
use nalgebra::{DMatrix, Matrix2, Vector2};
use tracing::trace;

/// Residual, its covariance and the measurement Jacobian for one landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Innovation {
    /// `y = z − h(x)`, bearing component wrapped into `(-π, π]`.
    pub residual: Vector2<f64>,
    /// `S = H·P·Hᵀ + R`.
    pub covariance: Matrix2<f64>,
    /// `H`, 2 x state_len.
    pub jacobian: DMatrix<f64>,
}

impl Innovation {
    /// Inverse of `S`, failing with `NumericalInstability` when it is singular.
    pub fn inverse_covariance(&self) -> Result<Matrix2<f64>> {
        self.covariance
            .try_inverse()
            .filter(|inv| inv.iter().all(|v| v.is_finite()))
            .ok_or_else(|| {
                SlamError::NumericalInstability(format!(
                    "inverse of innovation covariance {:?}",
                    self.covariance
                ))
            })
    }

    /// Squared Mahalanobis distance `yᵀ·S⁻¹·y`.
    pub fn mahalanobis_squared(&self) -> Result<f64> {
        let s_inv = self.inverse_covariance()?;
        let d = self.residual.dot(&(s_inv * self.residual));
        if !d.is_finite() {
            return Err(SlamError::NumericalInstability("mahalanobis distance".into()));
        }
        Ok(d)
    }
}

/// Computes the innovation of `observation` against landmark `landmark_index`.
pub fn compute_innovation(
    state: &SlamState,
    landmark_index: usize,
    observation: &Observation,
    observation_noise: &Matrix2<f64>,
) -> Result<Innovation> {
    let landmark = state.landmark_position(landmark_index)?;
    let pose = state.pose();

    let predicted = observation_model(&pose, &landmark);
    let mut residual = Vector2::new(observation.range, observation.bearing) - predicted;
    residual.y = normalize_angle(residual.y);

    let block = observation_jacobian(&pose, &landmark)?;
    let jacobian = scatter_observation_jacobian(&block, landmark_index, state.len())?;

    let hph = &jacobian * state.covariance() * jacobian.transpose();
    let covariance = hph.fixed_view::<2, 2>(0, 0).into_owned() + observation_noise;

    Ok(Innovation {
        residual,
        covariance,
        jacobian,
    })
}

/// The decision encoded by a match index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Existing(usize),
    New,
}

/// Full result of scoring one observation against the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    /// Winning candidate, in `[0, n]`. `n` means "new landmark".
    pub index: usize,
    /// Squared Mahalanobis distance per candidate; the last entry is the gate.
    pub distances: Vec<f64>,
}

impl MatchReport {
    pub fn association(&self) -> Association {
        if self.index + 1 == self.distances.len() {
            Association::New
        } else {
            Association::Existing(self.index)
        }
    }

    pub fn best_distance(&self) -> f64 {
        self.distances[self.index]
    }
}

/// Scores `observation` against every landmark plus the new-landmark sentinel.
///
/// The first minimum wins, so existing landmarks beat the sentinel on ties.
pub fn score_candidates(
    state: &SlamState,
    observation: &Observation,
    observation_noise: &Matrix2<f64>,
    gating_threshold: f64,
) -> Result<MatchReport> {
    let n = state.landmark_count()?;

    let mut distances = (0..n)
        .map(|i| compute_innovation(state, i, observation, observation_noise)?.mahalanobis_squared())
        .collect::<Result<Vec<f64>>>()?;
    distances.push(gating_threshold);

    let index = distances
        .iter()
        .enumerate()
        .fold(0, |best, (i, d)| if *d < distances[best] { i } else { best });

    trace!(?distances, index, "scored observation candidates");
    Ok(MatchReport { index, distances })
}

/// Returns the landmark index `observation` belongs to, or `landmark_count()`
/// when no landmark lies inside the gate.
pub fn find_best_match(
    state: &SlamState,
    observation: &Observation,
    observation_noise: &Matrix2<f64>,
    gating_threshold: f64,
) -> Result<usize> {
    score_candidates(state, observation, observation_noise, gating_threshold).map(|r| r.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pose2D, Position2D, CHI_SQUARE_99_2DOF};
    use approx::assert_abs_diff_eq;

    fn noise() -> Matrix2<f64> {
        Matrix2::new(0.04, 0.0, 0.0, 1.0f64.to_radians().powi(2))
    }

    fn map(landmarks: &[(f64, f64)]) -> SlamState {
        let mut state = SlamState::new(Pose2D::zeros(), 0.01);
        for &(x, y) in landmarks {
            state
                .append_landmark(&Position2D::new(x, y), &(Matrix2::identity() * 0.01))
                .unwrap();
        }
        state
    }

    #[test]
    fn test_innovation_of_perfect_observation_is_zero() {
        let state = map(&[(3.0, 4.0)]);
        let z = Observation::new(5.0, 4.0f64.atan2(3.0));
        let innov = compute_innovation(&state, 0, &z, &noise()).unwrap();
        assert_abs_diff_eq!(innov.residual, Vector2::zeros(), epsilon = 1e-12);
        assert_abs_diff_eq!(innov.mahalanobis_squared().unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(innov.jacobian.shape(), (2, 5));
        assert_abs_diff_eq!(innov.covariance, innov.covariance.transpose(), epsilon = 1e-15);
    }

    #[test]
    fn test_innovation_wraps_bearing_residual() {
        let state = map(&[(-5.0, 0.01)]);
        // Predicted bearing is just under π; observing just over -π is a tiny residual.
        let z = Observation::new(5.0, -std::f64::consts::PI + 0.001);
        let innov = compute_innovation(&state, 0, &z, &noise()).unwrap();
        assert!(innov.residual.y.abs() < 0.01, "residual {}", innov.residual.y);
    }

    #[test]
    fn test_innovation_unknown_landmark() {
        let state = map(&[]);
        let err = compute_innovation(&state, 0, &Observation::new(1.0, 0.0), &noise()).unwrap_err();
        assert_eq!(err, SlamError::IndexOutOfRange { index: 0, count: 0 });
    }

    #[test]
    fn test_empty_map_always_proposes_new_landmark() {
        let state = map(&[]);
        let report =
            score_candidates(&state, &Observation::new(5.0, 0.0), &noise(), CHI_SQUARE_99_2DOF)
                .unwrap();
        assert_eq!(report.index, 0);
        assert_eq!(report.association(), Association::New);
        assert_eq!(report.best_distance(), CHI_SQUARE_99_2DOF);
    }

    #[test]
    fn test_nearest_landmark_wins() {
        let state = map(&[(5.0, 5.0), (5.0, 0.0), (0.0, 5.0)]);
        let idx = find_best_match(&state, &Observation::new(5.05, 0.002), &noise(), CHI_SQUARE_99_2DOF)
            .unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_far_observation_is_new() {
        let state = map(&[(5.0, 0.0)]);
        let idx = find_best_match(
            &state,
            &Observation::new(12.0, 1.5),
            &noise(),
            CHI_SQUARE_99_2DOF,
        )
        .unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_tie_with_gate_prefers_existing_landmark() {
        let state = map(&[(5.0, 0.0)]);
        let z = Observation::new(5.3, 0.0);
        let d = compute_innovation(&state, 0, &z, &noise())
            .unwrap()
            .mahalanobis_squared()
            .unwrap();
        // A gate exactly equal to the landmark distance must still match the landmark.
        assert_eq!(find_best_match(&state, &z, &noise(), d).unwrap(), 0);
    }

    #[test]
    fn test_equidistant_landmarks_resolve_to_lowest_index() {
        // Mirror images about the agent's heading give identical distances.
        let state = map(&[(5.0, 0.2), (5.0, -0.2)]);
        let z = Observation::new((25.0f64 + 0.04).sqrt(), 0.0);
        let report = score_candidates(&state, &z, &noise(), CHI_SQUARE_99_2DOF).unwrap();

        assert_eq!(report.distances[0], report.distances[1]);
        assert!(report.distances[0] < CHI_SQUARE_99_2DOF);
        assert_eq!(report.index, 0);
        assert_eq!(report.association(), Association::Existing(0));
    }

    #[test]
    fn test_association_is_deterministic() {
        let state = map(&[(4.0, 1.0), (4.2, 1.1), (-3.0, 2.0)]);
        let z = Observation::new(4.2, 0.25);
        let first = score_candidates(&state, &z, &noise(), CHI_SQUARE_99_2DOF).unwrap();
        for _ in 0..10 {
            assert_eq!(score_candidates(&state, &z, &noise(), CHI_SQUARE_99_2DOF).unwrap(), first);
        }
    }

    #[test]
    fn test_singular_innovation_covariance_is_reported() {
        let mut state = SlamState::new(Pose2D::zeros(), 0.0);
        state
            .append_landmark(&Position2D::new(5.0, 0.0), &Matrix2::zeros())
            .unwrap();
        let err = find_best_match(&state, &Observation::new(5.0, 0.0), &Matrix2::zeros(), 9.0)
            .unwrap_err();
        assert!(matches!(err, SlamError::NumericalInstability(_)));
    }
}
