// slam_core/src/models/observation.rs

use crate::error::{Result, SlamError};
use crate::messages::Observation;
use crate::types::{Pose2D, Position2D, LANDMARK_DIM, POSE_DIM, YAW_IDX};
use crate::utils::angles::normalize_angle;
use nalgebra::{DMatrix, Matrix2x5, Vector2};

/// Non-zero block of the range/bearing Jacobian, columns `[x, y, yaw, lx, ly]`.
pub type ObservationJacobian = Matrix2x5<f64>;

/// Squared ranges below this are treated as a landmark sitting on the agent.
const MIN_RANGE_SQUARED: f64 = 1e-12;

/// Predicts the `(range, bearing)` an ideal sensor at `pose` would report for `landmark`.
pub fn observation_model(pose: &Pose2D, landmark: &Position2D) -> Vector2<f64> {
    let delta = landmark - pose.xy();
    Vector2::new(
        delta.norm(),
        normalize_angle(delta.y.atan2(delta.x) - pose[YAW_IDX]),
    )
}

/// Computes the 2x5 Jacobian of `observation_model` w.r.t. the pose and the landmark.
///
/// Fails with `NumericalInstability` when the landmark coincides with the pose,
/// where the bearing is undefined.
pub fn observation_jacobian(pose: &Pose2D, landmark: &Position2D) -> Result<ObservationJacobian> {
    let delta = landmark - pose.xy();
    let q = delta.norm_squared();
    if !q.is_finite() || q < MIN_RANGE_SQUARED {
        return Err(SlamError::NumericalInstability(format!(
            "observation jacobian (squared range {q:e})"
        )));
    }
    let sq = q.sqrt();
    let (dx, dy) = (delta.x, delta.y);

    #[rustfmt::skip]
    let block = ObservationJacobian::new(
        -dx / sq, -dy / sq,  0.0, dx / sq, dy / sq,
         dy / q,  -dx / q,  -1.0, -dy / q, dx / q,
    );
    Ok(block)
}

/// Spreads the 2x5 block into a 2 x `state_len` matrix: pose columns first,
/// then the two columns belonging to `landmark_index`, zero elsewhere.
pub fn scatter_observation_jacobian(
    block: &ObservationJacobian,
    landmark_index: usize,
    state_len: usize,
) -> Result<DMatrix<f64>> {
    let offset = POSE_DIM + LANDMARK_DIM * landmark_index;
    if offset + LANDMARK_DIM > state_len {
        return Err(SlamError::InvariantViolation(format!(
            "landmark {landmark_index} needs columns {offset}..{} but the state has {state_len}",
            offset + LANDMARK_DIM
        )));
    }

    let mut h = DMatrix::zeros(2, state_len);
    h.fixed_view_mut::<2, POSE_DIM>(0, 0)
        .copy_from(&block.fixed_columns::<POSE_DIM>(0));
    h.fixed_view_mut::<2, LANDMARK_DIM>(0, offset)
        .copy_from(&block.fixed_columns::<LANDMARK_DIM>(POSE_DIM));
    Ok(h)
}

/// Places a landmark in the world from a pose and the observation of it.
pub fn inverse_observation_model(pose: &Pose2D, observation: &Observation) -> Position2D {
    let angle = pose[YAW_IDX] + observation.bearing;
    Position2D::new(
        pose.x + observation.range * angle.cos(),
        pose.y + observation.range * angle.sin(),
    )
}
