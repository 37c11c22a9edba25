// slam_core/src/models/motion.rs

use crate::messages::Control;
use crate::types::{Pose2D, POSE_DIM, YAW_IDX};
use nalgebra::{DMatrix, Matrix3};

/// The two matrices produced by linearizing the motion model.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionJacobians {
    /// `G`: 3x3 Jacobian of the motion model w.r.t. the pose.
    pub g: Matrix3<f64>,
    /// `F_x`: 3 x state_len projection `[I₃ | 0]` selecting the pose sub-state.
    pub f_x: DMatrix<f64>,
}

/// Advances a pose by one step of a unicycle model.
///
/// `x' = x + v·cos(yaw)·dt`, `y' = y + v·sin(yaw)·dt`, `yaw' = yaw + ω·dt`.
/// The yaw is left un-normalized; callers decide when to wrap it.
pub fn motion_model(pose: &Pose2D, control: &Control, dt: f64) -> Pose2D {
    let yaw = pose[YAW_IDX];
    Pose2D::new(
        pose.x + control.v * yaw.cos() * dt,
        pose.y + control.v * yaw.sin() * dt,
        yaw + control.omega * dt,
    )
}

/// Linearizes `motion_model` around `pose`.
///
/// # Arguments
/// * `pose`: The pose at which to linearize.
/// * `control`: The command held constant over `dt`.
/// * `dt`: Step duration in seconds.
/// * `state_len`: Length of the full state vector, used to size `F_x`.
pub fn motion_jacobian(
    pose: &Pose2D,
    control: &Control,
    dt: f64,
    state_len: usize,
) -> MotionJacobians {
    let yaw = pose[YAW_IDX];

    // d(x')/d(yaw) and d(y')/d(yaw); every other partial is 0 or 1.
    let mut g = Matrix3::identity();
    g[(0, 2)] = -dt * control.v * yaw.sin();
    g[(1, 2)] = dt * control.v * yaw.cos();

    let mut f_x = DMatrix::zeros(POSE_DIM, state_len.max(POSE_DIM));
    f_x.fixed_view_mut::<POSE_DIM, POSE_DIM>(0, 0)
        .copy_from(&Matrix3::identity());

    MotionJacobians { g, f_x }
}
