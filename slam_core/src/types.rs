// slam_core/src/types.rs

use nalgebra::{DMatrix, DVector, Vector2, Vector3};

// --- Core Type Aliases ---
/// The full mean vector `[x, y, yaw, l0x, l0y, ...]`.
pub type State = DVector<f64>;
/// The full covariance matrix matching `State`.
pub type Covariance = DMatrix<f64>;
/// An agent pose `(x, y, yaw)` in the world frame.
pub type Pose2D = Vector3<f64>;
/// A point landmark position `(x, y)` in the world frame.
pub type Position2D = Vector2<f64>;

// --- State Layout Constants ---
/// Number of scalars in the pose block at the head of the state.
pub const POSE_DIM: usize = 3;
/// Number of scalars per landmark block.
pub const LANDMARK_DIM: usize = 2;
/// Index of the yaw component in the state vector.
pub const YAW_IDX: usize = 2;

/// Chi-square value for 99% confidence with 2 degrees of freedom.
pub const CHI_SQUARE_99_2DOF: f64 = 9.21934;
