// slam_core/src/state.rs

use crate::error::{Result, SlamError};
use crate::messages::Snapshot;
use crate::models::MotionJacobians;
use crate::types::{Covariance, Pose2D, Position2D, State, LANDMARK_DIM, POSE_DIM, YAW_IDX};
use crate::utils::angles::normalize_angle;
use nalgebra::{DMatrix, DVector, Matrix2, Matrix3};
use serde::{Deserialize, Serialize};

/// How the pose covariance block is propagated during prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionPolicy {
    /// `P_rr' = F_x·P·F_xᵀ + Q`. Landmark blocks and pose/landmark cross terms are
    /// left untouched and the motion Jacobian `G` is not applied.
    #[default]
    Additive,
    /// `P_rr' = G·P_rr·Gᵀ + Q` and `P_rl' = G·P_rl`, the textbook EKF-SLAM propagation.
    Linearized,
}

/// A contiguous block of the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateBlock {
    Pose,
    Landmark(usize),
}

impl StateBlock {
    /// First index of this block in the state vector.
    pub fn offset(&self) -> usize {
        match self {
            StateBlock::Pose => 0,
            StateBlock::Landmark(i) => POSE_DIM + LANDMARK_DIM * i,
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            StateBlock::Pose => POSE_DIM,
            StateBlock::Landmark(_) => LANDMARK_DIM,
        }
    }
}

/// The growing mean/covariance pair: one pose block followed by one block per
/// discovered landmark.
///
/// Fields are private so every mutation goes through a method that keeps the
/// mean and covariance dimensions in lock-step. Mutators build their result
/// first and only swap it in once it is known to be valid, so a failed call
/// leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct SlamState {
    mean: State,
    covariance: Covariance,
}

impl SlamState {
    /// Creates a state with the given pose, no landmarks and `scale · I₃` covariance.
    pub fn new(initial_pose: Pose2D, initial_covariance_scale: f64) -> Self {
        let mut pose = initial_pose;
        pose[YAW_IDX] = normalize_angle(pose[YAW_IDX]);
        Self {
            mean: DVector::from_column_slice(pose.as_slice()),
            covariance: DMatrix::identity(POSE_DIM, POSE_DIM) * initial_covariance_scale,
        }
    }

    /// Rebuilds a state from raw parts, checking the layout invariant.
    pub fn from_parts(mean: State, covariance: Covariance) -> Result<Self> {
        let state = Self { mean, covariance };
        state.landmark_count()?;
        Ok(state)
    }

    pub fn mean(&self) -> &State {
        &self.mean
    }

    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }

    /// Length of the state vector, `3 + 2n`.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Number of landmarks, derived from the state length.
    pub fn landmark_count(&self) -> Result<usize> {
        let len = self.mean.len();
        if len < POSE_DIM || (len - POSE_DIM) % LANDMARK_DIM != 0 {
            return Err(SlamError::InvariantViolation(format!(
                "state length {len} is not {POSE_DIM} + {LANDMARK_DIM}k"
            )));
        }
        if self.covariance.shape() != (len, len) {
            return Err(SlamError::InvariantViolation(format!(
                "covariance is {:?} but the state has length {len}",
                self.covariance.shape()
            )));
        }
        Ok((len - POSE_DIM) / LANDMARK_DIM)
    }

    /// Iterates over the layout: the pose block, then every landmark block in index order.
    pub fn blocks(&self) -> impl Iterator<Item = StateBlock> {
        let n = self.mean.len().saturating_sub(POSE_DIM) / LANDMARK_DIM;
        std::iter::once(StateBlock::Pose).chain((0..n).map(StateBlock::Landmark))
    }

    pub fn pose(&self) -> Pose2D {
        self.mean.fixed_rows::<POSE_DIM>(0).into_owned()
    }

    pub fn pose_covariance(&self) -> Matrix3<f64> {
        self.covariance
            .fixed_view::<POSE_DIM, POSE_DIM>(0, 0)
            .into_owned()
    }

    fn checked_landmark_offset(&self, index: usize) -> Result<usize> {
        let count = self.landmark_count()?;
        if index >= count {
            return Err(SlamError::IndexOutOfRange { index, count });
        }
        Ok(StateBlock::Landmark(index).offset())
    }

    pub fn landmark_position(&self, index: usize) -> Result<Position2D> {
        let offset = self.checked_landmark_offset(index)?;
        Ok(self.mean.fixed_rows::<LANDMARK_DIM>(offset).into_owned())
    }

    pub fn landmark_covariance(&self, index: usize) -> Result<Matrix2<f64>> {
        let offset = self.checked_landmark_offset(index)?;
        Ok(self
            .covariance
            .fixed_view::<LANDMARK_DIM, LANDMARK_DIM>(offset, offset)
            .into_owned())
    }

    /// Appends a landmark and returns its index.
    ///
    /// The mean grows by two entries and the covariance by two rows and columns.
    /// Cross terms with the existing state start at zero and the new diagonal
    /// block is `prior`. Existing entries are copied unchanged.
    pub fn append_landmark(&mut self, position: &Position2D, prior: &Matrix2<f64>) -> Result<usize> {
        let index = self.landmark_count()?;
        if !position.iter().all(|v| v.is_finite()) {
            return Err(SlamError::InvalidInput(format!(
                "landmark position {position:?} is not finite"
            )));
        }
        if !prior.iter().all(|v| v.is_finite()) || prior[(0, 1)] != prior[(1, 0)] {
            return Err(SlamError::InvariantViolation(format!(
                "landmark prior {prior:?} must be finite and symmetric"
            )));
        }

        let old_len = self.mean.len();
        let new_len = old_len + LANDMARK_DIM;

        let mut mean = DVector::zeros(new_len);
        mean.rows_mut(0, old_len).copy_from(&self.mean);
        mean.fixed_rows_mut::<LANDMARK_DIM>(old_len).copy_from(position);

        let mut covariance = DMatrix::zeros(new_len, new_len);
        covariance
            .view_mut((0, 0), (old_len, old_len))
            .copy_from(&self.covariance);
        covariance
            .fixed_view_mut::<LANDMARK_DIM, LANDMARK_DIM>(old_len, old_len)
            .copy_from(prior);

        self.mean = mean;
        self.covariance = covariance;
        Ok(index)
    }

    /// Replaces the pose and propagates the pose covariance block.
    ///
    /// With `PredictionPolicy::Additive` the new pose block is
    /// `F_x · P · F_xᵀ + Q`; everything outside the pose block is unchanged.
    pub fn apply_predict(
        &mut self,
        new_pose: &Pose2D,
        jacobians: &MotionJacobians,
        process_noise: &Matrix3<f64>,
        policy: PredictionPolicy,
    ) -> Result<()> {
        let len = self.len();
        self.landmark_count()?;
        if jacobians.f_x.shape() != (POSE_DIM, len) {
            return Err(SlamError::InvariantViolation(format!(
                "projection F_x is {:?}, expected ({POSE_DIM}, {len})",
                jacobians.f_x.shape()
            )));
        }

        let pose_block: Matrix3<f64> = match policy {
            PredictionPolicy::Additive => {
                let projected = &jacobians.f_x * &self.covariance * jacobians.f_x.transpose();
                projected.fixed_view::<POSE_DIM, POSE_DIM>(0, 0).into_owned() + process_noise
            }
            PredictionPolicy::Linearized => {
                jacobians.g * self.pose_covariance() * jacobians.g.transpose() + process_noise
            }
        };
        if !new_pose.iter().chain(pose_block.iter()).all(|v| v.is_finite()) {
            return Err(SlamError::NumericalInstability("predicted pose".into()));
        }

        if policy == PredictionPolicy::Linearized && len > POSE_DIM {
            let rest = len - POSE_DIM;
            let cross = jacobians.g
                * self.covariance.view((0, POSE_DIM), (POSE_DIM, rest));
            self.covariance
                .view_mut((0, POSE_DIM), (POSE_DIM, rest))
                .copy_from(&cross);
            self.covariance
                .view_mut((POSE_DIM, 0), (rest, POSE_DIM))
                .copy_from(&cross.transpose());
        }
        self.mean.fixed_rows_mut::<POSE_DIM>(0).copy_from(new_pose);
        self.covariance
            .fixed_view_mut::<POSE_DIM, POSE_DIM>(0, 0)
            .copy_from(&pose_block);
        Ok(())
    }

    /// Applies a Kalman correction: `mean += K·y`, `P = (I − K·H)·P`.
    ///
    /// Dimensions are validated before anything is touched, and a result that
    /// contains NaN or infinity is discarded with `NumericalInstability`.
    pub fn apply_correction(
        &mut self,
        gain: &DMatrix<f64>,
        innovation: &DVector<f64>,
        measurement_jacobian: &DMatrix<f64>,
    ) -> Result<()> {
        let len = self.len();
        self.landmark_count()?;
        let m = innovation.len();
        if gain.shape() != (len, m) || measurement_jacobian.shape() != (m, len) {
            return Err(SlamError::InvariantViolation(format!(
                "gain {:?} / jacobian {:?} incompatible with state length {len} and innovation length {m}",
                gain.shape(),
                measurement_jacobian.shape()
            )));
        }

        let mean = &self.mean + gain * innovation;
        let i_kh = DMatrix::<f64>::identity(len, len) - gain * measurement_jacobian;
        let covariance = i_kh * &self.covariance;

        if !mean.iter().chain(covariance.iter()).all(|v| v.is_finite()) {
            return Err(SlamError::NumericalInstability("state correction".into()));
        }
        self.mean = mean;
        self.covariance = covariance;
        Ok(())
    }

    /// Wraps the pose yaw into `(-π, π]`.
    pub fn normalize_yaw(&mut self) {
        self.mean[YAW_IDX] = normalize_angle(self.mean[YAW_IDX]);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mean: self.mean.clone(),
            covariance: self.covariance.clone(),
        }
    }
}
