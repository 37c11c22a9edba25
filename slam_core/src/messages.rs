// slam_core/src/messages.rs

use crate::types::{Covariance, Pose2D, Position2D, State, LANDMARK_DIM, POSE_DIM};
use nalgebra::{Matrix2, Matrix3};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Inputs ==
// =========================================================================

/// A velocity command applied for one time step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Control {
    /// Linear velocity along the body x-axis [m/s].
    pub v: f64,
    /// Yaw rate [rad/s].
    pub omega: f64,
}

impl Control {
    pub fn new(v: f64, omega: f64) -> Self {
        Self { v, omega }
    }

    pub fn is_finite(&self) -> bool {
        self.v.is_finite() && self.omega.is_finite()
    }

    /// True when the command produces no motion at all.
    pub fn is_stationary(&self) -> bool {
        self.v == 0.0 && self.omega == 0.0
    }
}

/// A single range/bearing detection relative to the agent pose at sensing time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Distance to the landmark [m].
    pub range: f64,
    /// Angle to the landmark relative to the agent heading [rad].
    pub bearing: f64,
    /// Ground-truth landmark id attached by a simulator. Never read by the estimator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_id: Option<usize>,
}

impl Observation {
    pub fn new(range: f64, bearing: f64) -> Self {
        Self {
            range,
            bearing,
            true_id: None,
        }
    }

    pub fn with_true_id(mut self, id: usize) -> Self {
        self.true_id = Some(id);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.range.is_finite() && self.bearing.is_finite()
    }
}

// =========================================================================
// == Outputs ==
// =========================================================================

/// A read-only copy of the estimator's mean and covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mean: State,
    pub covariance: Covariance,
}

impl Snapshot {
    pub fn pose(&self) -> Pose2D {
        self.mean.fixed_rows::<POSE_DIM>(0).into_owned()
    }

    pub fn pose_covariance(&self) -> Matrix3<f64> {
        self.covariance
            .fixed_view::<POSE_DIM, POSE_DIM>(0, 0)
            .into_owned()
    }

    pub fn landmark_count(&self) -> usize {
        self.mean.len().saturating_sub(POSE_DIM) / LANDMARK_DIM
    }

    /// Position and 2x2 covariance block of landmark `index`, if it exists.
    pub fn landmark(&self, index: usize) -> Option<(Position2D, Matrix2<f64>)> {
        if index >= self.landmark_count() {
            return None;
        }
        let offset = POSE_DIM + LANDMARK_DIM * index;
        Some((
            self.mean.fixed_rows::<LANDMARK_DIM>(offset).into_owned(),
            self.covariance
                .fixed_view::<LANDMARK_DIM, LANDMARK_DIM>(offset, offset)
                .into_owned(),
        ))
    }
}

/// What happened to one observation during a correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationOutcome {
    /// Index of the landmark the observation was fused into.
    pub landmark_index: usize,
    /// True when the observation created `landmark_index`.
    pub created: bool,
    /// Squared Mahalanobis distance of the winning hypothesis
    /// (the gating threshold when a landmark was created).
    pub distance: f64,
}

/// Per-batch summary returned by `correct`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionReport {
    pub outcomes: Vec<ObservationOutcome>,
}

impl CorrectionReport {
    pub fn new_landmarks(&self) -> usize {
        self.outcomes.iter().filter(|o| o.created).count()
    }

    pub fn matched_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.outcomes.iter().map(|o| o.landmark_index)
    }
}
