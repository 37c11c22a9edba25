// slam_core/src/config.rs

use crate::error::{Result, SlamError};
use crate::state::PredictionPolicy;
use crate::types::{Pose2D, CHI_SQUARE_99_2DOF};
use crate::utils::serde_helpers;
use nalgebra::{Cholesky, DMatrix, Matrix2, Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Everything the estimator assumes about the world, passed in at construction.
///
/// In configuration files the noise matrices are written as standard
/// deviations with angles in degrees, e.g.
///
/// ```toml
/// process_noise = [0.5, 0.5, 30.0]   # sigma x [m], sigma y [m], sigma yaw [deg]
/// observation_noise = [0.2, 1.0]     # sigma range [m], sigma bearing [deg]
/// gating_threshold = 9.21934
/// time_step = 0.1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EkfSlamConfig {
    /// Process noise `Q` added to the pose covariance on every motion step.
    #[serde(with = "serde_helpers::pose_noise_std_deg")]
    pub process_noise: Matrix3<f64>,
    /// Assumed range/bearing noise `R`. Need not equal the sensor's true noise.
    #[serde(with = "serde_helpers::range_bearing_noise_std_deg")]
    pub observation_noise: Matrix2<f64>,
    /// Squared Mahalanobis distance above which an observation starts a new landmark.
    pub gating_threshold: f64,
    /// Duration of one tick [s].
    pub time_step: f64,
    /// Starting pose `[x, y, yaw]`, yaw in degrees in files.
    #[serde(with = "serde_helpers::pose_xy_yaw_deg")]
    pub initial_pose: Pose2D,
    /// The initial pose covariance is `initial_covariance_scale · I₃`.
    pub initial_covariance_scale: f64,
    /// Variance of the `σ²·I₂` prior given to a newly created landmark.
    pub landmark_prior_variance: f64,
    pub prediction_policy: PredictionPolicy,
}

impl Default for EkfSlamConfig {
    fn default() -> Self {
        Self {
            process_noise: Matrix3::from_diagonal(&Vector3::new(
                0.5f64.powi(2),
                0.5f64.powi(2),
                30.0f64.to_radians().powi(2),
            )),
            observation_noise: Matrix2::from_diagonal(&Vector2::new(
                0.2f64.powi(2),
                1.0f64.to_radians().powi(2),
            )),
            gating_threshold: CHI_SQUARE_99_2DOF,
            time_step: 0.1,
            initial_pose: Pose2D::zeros(),
            initial_covariance_scale: 1.0,
            landmark_prior_variance: 1.0,
            prediction_policy: PredictionPolicy::Additive,
        }
    }
}

impl EkfSlamConfig {
    /// Checks that every parameter can drive a well-posed filter.
    pub fn validate(&self) -> Result<()> {
        check_covariance(
            "process_noise",
            DMatrix::from_column_slice(3, 3, self.process_noise.as_slice()),
        )?;
        check_covariance(
            "observation_noise",
            DMatrix::from_column_slice(2, 2, self.observation_noise.as_slice()),
        )?;

        if !(self.gating_threshold.is_finite() && self.gating_threshold > 0.0) {
            return Err(SlamError::InvalidConfig(format!(
                "gating_threshold must be positive, got {}",
                self.gating_threshold
            )));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SlamError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.initial_covariance_scale.is_finite() && self.initial_covariance_scale >= 0.0) {
            return Err(SlamError::InvalidConfig(format!(
                "initial_covariance_scale must be non-negative, got {}",
                self.initial_covariance_scale
            )));
        }
        if !(self.landmark_prior_variance.is_finite() && self.landmark_prior_variance > 0.0) {
            return Err(SlamError::InvalidConfig(format!(
                "landmark_prior_variance must be positive, got {}",
                self.landmark_prior_variance
            )));
        }
        if !self.initial_pose.iter().all(|v| v.is_finite()) {
            return Err(SlamError::InvalidConfig("initial_pose must be finite".into()));
        }
        Ok(())
    }
}

/// Noise matrices must be symmetric positive-definite so that `S` stays invertible.
fn check_covariance(name: &str, m: DMatrix<f64>) -> Result<()> {
    if !m.iter().all(|v| v.is_finite()) || (&m - m.transpose()).amax() > 1e-12 {
        return Err(SlamError::InvalidConfig(format!(
            "{name} must be finite and symmetric"
        )));
    }
    if Cholesky::new(m).is_none() {
        return Err(SlamError::InvalidConfig(format!(
            "{name} must be positive-definite"
        )));
    }
    Ok(())
}
