// slam_core/src/estimation/ekf_slam.rs

use crate::config::EkfSlamConfig;
use crate::error::{Result, SlamError};
use crate::estimation::association::{compute_innovation, score_candidates, Association};
use crate::estimation::FilterPhase;
use crate::messages::{Control, CorrectionReport, Observation, ObservationOutcome, Snapshot};
use crate::models::{inverse_observation_model, motion_jacobian, motion_model};
use crate::slam::SlamSystem;
use crate::state::SlamState;
use crate::types::YAW_IDX;
use crate::utils::angles::normalize_angle;
use nalgebra::{DMatrix, DVector, Matrix2};
use tracing::{debug, info, trace};

/// Summary of one full `step`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub correction: CorrectionReport,
    /// Landmark count after the tick.
    pub landmark_count: usize,
}

/// An Extended Kalman Filter over the agent pose and a growing set of point landmarks.
#[derive(Debug, Clone)]
pub struct EkfSlam {
    /// Current mean and covariance.
    state: SlamState,
    config: EkfSlamConfig,
    phase: FilterPhase,
}

impl EkfSlam {
    /// Creates a filter at `config.initial_pose` with no landmarks.
    pub fn new(config: EkfSlamConfig) -> Result<Self> {
        config.validate()?;
        let state = SlamState::new(config.initial_pose, config.initial_covariance_scale);
        Ok(Self {
            state,
            config,
            phase: FilterPhase::Idle,
        })
    }

    pub fn config(&self) -> &EkfSlamConfig {
        &self.config
    }

    pub fn state(&self) -> &SlamState {
        &self.state
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    fn transition(&mut self, next: FilterPhase) {
        trace!(from = ?self.phase, to = ?next, "filter phase");
        self.phase = next;
    }

    /// Moves the pose estimate through the motion model.
    ///
    /// A stationary command (`v = ω = 0`) or `dt = 0` leaves mean and covariance
    /// untouched; otherwise the pose covariance grows by the configured process
    /// noise. The resulting yaw is wrapped into `(-π, π]`.
    ///
    /// Note that a stationary tick therefore does not add `Q` at all, unlike
    /// `SlamState::apply_predict`, which always adds it when called.
    pub fn predict(&mut self, control: &Control, dt: f64) -> Result<()> {
        if !control.is_finite() || !dt.is_finite() || dt < 0.0 {
            return Err(SlamError::InvalidInput(format!(
                "cannot predict with control {control:?} over dt = {dt}"
            )));
        }
        if control.is_stationary() || dt == 0.0 {
            return Ok(());
        }

        self.transition(FilterPhase::Predicting);
        let result = self.predict_pose(control, dt);
        self.transition(FilterPhase::Idle);
        result
    }

    /// `predict` over one configured `time_step`.
    pub fn predict_step(&mut self, control: &Control) -> Result<()> {
        self.predict(control, self.config.time_step)
    }

    fn predict_pose(&mut self, control: &Control, dt: f64) -> Result<()> {
        let pose = self.state.pose();
        let mut predicted = motion_model(&pose, control, dt);
        predicted[YAW_IDX] = normalize_angle(predicted[YAW_IDX]);

        let jacobians = motion_jacobian(&pose, control, dt, self.state.len());
        self.state.apply_predict(
            &predicted,
            &jacobians,
            &self.config.process_noise,
            self.config.prediction_policy,
        )
    }

    /// Fuses a batch of observations one after another.
    ///
    /// Each observation is associated against the state as left by the previous
    /// one, so the order of the batch matters. If an observation fails, the
    /// batch stops there: the state keeps every observation applied before it
    /// and the error is `CorrectionAborted` with that count. The yaw is wrapped
    /// in both cases.
    pub fn correct(&mut self, observations: &[Observation]) -> Result<CorrectionReport> {
        let result = observations.iter().try_fold(
            CorrectionReport::default(),
            |mut report, observation| {
                let outcome = self.correct_one(observation).map_err(|source| {
                    SlamError::CorrectionAborted {
                        applied: report.outcomes.len(),
                        source: Box::new(source),
                    }
                })?;
                report.outcomes.push(outcome);
                Ok(report)
            },
        );

        self.state.normalize_yaw();
        self.transition(FilterPhase::Idle);
        result
    }

    fn correct_one(&mut self, observation: &Observation) -> Result<ObservationOutcome> {
        if !observation.is_finite() || observation.range < 0.0 {
            return Err(SlamError::InvalidInput(format!(
                "malformed observation {observation:?}"
            )));
        }
        let noise = self.config.observation_noise;

        self.transition(FilterPhase::Associating);
        let report = score_candidates(
            &self.state,
            observation,
            &noise,
            self.config.gating_threshold,
        )?;

        self.transition(FilterPhase::Correcting);
        // Augmentation and correction run on a working copy; the filter only
        // sees a new landmark once its first correction has succeeded.
        let mut next = self.state.clone();
        let created = report.association() == Association::New;
        let mut new_position = None;
        if created {
            let position = inverse_observation_model(&next.pose(), observation);
            let prior = Matrix2::identity() * self.config.landmark_prior_variance;
            next.append_landmark(&position, &prior)?;
            new_position = Some(position);
        }

        let innovation = compute_innovation(&next, report.index, observation, &noise)?;
        let s_inv = innovation.inverse_covariance()?;
        let s_inv = DMatrix::from_column_slice(2, 2, s_inv.as_slice());
        let gain = next.covariance() * innovation.jacobian.transpose() * s_inv;
        let residual = DVector::from_column_slice(innovation.residual.as_slice());

        next.apply_correction(&gain, &residual, &innovation.jacobian)?;
        self.state = next;

        if let Some(position) = new_position {
            info!(
                index = report.index,
                x = position.x,
                y = position.y,
                "new landmark"
            );
        }
        debug!(
            landmark = report.index,
            created,
            distance = report.best_distance(),
            "fused observation"
        );
        Ok(ObservationOutcome {
            landmark_index: report.index,
            created,
            distance: report.best_distance(),
        })
    }

    /// One full tick: `predict` over the configured time step, then `correct`.
    pub fn step(&mut self, control: &Control, observations: &[Observation]) -> Result<TickReport> {
        self.predict_step(control)?;
        let correction = self.correct(observations)?;
        Ok(TickReport {
            correction,
            landmark_count: self.state.landmark_count()?,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn landmark_count(&self) -> Result<usize> {
        self.state.landmark_count()
    }
}

impl SlamSystem for EkfSlam {
    fn predict(&mut self, control: &Control, dt: f64) -> Result<()> {
        EkfSlam::predict(self, control, dt)
    }

    fn correct(&mut self, observations: &[Observation]) -> Result<CorrectionReport> {
        EkfSlam::correct(self, observations)
    }

    fn snapshot(&self) -> Snapshot {
        EkfSlam::snapshot(self)
    }

    fn landmark_count(&self) -> Result<usize> {
        EkfSlam::landmark_count(self)
    }
}
