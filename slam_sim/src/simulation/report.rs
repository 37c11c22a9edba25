// slam_sim/src/simulation/report.rs

use serde::Serialize;
use slam_core::prelude::{normalize_angle, Pose2D, Position2D, Snapshot};
use std::fmt;
use tracing::info;

use crate::simulation::driver::RunHistory;

/// How far one estimated landmark ended up from the closest true landmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkError {
    /// Index of the landmark in the estimator's state.
    pub index: usize,
    /// The nearest true landmark, if the world has any.
    pub nearest_true_id: Option<usize>,
    /// Distance to it [m].
    pub distance: f64,
}

/// End-of-run comparison between the estimate, dead reckoning, and ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub landmark_count: usize,
    /// Distance between the final estimated and true positions [m].
    pub final_position_error: f64,
    /// Absolute final heading error [deg].
    pub final_yaw_error_deg: f64,
    /// Position error of the estimate averaged over every tick [m].
    pub mean_position_error: f64,
    /// Position error of dead reckoning averaged over every tick [m].
    pub mean_dead_reckoning_error: f64,
    pub landmark_errors: Vec<LandmarkError>,
}

impl RunSummary {
    pub fn compute(history: &RunHistory, last: &Snapshot, true_landmarks: &[Position2D]) -> Self {
        let final_truth = history.true_poses.last().copied().unwrap_or_else(Pose2D::zeros);
        let final_estimate = last.pose();

        let landmark_errors = (0..last.landmark_count())
            .filter_map(|index| last.landmark(index).map(|(position, _)| (index, position)))
            .map(|(index, position)| {
                let nearest = nearest_landmark(&position, true_landmarks);
                LandmarkError {
                    index,
                    nearest_true_id: nearest.map(|(id, _)| id),
                    distance: nearest.map_or(f64::INFINITY, |(_, d)| d),
                }
            })
            .collect();

        Self {
            ticks: history.len(),
            landmark_count: last.landmark_count(),
            final_position_error: position_error(&final_truth, &final_estimate),
            final_yaw_error_deg: yaw_error(&final_truth, &final_estimate).to_degrees(),
            mean_position_error: mean_error(&history.true_poses, &history.estimates),
            mean_dead_reckoning_error: mean_error(&history.true_poses, &history.dead_reckoning),
            landmark_errors,
        }
    }

    /// Emits the summary through `tracing`.
    pub fn log(&self) {
        info!(
            "State Error | Pos Err: {:.3}m | Att Err: {:.3}° | Mean Pos Err: {:.3}m (dead reckoning {:.3}m)",
            self.final_position_error,
            self.final_yaw_error_deg,
            self.mean_position_error,
            self.mean_dead_reckoning_error
        );
        for lm in &self.landmark_errors {
            info!(
                index = lm.index,
                nearest = ?lm.nearest_true_id,
                "Landmark Error | {:.3}m",
                lm.distance
            );
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:                 {}", self.ticks)?;
        writeln!(f, "landmarks:             {}", self.landmark_count)?;
        writeln!(f, "final position error:  {:.3} m", self.final_position_error)?;
        writeln!(f, "final yaw error:       {:.3} deg", self.final_yaw_error_deg)?;
        writeln!(f, "mean position error:   {:.3} m", self.mean_position_error)?;
        write!(f, "mean dead reckoning:   {:.3} m", self.mean_dead_reckoning_error)?;
        for lm in &self.landmark_errors {
            match lm.nearest_true_id {
                Some(id) => write!(f, "\nlandmark {} -> true {}: {:.3} m", lm.index, id, lm.distance)?,
                None => write!(f, "\nlandmark {}: no true landmark", lm.index)?,
            }
        }
        Ok(())
    }
}

fn position_error(truth: &Pose2D, estimate: &Pose2D) -> f64 {
    (truth.xy() - estimate.xy()).norm()
}

fn yaw_error(truth: &Pose2D, estimate: &Pose2D) -> f64 {
    normalize_angle(truth.z - estimate.z).abs()
}

fn mean_error(truth: &[Pose2D], other: &[Pose2D]) -> f64 {
    let n = truth.len().min(other.len());
    if n == 0 {
        return 0.0;
    }
    truth
        .iter()
        .zip(other)
        .map(|(t, o)| position_error(t, o))
        .sum::<f64>()
        / n as f64
}

fn nearest_landmark(position: &Position2D, truth: &[Position2D]) -> Option<(usize, f64)> {
    truth
        .iter()
        .enumerate()
        .map(|(id, lm)| (id, (lm - position).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
