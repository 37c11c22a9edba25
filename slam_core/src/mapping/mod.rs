// slam_core/src/mapping/mod.rs

use crate::error::Result;
use crate::messages::Snapshot;
use crate::types::{Pose2D, Position2D};
use nalgebra::Matrix2;

// --- Map Data Structures ---

/// One mapped landmark as seen by a renderer or reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedLandmark {
    /// The landmark's permanent index in the state vector.
    pub index: usize,
    pub position: Position2D,
    pub covariance: Matrix2<f64>,
    pub ellipse: ErrorEllipse,
}

/// The estimated landmark map plus the pose it was built around.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    pub pose: Pose2D,
    pub pose_ellipse: ErrorEllipse,
    pub landmarks: Vec<MappedLandmark>,
}

impl FeatureMap {
    /// Extracts every landmark from a snapshot, with confidence ellipses scaled by `chi_square`.
    pub fn from_snapshot(snapshot: &Snapshot, chi_square: f64) -> Result<Self> {
        let pose_cov = snapshot.pose_covariance();
        let pose_xy = pose_cov.fixed_view::<2, 2>(0, 0).into_owned();

        let landmarks = (0..snapshot.landmark_count())
            .filter_map(|index| snapshot.landmark(index).map(|lm| (index, lm)))
            .map(|(index, (position, covariance))| {
                Ok(MappedLandmark {
                    index,
                    position,
                    covariance,
                    ellipse: ErrorEllipse::from_covariance(&covariance, chi_square)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pose: snapshot.pose(),
            pose_ellipse: ErrorEllipse::from_covariance(&pose_xy, chi_square)?,
            landmarks,
        })
    }
}

mod ellipse;

pub use ellipse::ErrorEllipse;
