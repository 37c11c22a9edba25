// slam_core/src/slam/mod.rs

use crate::error::Result;
use crate::mapping::FeatureMap;
use crate::messages::{Control, CorrectionReport, Observation, Snapshot};
use crate::types::CHI_SQUARE_99_2DOF;

/// The contract a driver loop programs against: one `predict` per tick
/// followed by one `correct` with that tick's observations.
///
/// Implementations own their state outright. Two runs never share a
/// `SlamSystem`, so the trait only asks for `Send`.
pub trait SlamSystem: Send {
    /// Moves the pose estimate forward by one control step of `dt` seconds.
    fn predict(&mut self, control: &Control, dt: f64) -> Result<()>;

    /// Fuses a batch of observations, in order.
    fn correct(&mut self, observations: &[Observation]) -> Result<CorrectionReport>;

    /// A read-only copy of the current mean and covariance.
    fn snapshot(&self) -> Snapshot;

    fn landmark_count(&self) -> Result<usize>;

    /// The landmark map with 99% confidence ellipses.
    fn map(&self) -> Result<FeatureMap> {
        FeatureMap::from_snapshot(&self.snapshot(), CHI_SQUARE_99_2DOF)
    }
}
