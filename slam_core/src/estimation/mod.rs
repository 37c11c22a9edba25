// slam_core/src/estimation/mod.rs

pub mod association;
pub mod ekf_slam;

pub use association::{find_best_match, Association, Innovation, MatchReport};
pub use ekf_slam::{EkfSlam, TickReport};

/// Where the filter is inside a tick.
///
/// A tick runs `Idle → Predicting → (Associating → Correcting)* → Idle`.
/// Every public call returns the filter to `Idle`, whether it succeeded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPhase {
    #[default]
    Idle,
    Predicting,
    Associating,
    Correcting,
}
