// slam_sim/src/prelude.rs

// Re-export the entire slam_core prelude so plugins can reach `EkfSlam`,
// `Observation`, `Pose2D` and friends directly.
pub use slam_core::prelude::*;

pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{load_scenario, SimError};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::driver::{run, RunHistory, RunOutcome};
pub use crate::simulation::report::RunSummary;
pub use crate::simulation::world::{WorldSimulator, WorldTick};
