// slam_sim/src/simulation/config/structs.rs

use serde::{Deserialize, Serialize};
use slam_core::prelude::{EkfSlamConfig, Position2D};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// Everything needed for one simulation run.
/// This struct is the root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct ScenarioConfig {
    pub simulation: SimulationSection,
    pub world: WorldConfig,
    /// Assumptions handed to the estimator. These may differ from `world`.
    pub filter: EkfSlamConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in the scenario TOML.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationSection {
    /// Seed for the pseudo-random number generator.
    pub seed: u64,
    /// Duration of the simulation in seconds.
    pub duration_seconds: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_seconds: 50.0,
        }
    }
}

/// The ground truth the estimator never sees directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WorldConfig {
    /// True landmark positions `[x, y]` in meters.
    #[serde(with = "landmark_list")]
    pub landmarks: Vec<Position2D>,
    /// Landmarks farther than this are never detected [m].
    pub max_range: f64,
    /// Chance that an in-range landmark is detected on a given tick.
    pub detection_probability: f64,
    /// `[sigma_range (m), sigma_bearing (deg)]` of the sensor.
    pub observation_noise_std: [f64; 2],
    /// `[sigma_v (m/s), sigma_omega (deg/s)]` added to the command before odometry sees it.
    pub control_noise_std: [f64; 2],
    /// Linear velocity the agent is commanded to drive at [m/s].
    pub commanded_velocity: f64,
    /// Yaw rate the agent is commanded to turn at [deg/s].
    pub commanded_yaw_rate_deg: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            landmarks: vec![
                Position2D::new(10.0, -2.0),
                Position2D::new(15.0, 10.0),
                Position2D::new(3.0, 15.0),
                Position2D::new(-5.0, 20.0),
            ],
            max_range: 20.0,
            detection_probability: 0.3,
            observation_noise_std: [0.2, 1.0],
            control_noise_std: [1.0, 10.0],
            commanded_velocity: 1.0,
            commanded_yaw_rate_deg: 0.1f64.to_degrees(),
        }
    }
}

mod landmark_list {
    use nalgebra::Vector2;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(landmarks: &[Vector2<f64>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(landmarks.iter().map(|l| [l.x, l.y]))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vector2<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<[f64; 2]> = Deserialize::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Vector2::new(x, y)).collect())
    }
}
