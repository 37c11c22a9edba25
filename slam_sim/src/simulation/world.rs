// slam_sim/src/simulation/world.rs

use slam_core::prelude::{
    motion_model, normalize_angle, observation_model, Control, Observation, Pose2D, Position2D,
};
use tracing::debug;

use crate::simulation::config::WorldConfig;
use crate::simulation::core::prng::SimulationRng;

/// What the world produced on one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldTick {
    /// Ground-truth pose after the tick.
    pub true_pose: Pose2D,
    /// Pose integrated from the noisy control alone.
    pub dead_reckoning: Pose2D,
    /// The command as odometry reports it. This is what the estimator receives.
    pub measured_control: Control,
    pub observations: Vec<Observation>,
}

/// Moves a single agent through a fixed landmark field and produces noisy
/// odometry and range/bearing detections.
#[derive(Debug, Clone)]
pub struct WorldSimulator {
    config: WorldConfig,
    dt: f64,
    true_pose: Pose2D,
    dead_reckoning: Pose2D,
    rng: SimulationRng,
}

impl WorldSimulator {
    pub fn new(config: WorldConfig, initial_pose: Pose2D, dt: f64, rng: SimulationRng) -> Self {
        Self {
            config,
            dt,
            true_pose: initial_pose,
            dead_reckoning: initial_pose,
            rng,
        }
    }

    pub fn landmarks(&self) -> &[Position2D] {
        &self.config.landmarks
    }

    pub fn true_pose(&self) -> Pose2D {
        self.true_pose
    }

    pub fn dead_reckoning(&self) -> Pose2D {
        self.dead_reckoning
    }

    /// The noise-free command the agent actually executes.
    pub fn commanded_control(&self) -> Control {
        Control::new(
            self.config.commanded_velocity,
            self.config.commanded_yaw_rate_deg.to_radians(),
        )
    }

    /// Advances the truth, senses from the new pose, then integrates odometry.
    pub fn step(&mut self) -> WorldTick {
        let command = self.commanded_control();
        self.true_pose = advance(&self.true_pose, &command, self.dt);

        let observations = self.sense();

        let [sigma_v, sigma_omega_deg] = self.config.control_noise_std;
        let measured_control = Control::new(
            command.v + self.rng.gaussian(sigma_v),
            command.omega + self.rng.gaussian(sigma_omega_deg.to_radians()),
        );
        self.dead_reckoning = advance(&self.dead_reckoning, &measured_control, self.dt);

        debug!(
            detections = observations.len(),
            x = self.true_pose.x,
            y = self.true_pose.y,
            "world tick"
        );
        WorldTick {
            true_pose: self.true_pose,
            dead_reckoning: self.dead_reckoning,
            measured_control,
            observations,
        }
    }

    /// Detects every in-range landmark with the configured probability.
    fn sense(&mut self) -> Vec<Observation> {
        let [sigma_range, sigma_bearing_deg] = self.config.observation_noise_std;
        let mut observations = Vec::new();
        for (id, landmark) in self.config.landmarks.iter().enumerate() {
            let z = observation_model(&self.true_pose, landmark);
            if z.x > self.config.max_range {
                continue;
            }
            if !self.rng.chance(self.config.detection_probability) {
                continue;
            }
            let range = (z.x + self.rng.gaussian(sigma_range)).max(0.0);
            let bearing =
                normalize_angle(z.y + self.rng.gaussian(sigma_bearing_deg.to_radians()));
            observations.push(Observation::new(range, bearing).with_true_id(id));
        }
        observations
    }
}

fn advance(pose: &Pose2D, control: &Control, dt: f64) -> Pose2D {
    let mut next = motion_model(pose, control, dt);
    next.z = normalize_angle(next.z);
    next
}
