// slam_core/src/models/mod.rs

//! Kinematic models shared by the estimator and by anything that simulates
//! the agent. Both sides must call the same functions so that ground truth,
//! dead reckoning and prediction stay consistent.

pub mod motion;
pub mod observation;

pub use motion::{motion_jacobian, motion_model, MotionJacobians};
pub use observation::{
    inverse_observation_model, observation_jacobian, observation_model,
    scatter_observation_jacobian, ObservationJacobian,
};
