// slam_sim/src/lib.rs

//! A seeded 2D world that feeds noisy controls and range/bearing detections
//! to the `slam_core` EKF-SLAM estimator and scores the result against ground truth.

// This prelude is for convenience for other files WITHIN the slam_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;
