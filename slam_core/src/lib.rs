// slam_core/src/lib.rs

//! EKF-SLAM: joint estimation of a planar agent pose and a growing map of
//! point landmarks from range/bearing observations.
//!
//! This crate is the pure estimation core. It performs no I/O and holds no
//! global state; simulation and reporting live in `slam_sim`.

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod estimation;
pub mod mapping;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod slam;
pub mod state;
pub mod types;
pub mod utils;
