// slam_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod driver;
pub mod report;
pub mod world;
