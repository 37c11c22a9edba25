// slam_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::error::{Result, SlamError};
pub use crate::slam::SlamSystem;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::EkfSlamConfig;
pub use crate::mapping::{ErrorEllipse, FeatureMap, MappedLandmark};
pub use crate::messages::{Control, CorrectionReport, Observation, ObservationOutcome, Snapshot};
pub use crate::state::{PredictionPolicy, SlamState, StateBlock};
pub use crate::types::{Pose2D, Position2D, CHI_SQUARE_99_2DOF};

// --- Estimation Algorithms ---
pub use crate::estimation::{Association, EkfSlam, FilterPhase, TickReport};

// --- Shared Kinematics ---
pub use crate::models::{inverse_observation_model, motion_model, observation_model};
pub use crate::utils::angles::normalize_angle;
