// slam_core/src/error.rs

use thiserror::Error;

/// Every failure the estimator can surface to its caller.
///
/// `InvariantViolation` is a programmer error and a run that hits it should be
/// abandoned. `IndexOutOfRange` is a caller error. `NumericalInstability` means
/// a required inversion was singular or produced non-finite values, which
/// usually points to a degenerate configuration or a diverging filter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SlamError {
    #[error("state invariant violated: {0}")]
    InvariantViolation(String),

    #[error("landmark index {index} out of range ({count} landmarks in the map)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("numerical instability while computing {0}")]
    NumericalInstability(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An observation batch stopped part-way. The first `applied` observations
    /// of the batch were fused into the state before `source` occurred.
    #[error("correction aborted after {applied} applied observation(s): {source}")]
    CorrectionAborted {
        applied: usize,
        #[source]
        source: Box<SlamError>,
    },
}

impl SlamError {
    /// Unwraps any `CorrectionAborted` layers and returns the error that caused them.
    pub fn root_cause(&self) -> &SlamError {
        match self {
            SlamError::CorrectionAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlamError>;
