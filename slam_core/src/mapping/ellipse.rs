// slam_core/src/mapping/ellipse.rs

use crate::error::{Result, SlamError};
use nalgebra::{Matrix2, SymmetricEigen};

/// A confidence ellipse for a 2D Gaussian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorEllipse {
    pub semi_major: f64,
    pub semi_minor: f64,
    /// Orientation of the major axis, from the world x-axis [rad].
    pub angle: f64,
}

impl ErrorEllipse {
    /// Builds the ellipse `xᵀ·P⁻¹·x = chi_square` for a 2x2 covariance `P`.
    ///
    /// Small negative eigenvalues from round-off are clamped to zero.
    pub fn from_covariance(covariance: &Matrix2<f64>, chi_square: f64) -> Result<Self> {
        if !covariance.iter().all(|v| v.is_finite()) || !chi_square.is_finite() {
            return Err(SlamError::NumericalInstability(format!(
                "error ellipse of {covariance:?}"
            )));
        }
        // Average the off-diagonal so the eigen-solver sees an exactly symmetric matrix.
        let mut symmetric = *covariance;
        let off = 0.5 * (covariance[(0, 1)] + covariance[(1, 0)]);
        symmetric[(0, 1)] = off;
        symmetric[(1, 0)] = off;

        let eigen = SymmetricEigen::new(symmetric);
        let (major, minor) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let axis = eigen.eigenvectors.column(major);

        Ok(Self {
            semi_major: (chi_square * eigen.eigenvalues[major].max(0.0)).sqrt(),
            semi_minor: (chi_square * eigen.eigenvalues[minor].max(0.0)).sqrt(),
            angle: axis[1].atan2(axis[0]),
        })
    }
}
