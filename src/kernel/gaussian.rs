//! Gaussian (RBF) kernel implementation
//!
//! The Gaussian kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) controls the kernel width.

use crate::core::{Result, SVMError};
use crate::kernel::{Kernel, KernelSpec};

/// Gaussian kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each support vector:
/// - High gamma: only close points influence a prediction
/// - Low gamma: distant support vectors still contribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    gamma: f64,
}

impl GaussianKernel {
    /// Create a new Gaussian kernel
    ///
    /// # Arguments
    /// * `gamma` - The gamma parameter (must be positive and finite)
    pub fn new(gamma: f64) -> Result<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "Gamma must be positive, got: {gamma}"
            )));
        }
        Ok(Self { gamma })
    }

    /// Create a Gaussian kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Result<Self> {
        if n_features == 0 {
            return Err(SVMError::InvalidParameter(
                "Number of features must be positive".to_string(),
            ));
        }
        Self::new(1.0 / n_features as f64)
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for GaussianKernel {
    /// Gaussian kernel with gamma = 1.0
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl Kernel for GaussianKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (-self.gamma * squared_euclidean_distance(x, y)).exp()
    }

    fn spec(&self) -> KernelSpec {
        KernelSpec::Gaussian { gamma: self.gamma }
    }
}

/// ||x - y||² = Σᵢ (xᵢ - yᵢ)²
fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}
