//! Kernel trait definition

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel function trait
///
/// A kernel K(x, y) is a symmetric similarity over two dense vectors of the
/// same length. Implementations may assume equal lengths in `compute`;
/// `evaluate` is the checked entry point.
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Compute kernel value K(x, y) for vectors of equal length
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;

    /// Identifier stored alongside trained models
    fn spec(&self) -> KernelSpec;

    /// Compute K(x, y), failing if the lengths differ
    fn evaluate(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        check_dimensions(x.len(), y.len())?;
        Ok(self.compute(x, y))
    }
}

/// Serializable kernel identifier
///
/// This is what a model records about its kernel; [`crate::kernel::KernelRegistry`]
/// turns it back into a callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelSpec {
    Dot,
    Polynomial { degree: u32 },
    Gaussian { gamma: f64 },
    Custom { name: String },
}

impl fmt::Display for KernelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelSpec::Dot => write!(f, "dot"),
            KernelSpec::Polynomial { degree } => write!(f, "polynomial(degree={degree})"),
            KernelSpec::Gaussian { gamma } => write!(f, "gaussian(gamma={gamma})"),
            KernelSpec::Custom { name } => write!(f, "custom({name})"),
        }
    }
}

/// Fail with `DimensionMismatch` unless both lengths agree
pub fn check_dimensions(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SVMError::DimensionMismatch { expected, actual })
    }
}
