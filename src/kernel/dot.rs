//! Dot-product kernel implementation

use crate::kernel::{Kernel, KernelSpec};

/// Dot-product kernel: K(x, y) = x^T * y
///
/// The simplest kernel; an online machine trained with it is a linear model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotKernel;

impl DotKernel {
    /// Create a new dot-product kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for DotKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        dot_product(x, y)
    }

    fn spec(&self) -> KernelSpec {
        KernelSpec::Dot
    }
}

/// Compute the dot product of two dense vectors
pub(crate) fn dot_product(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}
