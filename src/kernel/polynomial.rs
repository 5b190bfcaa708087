//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = <x, y>^d
//!
//! Common configurations:
//! - d=1: identical to the dot-product kernel
//! - d=2: all pairwise feature products
//! - d=3: all feature triples

use crate::core::{Result, SVMError};
use crate::kernel::dot::dot_product;
use crate::kernel::traits::{Kernel, KernelSpec};

/// Homogeneous polynomial kernel with configurable degree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    degree: u32,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel
    ///
    /// # Arguments
    /// * `degree` - Degree of the polynomial (must be >= 1)
    ///
    /// # Examples
    /// ```
    /// use osvm::kernel::PolynomialKernel;
    ///
    /// let quad_kernel = PolynomialKernel::new(2).unwrap();
    /// assert_eq!(quad_kernel.degree(), 2);
    /// assert!(PolynomialKernel::new(0).is_err());
    /// ```
    pub fn new(degree: u32) -> Result<Self> {
        if degree == 0 {
            return Err(SVMError::InvalidParameter(
                "Polynomial degree must be positive".to_string(),
            ));
        }
        if degree > i32::MAX as u32 {
            return Err(SVMError::InvalidParameter(format!(
                "Polynomial degree too large: {degree}"
            )));
        }
        Ok(Self { degree })
    }

    /// Degree of the polynomial
    pub fn degree(&self) -> u32 {
        self.degree
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        // Degree is bounded by i32::MAX at construction
        dot_product(x, y).powi(self.degree as i32)
    }

    fn spec(&self) -> KernelSpec {
        KernelSpec::Polynomial {
            degree: self.degree,
        }
    }
}
