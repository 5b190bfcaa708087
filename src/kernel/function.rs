//! Closed kernel selection and resolution of stored kernel identifiers

use crate::core::{Result, SVMError};
use crate::kernel::{DotKernel, GaussianKernel, Kernel, KernelSpec, PolynomialKernel};
use std::collections::HashMap;
use std::sync::Arc;

/// A kernel chosen once per training or prediction run
///
/// The three reference kernels are matched statically; anything else goes
/// through `Custom`.
#[derive(Debug, Clone)]
pub enum KernelFunction {
    Dot(DotKernel),
    Polynomial(PolynomialKernel),
    Gaussian(GaussianKernel),
    Custom(Arc<dyn Kernel>),
}

impl KernelFunction {
    /// Dot-product kernel
    pub fn dot() -> Self {
        KernelFunction::Dot(DotKernel::new())
    }

    /// Polynomial kernel of the given degree
    pub fn polynomial(degree: u32) -> Result<Self> {
        Ok(KernelFunction::Polynomial(PolynomialKernel::new(degree)?))
    }

    /// Gaussian kernel of the given width
    pub fn gaussian(gamma: f64) -> Result<Self> {
        Ok(KernelFunction::Gaussian(GaussianKernel::new(gamma)?))
    }

    /// Wrap a user-supplied kernel
    pub fn custom<K: Kernel + 'static>(kernel: K) -> Self {
        KernelFunction::Custom(Arc::new(kernel))
    }

    /// Resolve one of the built-in identifiers
    ///
    /// Custom identifiers need a [`KernelRegistry`].
    pub fn from_spec(spec: &KernelSpec) -> Result<Self> {
        match spec {
            KernelSpec::Dot => Ok(Self::dot()),
            KernelSpec::Polynomial { degree } => Self::polynomial(*degree),
            KernelSpec::Gaussian { gamma } => Self::gaussian(*gamma),
            KernelSpec::Custom { name } => Err(SVMError::InvalidParameter(format!(
                "Custom kernel '{name}' must be resolved through a registry"
            ))),
        }
    }
}

impl Default for KernelFunction {
    fn default() -> Self {
        Self::dot()
    }
}

impl Kernel for KernelFunction {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            KernelFunction::Dot(k) => k.compute(x, y),
            KernelFunction::Polynomial(k) => k.compute(x, y),
            KernelFunction::Gaussian(k) => k.compute(x, y),
            KernelFunction::Custom(k) => k.compute(x, y),
        }
    }

    fn spec(&self) -> KernelSpec {
        match self {
            KernelFunction::Dot(k) => k.spec(),
            KernelFunction::Polynomial(k) => k.spec(),
            KernelFunction::Gaussian(k) => k.spec(),
            KernelFunction::Custom(k) => k.spec(),
        }
    }
}

/// Maps stored kernel identifiers, including custom ones, back to callables
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    custom: HashMap<String, Arc<dyn Kernel>>,
}

impl KernelRegistry {
    /// Registry that only knows the built-in kernels
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom kernel under the name its spec reports
    pub fn register<K: Kernel + 'static>(&mut self, kernel: K) -> Result<()> {
        match kernel.spec() {
            KernelSpec::Custom { name } => {
                self.custom.insert(name, Arc::new(kernel));
                Ok(())
            }
            other => Err(SVMError::InvalidParameter(format!(
                "Only custom kernels can be registered, got: {other}"
            ))),
        }
    }

    /// Resolve a stored identifier
    pub fn resolve(&self, spec: &KernelSpec) -> Result<KernelFunction> {
        match spec {
            KernelSpec::Custom { name } => self
                .custom
                .get(name)
                .map(|k| KernelFunction::Custom(Arc::clone(k)))
                .ok_or_else(|| {
                    SVMError::InvalidParameter(format!("Unknown custom kernel: {name}"))
                }),
            builtin => KernelFunction::from_spec(builtin),
        }
    }
}
