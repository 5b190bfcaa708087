//! Trained online kernel machine
//!
//! A [`Model`] is produced by folding a stream of examples through one of
//! the update rules in [`crate::solver`]. Outside the crate it is read-only.

pub mod export;
pub mod support;

pub use self::export::*;
pub use self::support::*;

use crate::core::{Result, Task};
use crate::kernel::{Kernel, KernelSpec};
use serde::{Deserialize, Serialize};

/// Initial margin threshold for classification and novelty detection
pub const INITIAL_RHO: f64 = 1.0;

/// Scalar statistics carried alongside the support vectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    /// Number of training examples processed
    pub observation_count: u64,
    /// Running sum of the task-specific error term
    pub cumulative_error: f64,
    /// Half-width of the insensitivity tube (regression)
    pub epsilon: f64,
    /// Margin threshold (classification, novelty detection)
    pub rho: f64,
    /// Bias added to the decision function
    pub offset: f64,
}

impl Default for ModelStatistics {
    fn default() -> Self {
        Self {
            observation_count: 0,
            cumulative_error: 0.0,
            epsilon: 0.0,
            rho: INITIAL_RHO,
            offset: 0.0,
        }
    }
}

/// An online kernel machine: support vectors plus scalar statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub(crate) task: Task,
    pub(crate) kernel: KernelSpec,
    pub(crate) stats: ModelStatistics,
    pub(crate) support_vectors: SupportVectorSet,
}

impl Model {
    /// Empty model: zero counters, rho = 1, no support vectors
    pub(crate) fn new(task: Task, kernel: KernelSpec) -> Self {
        Self {
            task,
            kernel,
            stats: ModelStatistics::default(),
            support_vectors: SupportVectorSet::new(),
        }
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Identifier of the kernel the model was trained with
    pub fn kernel(&self) -> &KernelSpec {
        &self.kernel
    }

    pub fn statistics(&self) -> &ModelStatistics {
        &self.stats
    }

    pub fn observation_count(&self) -> u64 {
        self.stats.observation_count
    }

    pub fn cumulative_error(&self) -> f64 {
        self.stats.cumulative_error
    }

    pub fn epsilon(&self) -> f64 {
        self.stats.epsilon
    }

    pub fn rho(&self) -> f64 {
        self.stats.rho
    }

    pub fn offset(&self) -> f64 {
        self.stats.offset
    }

    pub fn support_vectors(&self) -> &SupportVectorSet {
        &self.support_vectors
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    /// Dimension fixed by the first admitted example
    pub fn vector_dimension(&self) -> Option<usize> {
        self.support_vectors.dimension()
    }

    /// f(x) = offset + Σ weight_i * K(sv_i, x)
    pub fn decision_value<K: Kernel + ?Sized>(&self, kernel: &K, x: &[f64]) -> Result<f64> {
        self.support_vectors.evaluate(kernel, self.stats.offset, x)
    }
}
