//! Online kernel machines in Rust
//!
//! Regression, binary classification and novelty detection trained in a
//! single pass with the NORMA algorithm of Kivinen, Smola and Williamson
//! ("Online Learning with Kernels"). Models are append-only sets of
//! weighted support vectors plus a handful of adaptive scalars.

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod model;
pub mod optimizer;
pub mod persistence;
pub mod predict;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::{OnlineSVM, TrainedEnsemble, TrainedModel};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::CSVDataset;
pub use crate::kernel::{Kernel, KernelFunction, KernelRegistry, KernelSpec};
pub use crate::model::{Model, ModelExport, ModelStatistics};
pub use crate::optimizer::{
    train_classification, train_novelty_detection, train_partitioned, train_regression,
};
pub use crate::persistence::ModelFile;
pub use crate::predict::{predict_ensemble, predict_single, Ensemble, EnsembleLabel};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
