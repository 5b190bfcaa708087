//! Flattened storage form of a model's support vectors

use crate::core::{Result, SVMError, Task};
use crate::kernel::KernelSpec;
use crate::model::{Model, ModelStatistics, SupportVectorSet};
use serde::{Deserialize, Serialize};

/// Support vectors as stored externally
///
/// `flattened_vectors` is the row-major concatenation of all vectors, so it
/// holds exactly `count * vector_dimension` values. Support vectors always
/// have at least one feature, so `vector_dimension = 0` only ever appears
/// together with `count = 0` and means the model is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelExport {
    pub vector_dimension: usize,
    pub count: usize,
    pub weights: Vec<f64>,
    pub flattened_vectors: Vec<f64>,
}

impl Model {
    /// Export the support vectors in the flattened layout
    pub fn export(&self) -> ModelExport {
        ModelExport {
            vector_dimension: self.vector_dimension().unwrap_or(0),
            count: self.support_vectors.len(),
            weights: self.support_vectors.weights().to_vec(),
            flattened_vectors: self.support_vectors.flattened(),
        }
    }

    /// Rebuild a model from its statistics and flattened support vectors
    pub fn from_export(
        task: Task,
        kernel: KernelSpec,
        stats: ModelStatistics,
        export: &ModelExport,
    ) -> Result<Self> {
        if export.weights.len() != export.count {
            return Err(SVMError::ParseError(format!(
                "Support vector count {} does not match {} weights",
                export.count,
                export.weights.len()
            )));
        }
        if (export.count as u64) > stats.observation_count {
            return Err(SVMError::ParseError(format!(
                "{} support vectors exceed {} observations",
                export.count, stats.observation_count
            )));
        }
        if export.count > 0 && export.vector_dimension == 0 {
            return Err(SVMError::ParseError(format!(
                "{} support vectors stored with dimension 0",
                export.count
            )));
        }
        check_stored_statistics(&stats)?;
        check_stored_values("support vector weight", &export.weights)?;
        check_stored_values("support vector value", &export.flattened_vectors)?;

        let support_vectors = SupportVectorSet::from_flattened(
            export.vector_dimension,
            export.weights.clone(),
            &export.flattened_vectors,
        )?;

        Ok(Self {
            task,
            kernel,
            stats,
            support_vectors,
        })
    }
}

fn check_stored_statistics(stats: &ModelStatistics) -> Result<()> {
    let fields = [
        ("cumulative_error", stats.cumulative_error),
        ("epsilon", stats.epsilon),
        ("rho", stats.rho),
        ("offset", stats.offset),
    ];
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(SVMError::ParseError(format!(
            "Stored {name} is not finite: {value}"
        ))),
        None => Ok(()),
    }
}

fn check_stored_values(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(SVMError::ParseError(format!(
            "Stored {what} {i} is not finite: {}",
            values[i]
        ))),
        None => Ok(()),
    }
}
