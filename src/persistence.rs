//! Model serialization and persistence
//!
//! Models are stored as JSON documents so the CLI can train and predict in
//! separate invocations. An ensemble is stored as one record per member.

use crate::core::{LearningParams, Result, SVMError, Task};
use crate::kernel::{KernelFunction, KernelRegistry, KernelSpec};
use crate::model::{Model, ModelExport, ModelStatistics};
use crate::predict::Ensemble;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of one or more trained models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Task every record was trained for
    pub task: Task,
    /// Kernel identifier shared by every record
    pub kernel: KernelSpec,
    /// Model metadata
    pub metadata: ModelMetadata,
    /// One record per model, in partition order
    pub models: Vec<ModelRecord>,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Training parameters used
    pub params: LearningParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Statistics and flattened support vectors of a single model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub statistics: ModelStatistics,
    pub support_vectors: ModelExport,
}

impl From<&Model> for ModelRecord {
    fn from(model: &Model) -> Self {
        Self {
            statistics: *model.statistics(),
            support_vectors: model.export(),
        }
    }
}

impl ModelFile {
    /// Wrap trained models for storage
    ///
    /// All models must share the same task and kernel.
    pub fn from_models(models: &[Model], params: LearningParams) -> Result<Self> {
        let first = models.first().ok_or(SVMError::EmptyModel)?;
        if let Some(other) = models
            .iter()
            .find(|m| m.task() != first.task() || m.kernel() != first.kernel())
        {
            return Err(SVMError::InvalidParameter(format!(
                "Cannot store a {} model ({}) with a {} model ({})",
                other.task(),
                other.kernel(),
                first.task(),
                first.kernel()
            )));
        }

        Ok(Self {
            task: first.task(),
            kernel: first.kernel().clone(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                params,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            models: models.iter().map(ModelRecord::from).collect(),
        })
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SVMError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild every stored model
    pub fn to_models(&self) -> Result<Vec<Model>> {
        self.models
            .iter()
            .map(|record| {
                Model::from_export(
                    self.task,
                    self.kernel.clone(),
                    record.statistics,
                    &record.support_vectors,
                )
            })
            .collect()
    }

    /// Rebuild the stored models as an ensemble
    pub fn to_ensemble(&self) -> Result<Ensemble> {
        Ok(Ensemble::new(self.to_models()?))
    }

    /// Callable for the stored kernel identifier
    pub fn kernel_function(&self, registry: &KernelRegistry) -> Result<KernelFunction> {
        registry.resolve(&self.kernel)
    }

    pub fn is_ensemble(&self) -> bool {
        self.models.len() > 1
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Online SVM Model Summary ===");
        println!("Task: {}", self.task);
        println!("Kernel: {}", self.kernel);
        println!("Models: {}", self.models.len());
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Learning Parameters:");
        println!("  Eta: {}", self.metadata.params.eta);
        println!("  Nu: {}", self.metadata.params.nu);
        if self.task == Task::Regression {
            println!("  Slambda: {}", self.metadata.params.slambda);
        }
        println!("  Schedule: {:?}", self.metadata.params.schedule);

        for (i, record) in self.models.iter().enumerate() {
            let stats = &record.statistics;
            println!("Model {i}:");
            println!("  Observations: {}", stats.observation_count);
            println!("  Support Vectors: {}", record.support_vectors.count);
            println!("  Vector Dimension: {}", record.support_vectors.vector_dimension);
            println!("  Cumulative Error: {:.6}", stats.cumulative_error);
            match self.task {
                Task::Regression => {
                    println!("  Epsilon: {:.6}", stats.epsilon);
                    println!("  Offset: {:.6}", stats.offset);
                }
                Task::Classification | Task::NoveltyDetection => {
                    println!("  Rho: {:.6}", stats.rho);
                }
            }
        }
    }
}
