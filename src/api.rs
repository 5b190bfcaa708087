//! High-level API for online kernel machines
//!
//! This module provides a builder-style interface for training regression,
//! classification and novelty-detection models and for querying them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use osvm::api::OnlineSVM;
//! use osvm::kernel::KernelFunction;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svm = OnlineSVM::classification()
//!     .with_eta(0.05)
//!     .with_nu(0.01)
//!     .with_kernel(KernelFunction::gaussian(0.5)?)
//!     .train_from_csv("train.csv")?;
//!
//! let predictions = svm.predict_from_csv("test.csv")?;
//! println!("Accuracy: {:.2}%", svm.accuracy_from_csv("test.csv")? * 100.0);
//! # let _ = predictions;
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, LearningParams, LearningRateSchedule, Prediction, Result, SVMError, Sample, Task,
};
use crate::data::CSVDataset;
use crate::kernel::{Kernel, KernelFunction};
use crate::model::Model;
use crate::optimizer::{self, train_task};
use crate::persistence::ModelFile;
use crate::predict::{self, Ensemble, EnsembleLabel};
use std::path::Path;

/// High-level online SVM interface with builder pattern
#[derive(Debug, Clone)]
pub struct OnlineSVM<K: Kernel = KernelFunction> {
    task: Task,
    kernel: K,
    params: LearningParams,
}

impl OnlineSVM<KernelFunction> {
    /// Builder for `task` with a dot-product kernel and default parameters
    pub fn new(task: Task) -> Self {
        Self {
            task,
            kernel: KernelFunction::default(),
            params: LearningParams::default(),
        }
    }

    pub fn regression() -> Self {
        Self::new(Task::Regression)
    }

    pub fn classification() -> Self {
        Self::new(Task::Classification)
    }

    pub fn novelty_detection() -> Self {
        Self::new(Task::NoveltyDetection)
    }
}

impl<K: Kernel> OnlineSVM<K> {
    /// Replace the kernel
    pub fn with_kernel<K2: Kernel>(self, kernel: K2) -> OnlineSVM<K2> {
        OnlineSVM {
            task: self.task,
            kernel,
            params: self.params,
        }
    }

    /// Set the learning rate
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.params.eta = eta;
        self
    }

    /// Set the target fraction of margin errors
    pub fn with_nu(mut self, nu: f64) -> Self {
        self.params.nu = nu;
        self
    }

    /// Set the offset step fraction (regression only)
    pub fn with_slambda(mut self, slambda: f64) -> Self {
        self.params.slambda = slambda;
        self
    }

    pub fn with_schedule(mut self, schedule: LearningRateSchedule) -> Self {
        self.params.schedule = schedule;
        self
    }

    /// Replace all learning parameters at once
    pub fn with_params(mut self, params: LearningParams) -> Self {
        self.params = params;
        self
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    /// Train on samples, in order
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel<K>> {
        let model = train_task(self.task, samples, &self.kernel, self.params)?;
        Ok(TrainedModel {
            model,
            kernel: self.kernel,
            params: self.params,
        })
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel<K>> {
        self.train_samples(&dataset.samples())
    }

    /// Train novelty detection on bare feature vectors
    pub fn train_vectors<X: AsRef<[f64]>>(self, vectors: &[X]) -> Result<TrainedModel<K>> {
        if self.task != Task::NoveltyDetection {
            return Err(SVMError::InvalidParameter(format!(
                "Unlabelled training requires novelty detection, not {}",
                self.task
            )));
        }
        let model = optimizer::train_novelty_detection(vectors, &self.kernel, self.params)?;
        Ok(TrainedModel {
            model,
            kernel: self.kernel,
            params: self.params,
        })
    }

    /// Train from CSV file (automatically detects headers)
    ///
    /// Novelty detection reads every column as a feature.
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = match self.task {
            Task::NoveltyDetection => CSVDataset::from_file_unlabeled(path)?,
            Task::Regression | Task::Classification => CSVDataset::from_file(path)?,
        };
        self.train(&dataset)
    }

    /// Train one model per round-robin partition, in parallel
    pub fn train_partitioned(
        self,
        samples: Vec<Sample>,
        partitions: usize,
    ) -> Result<TrainedEnsemble<K>> {
        let (task, params) = (self.task, self.params);
        let kernel = &self.kernel;
        let ensemble = optimizer::train_partitioned(samples, partitions, |part| {
            train_task(task, part, kernel, params)
        })?;
        Ok(TrainedEnsemble {
            ensemble,
            kernel: self.kernel,
            params: self.params,
        })
    }
}

/// Trained model bundled with the kernel it was trained with
#[derive(Debug, Clone)]
pub struct TrainedModel<K: Kernel> {
    model: Model,
    kernel: K,
    params: LearningParams,
}

impl<K: Kernel> TrainedModel<K> {
    /// f(x)
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        predict::predict_single(&self.model, x, &self.kernel)
    }

    /// f(x) for every row
    pub fn predict_batch<X: AsRef<[f64]>>(&self, xs: &[X]) -> Result<Vec<f64>> {
        predict::predict_batch(&self.model, xs, &self.kernel)
    }

    /// f(x) for every row of a dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<f64>> {
        let samples = dataset.samples();
        let rows: Vec<&[f64]> = samples.iter().map(|s| s.features.as_slice()).collect();
        self.predict_batch(&rows)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<f64>> {
        let dataset = match self.model.task() {
            Task::NoveltyDetection => CSVDataset::from_file_unlabeled(path)?,
            Task::Regression | Task::Classification => CSVDataset::from_file(path)?,
        };
        self.predict_dataset(&dataset)
    }

    /// Thresholded prediction of a classification model
    pub fn classify(&self, x: &[f64]) -> Result<Prediction> {
        predict::classify(&self.model, x, &self.kernel)
    }

    /// Whether `x` is novel under a novelty-detection model
    pub fn is_novel(&self, x: &[f64]) -> Result<bool> {
        predict::is_novel(&self.model, x, &self.kernel)
    }

    /// Fraction of samples whose sign of f(x) matches the label
    pub fn accuracy<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        if dataset.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        let samples = dataset.samples();
        let mut correct = 0;
        for sample in &samples {
            if self.classify(&sample.features)?.label == sample.label {
                correct += 1;
            }
        }
        Ok(correct as f64 / samples.len() as f64)
    }

    /// Evaluate accuracy from CSV file
    pub fn accuracy_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.accuracy(&dataset)
    }

    /// Mean |y - f(x)| over a dataset
    pub fn mean_absolute_error<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        if dataset.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        let samples = dataset.samples();
        let mut total = 0.0;
        for sample in &samples {
            total += (sample.label - self.predict(&sample.features)?).abs();
        }
        Ok(total / samples.len() as f64)
    }

    /// Save as a single-model file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ModelFile::from_models(std::slice::from_ref(&self.model), self.params)?.save_to_file(path)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

/// Ensemble of partition models bundled with their shared kernel
#[derive(Debug, Clone)]
pub struct TrainedEnsemble<K: Kernel> {
    ensemble: Ensemble,
    kernel: K,
    params: LearningParams,
}

impl<K: Kernel> TrainedEnsemble<K> {
    /// Per-model values followed by their average
    pub fn predict(&self, x: &[f64]) -> Result<Vec<(EnsembleLabel, f64)>> {
        self.ensemble.predict(x, &self.kernel)
    }

    /// Average over all models
    pub fn predict_mean(&self, x: &[f64]) -> Result<f64> {
        self.ensemble.predict_mean(x, &self.kernel)
    }

    /// Save every member in one file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ModelFile::from_models(self.ensemble.models(), self.params)?.save_to_file(path)
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a dot-product classifier on CSV data with default parameters
    pub fn classify_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<KernelFunction>> {
        OnlineSVM::classification().train_from_csv(path)
    }

    /// Train a dot-product regressor on CSV data with default parameters
    pub fn regress_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<KernelFunction>> {
        OnlineSVM::regression().train_from_csv(path)
    }

    /// Train a Gaussian novelty detector on unlabelled CSV data
    pub fn novelty_csv<P: AsRef<Path>>(
        path: P,
        gamma: f64,
    ) -> Result<TrainedModel<KernelFunction>> {
        OnlineSVM::novelty_detection()
            .with_kernel(KernelFunction::gaussian(gamma)?)
            .train_from_csv(path)
    }

    /// Quick evaluation: train a classifier on one file, report accuracy on another
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = classify_csv(train_path)?;
        model.accuracy_from_csv(test_path)
    }
}
