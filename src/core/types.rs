//! Core type definitions for online kernel machines

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Build a prediction from a raw decision value, thresholding at zero
    pub fn from_decision_value(decision_value: f64) -> Self {
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Self::new(label, decision_value)
    }
}

/// Labelled training example with a dense feature vector
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Feature vector
    pub features: Vec<f64>,
    /// Target value (real-valued for regression, +1/-1 for classification)
    pub label: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: Vec<f64>, label: f64) -> Self {
        Self { features, label }
    }

    /// Dimension of the feature vector
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// Learning task an online model is trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Regression,
    Classification,
    NoveltyDetection,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::Regression => "regression",
            Task::Classification => "classification",
            Task::NoveltyDetection => "novelty_detection",
        };
        f.write_str(name)
    }
}

/// How the learning rate evolves over the training stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningRateSchedule {
    /// eta_t = eta
    #[default]
    Constant,
    /// eta_t = eta / sqrt(t), t being the 1-based index of the example
    InverseSqrt,
}

impl LearningRateSchedule {
    /// Learning rate for the `t`-th example (1-based)
    pub fn rate(&self, eta: f64, t: u64) -> f64 {
        match self {
            LearningRateSchedule::Constant => eta,
            LearningRateSchedule::InverseSqrt => eta / (t.max(1) as f64).sqrt(),
        }
    }
}

/// Hyperparameters of the online update rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Learning rate
    pub eta: f64,
    /// Target fraction of margin errors (controls epsilon/rho adaptation)
    pub nu: f64,
    /// Fraction of each step applied to the regression offset
    pub slambda: f64,
    /// Learning-rate schedule
    #[serde(default)]
    pub schedule: LearningRateSchedule,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            eta: 0.1,
            nu: 0.005,
            slambda: 0.2,
            schedule: LearningRateSchedule::Constant,
        }
    }
}

impl LearningParams {
    /// Check that every parameter used by `task` lies in (0, 1]
    ///
    /// `slambda` only drives regression and is ignored for the other tasks.
    pub fn validate(&self, task: Task) -> Result<()> {
        check_unit_interval("eta", self.eta)?;
        check_unit_interval("nu", self.nu)?;
        if task == Task::Regression {
            check_unit_interval("slambda", self.slambda)?;
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SVMError::InvalidParameter(format!(
            "{name} must lie in (0, 1], got: {value}"
        )))
    }
}

/// What a single update step observed and decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// f(x) on the state before the update
    pub prediction: f64,
    /// Task-specific loss signal (error, margin or score)
    pub loss: f64,
    /// Whether the example became a support vector
    pub admitted: bool,
}
