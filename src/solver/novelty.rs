//! Novelty detection update (online one-class SVM)

use crate::core::{LearningParams, Result, StepOutcome, Task};
use crate::kernel::Kernel;
use crate::model::Model;
use crate::solver::{check_finite, current_rate, predict_for_update, UpdateRule, MIN_RHO};
use log::trace;

/// Unsupervised rule: points scoring below rho are novel and get stored
///
/// Admission leaves rho unchanged; every other example lowers it by
/// `eta * nu`, never below [`MIN_RHO`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoveltyRule {
    params: LearningParams,
}

impl NoveltyRule {
    /// Create the rule, rejecting out-of-range parameters
    pub fn new(params: LearningParams) -> Result<Self> {
        params.validate(Task::NoveltyDetection)?;
        Ok(Self { params })
    }
}

impl UpdateRule for NoveltyRule {
    type Example = [f64];

    fn task(&self) -> Task {
        Task::NoveltyDetection
    }

    fn params(&self) -> &LearningParams {
        &self.params
    }

    fn step<K: Kernel + ?Sized>(
        &self,
        model: &mut Model,
        kernel: &K,
        example: &[f64],
    ) -> Result<StepOutcome> {
        let score = check_finite("novelty score", predict_for_update(model, kernel, example)?)?;

        let eta = current_rate(&self.params, model);
        let nu = self.params.nu;

        let admitted = model.support_vectors.is_empty() || score < model.stats.rho;

        if admitted {
            model.support_vectors.append(eta, example.to_vec())?;
            model.stats.cumulative_error += 1.0;
        } else {
            model.stats.rho = (model.stats.rho - eta * nu).max(MIN_RHO);
        }
        model.stats.observation_count += 1;

        trace!(
            "novelty step {}: score={score:.6}, admitted={admitted}, rho={:.6}",
            model.stats.observation_count,
            model.stats.rho
        );

        Ok(StepOutcome {
            prediction: score,
            loss: score,
            admitted,
        })
    }
}
