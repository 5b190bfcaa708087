//! Accumulator threaded through a sequential scan of training data

use crate::core::{Result, StepOutcome};
use crate::kernel::Kernel;
use crate::model::Model;
use crate::solver::UpdateRule;

/// Running training state: a model under construction plus the rule and
/// kernel that drive it
///
/// Examples must be pushed one at a time; the state is the left fold of
/// `rule.step` over the stream.
#[derive(Debug)]
pub struct ModelState<'k, R, K: ?Sized> {
    rule: R,
    kernel: &'k K,
    model: Model,
}

impl<'k, R: UpdateRule, K: Kernel + ?Sized> ModelState<'k, R, K> {
    /// Start from an empty model
    pub fn new(rule: R, kernel: &'k K) -> Self {
        let model = Model::new(rule.task(), kernel.spec());
        Self {
            rule,
            kernel,
            model,
        }
    }

    /// Process one example
    pub fn push(&mut self, example: &R::Example) -> Result<StepOutcome> {
        self.rule.step(&mut self.model, self.kernel, example)
    }

    /// Fold form of [`ModelState::push`]
    pub fn update(mut self, example: &R::Example) -> Result<Self> {
        self.push(example)?;
        Ok(self)
    }

    /// Model built so far
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Finish training and hand out the model
    pub fn finish(self) -> Model {
        self.model
    }
}
