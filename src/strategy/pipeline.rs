//! Ordered strategy produced by [`CodegenStrategy`](super::builder::CodegenStrategy).

use super::options::EnablingOptions;
use super::transformation::TransformationStep;

/// Transformation steps in append order plus the pipeline-wide enabling
/// options. Step order is the lowering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyPipeline {
    steps: Vec<TransformationStep>,
    enabling_options: EnablingOptions,
}

impl StrategyPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_step(&mut self, step: TransformationStep) {
        self.steps.push(step);
    }

    pub(crate) fn set_enabling_options(&mut self, options: EnablingOptions) {
        self.enabling_options = options;
    }

    pub fn steps(&self) -> &[TransformationStep] {
        &self.steps
    }

    pub fn enabling_options(&self) -> &EnablingOptions {
        &self.enabling_options
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
