//! Fluent strategy construction.
//!
//! [`CodegenStrategy`] accumulates transformation steps in call order. Every
//! appending method returns `&mut Self` so calls chain; the `..._if` forms
//! append only when their flag is set and are otherwise a no-op.
//!
//! ```ignore
//! let mut strategy = CodegenStrategy::new();
//! strategy
//!     .tile("linalg.matmul", TilingOptions::default().set_tile_sizes(vec![8, 32, 16]), None)
//!     .pad_if(pad, "linalg.matmul", PaddingOptions::default(), None)
//!     .vectorize("linalg.matmul", VectorizationOptions::default(), None)
//!     .vector_lowering(VectorLoweringOptions::default().enable_contraction_lowering(true));
//! strategy.configure_pipeline(&mut pm, &context, true);
//! ```

use super::emitter::PassPipeline;
use super::options::{
    EnablingOptions, PaddingOptions, PeelOptions, TileAndFuseOptions, TilingOptions,
    VectorLoweringOptions, VectorizationOptions,
};
use super::pipeline::StrategyPipeline;
use super::transformation::{Transformation, TransformationStep};
use crate::core::context::StrategyContext;
use crate::core::marker::OpPredicate;

/// Builder controlling how an op is progressively lowered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodegenStrategy {
    pipeline: StrategyPipeline,
}

impl CodegenStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        transformation: Transformation,
        op_name: Option<&str>,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        let step = TransformationStep::new(transformation, op_name, filter);
        log::trace!(
            "strategy step {}: {} on {}",
            self.pipeline.len(),
            step.kind(),
            step.op_name().unwrap_or("<any>")
        );
        self.pipeline.push_step(step);
        self
    }

    /// Append a level of tiling for op `op_name`.
    pub fn tile(
        &mut self,
        op_name: &str,
        options: TilingOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        self.push(Transformation::Tile(options), Some(op_name), filter)
    }

    pub fn tile_if(
        &mut self,
        enabled: bool,
        op_name: &str,
        options: TilingOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        if enabled {
            self.tile(op_name, options, filter)
        } else {
            self
        }
    }

    /// Append tiling of op `op_name` with fusion of its neighbours.
    pub fn tile_and_fuse(
        &mut self,
        op_name: &str,
        options: TileAndFuseOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        self.push(Transformation::TileAndFuse(options), Some(op_name), filter)
    }

    pub fn tile_and_fuse_if(
        &mut self,
        enabled: bool,
        op_name: &str,
        options: TileAndFuseOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        if enabled {
            self.tile_and_fuse(op_name, options, filter)
        } else {
            self
        }
    }

    /// Append padding and hoisting of the operands of op `op_name`.
    pub fn pad(
        &mut self,
        op_name: &str,
        options: PaddingOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        self.push(Transformation::Pad(options), Some(op_name), filter)
    }

    pub fn pad_if(
        &mut self,
        enabled: bool,
        op_name: &str,
        options: PaddingOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        if enabled {
            self.pad(op_name, options, filter)
        } else {
            self
        }
    }

    /// Append convolution decomposition.
    pub fn decompose(&mut self, filter: Option<OpPredicate>) -> &mut Self {
        self.push(Transformation::Decompose, None, filter)
    }

    pub fn decompose_if(&mut self, enabled: bool, filter: Option<OpPredicate>) -> &mut Self {
        if enabled {
            self.decompose(filter)
        } else {
            self
        }
    }

    /// Append peeling of the loops around op `op_name`.
    pub fn peel(
        &mut self,
        op_name: &str,
        options: PeelOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        self.push(Transformation::Peel(options), Some(op_name), filter)
    }

    pub fn peel_if(
        &mut self,
        enabled: bool,
        op_name: &str,
        options: PeelOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        if enabled {
            self.peel(op_name, options, filter)
        } else {
            self
        }
    }

    /// Append rewriting of op `op_name` as a vector operation.
    pub fn vectorize(
        &mut self,
        op_name: &str,
        options: VectorizationOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        self.push(Transformation::Vectorize(options), Some(op_name), filter)
    }

    pub fn vectorize_if(
        &mut self,
        enabled: bool,
        op_name: &str,
        options: VectorizationOptions,
        filter: Option<OpPredicate>,
    ) -> &mut Self {
        if enabled {
            self.vectorize(op_name, options, filter)
        } else {
            self
        }
    }

    /// Append lowering of all vector operations.
    pub fn vector_lowering(&mut self, options: VectorLoweringOptions) -> &mut Self {
        self.push(Transformation::VectorLowering(options), None, None)
    }

    /// Replace the enabling options applied by the cleanup stages.
    pub fn set_global_enabling_options(&mut self, options: EnablingOptions) -> &mut Self {
        self.pipeline.set_enabling_options(options);
        self
    }

    pub fn steps(&self) -> &[TransformationStep] {
        self.pipeline.steps()
    }

    pub fn enabling_options(&self) -> &EnablingOptions {
        self.pipeline.enabling_options()
    }

    pub fn len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    pub fn pipeline(&self) -> &StrategyPipeline {
        &self.pipeline
    }

    /// Snapshot of the steps appended so far.
    pub fn build(&self) -> StrategyPipeline {
        self.pipeline.clone()
    }

    pub fn into_pipeline(self) -> StrategyPipeline {
        self.pipeline
    }

    /// Emit the strategy onto `pm`; see [`StrategyPipeline::configure_pipeline`].
    pub fn configure_pipeline<'ctx, P>(
        &self,
        pm: &mut P,
        context: &StrategyContext<'ctx>,
        add_cleanup_stages: bool,
    ) where
        P: PassPipeline<'ctx> + ?Sized,
    {
        self.pipeline.configure_pipeline(pm, context, add_cleanup_stages);
    }
}
