// This module lowers a StrategyPipeline onto a host pass pipeline. PassPipeline is the one
// capability required of the host pass manager: append one parameterized stage. For every
// step, in order, configure_pipeline emits exactly one Stage::Transform whose MarkerFilter
// chains it to the previous stage: stage k only accepts operations carrying the marker of
// stage k-1 and never operations already carrying its own marker, while stage 0 accepts
// only operations without any marker of the context's namespace. Re-entering a stage list
// is therefore a no-op on operations any of its stages produced or processed. The
// step's target name and caller predicate are ANDed into that filter. When cleanup is
// requested, a fixed group follows the last transform: canonicalization, dead code
// elimination, then the enabling transformations configured on the strategy. The emitter
// never reorders or merges stages. StagePipeline is an in-memory PassPipeline used for
// inspection, logging and by the reference StrategyRunner.

//! Stage emission onto a host pass pipeline.

use std::fmt;

use super::options::EnablingOptions;
use super::pipeline::StrategyPipeline;
use super::transformation::{Transformation, TransformationKind};
use crate::core::context::StrategyContext;
use crate::core::marker::{Marker, MarkerFilter};

/// One transformation step as registered on the host pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStage<'ctx> {
    /// Position of the originating step in the strategy.
    pub index: usize,
    pub transformation: Transformation,
    pub op_name: Option<&'ctx str>,
    pub filter: MarkerFilter<'ctx>,
    /// Marker written on every operation this stage processes.
    pub marker: Marker<'ctx>,
}

impl TransformStage<'_> {
    pub fn kind(&self) -> TransformationKind {
        self.transformation.kind()
    }
}

/// Post-processing stages appended after the transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStage {
    Canonicalize,
    DeadCodeElimination,
    Enable(EnablingOptions),
}

impl CleanupStage {
    pub const fn name(&self) -> &'static str {
        match self {
            CleanupStage::Canonicalize => "canonicalize",
            CleanupStage::DeadCodeElimination => "dce",
            CleanupStage::Enable(_) => "enable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage<'ctx> {
    Transform(TransformStage<'ctx>),
    Cleanup(CleanupStage),
}

impl Stage<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Transform(t) => t.kind().name(),
            Stage::Cleanup(c) => c.name(),
        }
    }
}

impl fmt::Display for Stage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transform(t) => {
                write!(f, "{}{{", t.kind())?;
                let options = t.transformation.describe_options();
                if !options.is_empty() {
                    write!(f, "{} ", options)?;
                }
                write!(f, "filter=[{}] marker={}}}", t.filter, t.marker)
            }
            Stage::Cleanup(CleanupStage::Enable(o)) => write!(
                f,
                "enable{{licm={} hoist-transfers={} hoist-transfers-on-tensor={}}}",
                o.licm, o.hoist_redundant_vector_transfers, o.hoist_redundant_vector_transfers_on_tensor
            ),
            Stage::Cleanup(c) => f.write_str(c.name()),
        }
    }
}

/// Host pass pipeline capability needed by the emitter.
pub trait PassPipeline<'ctx> {
    /// Append one stage at the end of the pipeline.
    fn add_stage(&mut self, stage: Stage<'ctx>);
}

/// In-memory pass pipeline recording stages in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePipeline<'ctx> {
    stages: Vec<Stage<'ctx>>,
}

impl<'ctx> StagePipeline<'ctx> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stages(&self) -> &[Stage<'ctx>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Transform stages only, in order.
    pub fn transform_stages(&self) -> impl Iterator<Item = &TransformStage<'ctx>> {
        self.stages.iter().filter_map(|s| match s {
            Stage::Transform(t) => Some(t),
            Stage::Cleanup(_) => None,
        })
    }
}

impl<'ctx> PassPipeline<'ctx> for StagePipeline<'ctx> {
    fn add_stage(&mut self, stage: Stage<'ctx>) {
        self.stages.push(stage);
    }
}

impl<'ctx> PassPipeline<'ctx> for Vec<Stage<'ctx>> {
    fn add_stage(&mut self, stage: Stage<'ctx>) {
        self.push(stage);
    }
}

impl fmt::Display for StagePipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            writeln!(f, "  {:>2}: {}", i, stage)?;
        }
        Ok(())
    }
}

impl StrategyPipeline {
    /// Register every step as a stage on `pm`, in step order.
    ///
    /// With `add_cleanup_stages`, canonicalization, dead code elimination and
    /// the enabling transformations follow the last transform so the IR is
    /// left canonical and a later strategy can run on it.
    pub fn configure_pipeline<'ctx, P>(
        &self,
        pm: &mut P,
        context: &StrategyContext<'ctx>,
        add_cleanup_stages: bool,
    ) where
        P: PassPipeline<'ctx> + ?Sized,
    {
        for (index, step) in self.steps().iter().enumerate() {
            let marker = context.marker(index);

            // Stage 0 takes only ops no stage of this strategy has touched.
            let mut filter = if index == 0 {
                MarkerFilter::new().exclude_namespace(context.namespace())
            } else {
                MarkerFilter::new()
                    .require_marker(context.marker(index - 1))
                    .exclude_marker(marker)
            };

            let op_name = step.op_name().map(|name| context.intern_str(name));
            if let Some(name) = op_name {
                filter = filter.with_op_name(name);
            }
            if let Some(predicate) = step.filter() {
                filter = filter.with_predicate(predicate.clone());
            }

            let stage = Stage::Transform(TransformStage {
                index,
                transformation: step.transformation().clone(),
                op_name,
                filter,
                marker,
            });
            log::debug!("emitting stage {}: {}", index, stage);
            pm.add_stage(stage);
        }

        if add_cleanup_stages {
            for cleanup in [
                CleanupStage::Canonicalize,
                CleanupStage::DeadCodeElimination,
                CleanupStage::Enable(*self.enabling_options()),
            ] {
                log::debug!("emitting cleanup stage: {}", cleanup.name());
                pm.add_stage(Stage::Cleanup(cleanup));
            }
        }
    }
}
