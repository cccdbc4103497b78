//! Progressive lowering strategies.
//!
//! A strategy is an ordered list of transformation steps (tile, fuse, pad,
//! decompose, peel, vectorize, lower vectors) applied to named operations.
//! [`CodegenStrategy`] builds it, [`StrategyPipeline::configure_pipeline`]
//! registers it on a host [`PassPipeline`] as marker-chained stages, and
//! [`StrategyRunner`] executes such a stage list against a [`PayloadIr`].
//!
//! [`PayloadIr`]: crate::core::PayloadIr

pub mod builder;
pub mod emitter;
pub mod options;
pub mod pipeline;
pub mod runner;
pub mod transformation;

pub use builder::CodegenStrategy;
pub use emitter::{CleanupStage, PassPipeline, Stage, StagePipeline, TransformStage};
pub use options::{
    EnablingOptions, FusionScope, LoopType, PadValue, PaddingOptions, PeelOptions,
    TileAndFuseOptions, TilingOptions, VectorLoweringOptions, VectorizationOptions,
};
pub use pipeline::StrategyPipeline;
pub use runner::{Application, RunReport, StrategyRunner};
pub use transformation::{Transformation, TransformationKind, TransformationStep};
