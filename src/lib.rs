//! codegen-strategy - staged lowering strategies for a tensor compiler backend.
//!
//! A tensor op such as a matmul or a convolution is lowered toward vector
//! code one rewrite at a time: tile, fuse, pad, decompose, peel, vectorize,
//! then lower the vector ops. This crate builds such sequences, registers
//! them on a host pass pipeline as stages that hand operations from one to
//! the next through markers, and picks the precompiled device bitcode that
//! the final artifact links against.
//!
//! # Primary Usage
//!
//! ```ignore
//! use bumpalo::Bump;
//! use codegen_strategy::core::StrategyContext;
//! use codegen_strategy::strategy::{CodegenStrategy, StagePipeline, TilingOptions, VectorizationOptions};
//!
//! let arena = Bump::new();
//! let context = StrategyContext::new(&arena);
//!
//! let mut strategy = CodegenStrategy::new();
//! strategy
//!     .tile("linalg.matmul", TilingOptions::default().set_tile_sizes(vec![8, 32, 16]), None)
//!     .vectorize("linalg.matmul", VectorizationOptions::default(), None);
//!
//! let mut pm = StagePipeline::new();
//! strategy.configure_pipeline(&mut pm, &context, true);
//! ```
//!
//! # Architecture
//!
//! - [`strategy`] - Builder, stage emission and reference execution
//! - [`core`] - Context, markers, payload adaptor and errors
//! - [`llvm`] - Device bitcode selection and patching
//! - [`test_payload`] - Textual payload IR for tests

pub mod core;
pub mod llvm;
pub mod strategy;
pub mod test_payload;

pub use crate::core::{
    op_predicate, BitcodeError, MarkerFilter, MarkerTable, OpId, OpPredicate, OpRef, PayloadIr,
    RewriteError, StrategyContext, StrategyError,
};
pub use crate::llvm::{DeviceBitcodeSelector, StaticCatalog, TargetDescriptor};
pub use crate::strategy::{
    CodegenStrategy, PassPipeline, Stage, StagePipeline, StrategyPipeline, StrategyRunner,
    Transformation, TransformationKind,
};
