// This module gathers the infrastructure shared by strategy emission and execution: the
// arena-backed StrategyContext that owns marker identities and interned operation names,
// the marker machinery (Marker, the insert-only MarkerTable threaded alongside the payload
// IR, and the MarkerFilter predicate stages consult per operation), the PayloadIr adaptor
// trait through which a host IR is transformed, and the crate's error types.

//! Core strategy infrastructure.
//!
//! # Key Components
//!
//! ## Context (`context`)
//! - Arena-based interning using `bumpalo`
//! - Marker identities scoped by a namespace
//!
//! ## Markers (`marker`)
//! - Explicit `(operation, marker)` table instead of IR attributes
//! - Filters ANDing marker, name and predicate constraints
//!
//! ## Payload adaptor (`adaptor`)
//! - The minimal IR surface needed to execute stages

pub mod adaptor;
pub mod context;
pub mod error;
pub mod marker;

pub use adaptor::PayloadIr;
pub use context::{StrategyContext, DEFAULT_MARKER_NAMESPACE};
pub use error::{BitcodeError, BitcodeResult, RewriteError, StrategyError, StrategyResult};
pub use marker::{
    op_predicate, Marker, MarkerCondition, MarkerFilter, MarkerTable, OpId, OpPredicate, OpRef,
};
