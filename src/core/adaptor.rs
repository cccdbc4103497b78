// This module defines the PayloadIr trait, the bridge between emitted stages and whatever IR
// the host compiler transforms. The trait is deliberately small: enumerate live operations in
// program order, report an operation's name, apply one transformation to one operation, and
// apply one cleanup stage to the whole payload. Rewrites return the operations that now hold
// the result (the rewritten op itself, or the ops that replaced it) so the runner can mark
// them; a rewrite reports failure with a RewriteError, which aborts the run unchanged. The
// rewrite algorithms themselves (tiling, fusion legality, vectorization) live behind this
// trait and are not part of this crate.

//! Payload IR adaptor.
//!
//! The adaptor is the glue between emitted stages and the host's IR. The
//! runner assumes:
//! - Operations have stable [`OpId`]s for the duration of a run.
//! - `ops` lists live operations; erased operations disappear from it.
//! - A rewrite reports the ids of the operations that carry its result.

use super::error::RewriteError;
use super::marker::OpId;
use crate::strategy::emitter::{CleanupStage, TransformStage};

/// Bridge between emitted stages and a host IR.
pub trait PayloadIr {
    /// Live operations in program order.
    fn ops(&self) -> Vec<OpId>;

    /// Name of a live operation, `None` once it was erased.
    fn op_name(&self, op: OpId) -> Option<&str>;

    /// Apply `stage`'s transformation to `op`.
    ///
    /// Returns the operations holding the result; each one receives the
    /// stage's marker.
    fn apply_transform(
        &mut self,
        op: OpId,
        stage: &TransformStage<'_>,
    ) -> Result<Vec<OpId>, RewriteError>;

    /// Apply a cleanup stage to the whole payload.
    fn apply_cleanup(&mut self, stage: &CleanupStage) -> Result<(), RewriteError>;
}
