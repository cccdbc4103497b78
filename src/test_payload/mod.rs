//! Test payload IR for exercising strategies without a real compiler.
//!
//! The format is a flat list of operations, one per line:
//!
//! ```text
//! ; Comments start with semicolon
//! %init = linalg.fill
//! %acc = linalg.matmul
//! linalg.yield
//! ```
//!
//! [`TestPayload`] implements [`PayloadIr`] with deterministic stand-in
//! rewrites: tiling replaces an op with a fresh copy (as a real tiling would
//! create a new op inside the loop nest), vectorization renames the op to
//! `vector.contract`, dead code elimination drops erased ops, and every other
//! kind rewrites in place. Each action is appended to [`TestPayload::log`].
//! Failures can be injected per kind and op name.

use std::fmt;

use crate::core::adaptor::PayloadIr;
use crate::core::error::RewriteError;
use crate::core::marker::OpId;
use crate::strategy::emitter::{CleanupStage, TransformStage};
use crate::strategy::transformation::TransformationKind;

pub mod parser;

/// Name vectorized ops are renamed to.
pub const VECTORIZED_OP_NAME: &str = "vector.contract";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadOp {
    pub id: OpId,
    /// SSA result name without the `%`, if the op has one.
    pub result: Option<String>,
    pub name: String,
    pub erased: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPayload {
    pub ops: Vec<PayloadOp>,
    pub log: Vec<String>,
    failures: Vec<(TransformationKind, String)>,
    next_id: u32,
}

impl TestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a payload from its textual form.
    pub fn parse(text: &str) -> Result<Self, String> {
        parser::parse_payload(text)
    }

    /// Append an operation and return its id.
    pub fn push_op(&mut self, result: Option<&str>, name: &str) -> OpId {
        let id = OpId(self.next_id);
        self.next_id += 1;
        self.ops.push(PayloadOp {
            id,
            result: result.map(str::to_string),
            name: name.to_string(),
            erased: false,
        });
        id
    }

    /// Make every `kind` rewrite of ops named `op_name` fail.
    pub fn fail_on(&mut self, kind: TransformationKind, op_name: &str) -> &mut Self {
        self.failures.push((kind, op_name.to_string()));
        self
    }

    pub fn op(&self, id: OpId) -> Option<&PayloadOp> {
        self.ops.iter().find(|op| op.id == id)
    }

    /// Id of the live op with the given result name.
    pub fn find(&self, result: &str) -> Option<OpId> {
        self.ops
            .iter()
            .find(|op| !op.erased && op.result.as_deref() == Some(result))
            .map(|op| op.id)
    }

    fn op_mut(&mut self, id: OpId) -> Result<&mut PayloadOp, RewriteError> {
        self.ops
            .iter_mut()
            .find(|op| op.id == id && !op.erased)
            .ok_or_else(|| RewriteError::new(format!("operation {} is not live", id)))
    }

    /// Render the payload, one op per line.
    pub fn print(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TestPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Printing payload")?;
        for op in self.ops.iter().filter(|op| !op.erased) {
            match &op.result {
                Some(result) => writeln!(f, "  %{} = {}", result, op.name)?,
                None => writeln!(f, "  {}", op.name)?,
            }
        }
        Ok(())
    }
}

impl PayloadIr for TestPayload {
    fn ops(&self) -> Vec<OpId> {
        self.ops.iter().filter(|op| !op.erased).map(|op| op.id).collect()
    }

    fn op_name(&self, op: OpId) -> Option<&str> {
        self.ops
            .iter()
            .find(|o| o.id == op && !o.erased)
            .map(|o| o.name.as_str())
    }

    fn apply_transform(
        &mut self,
        op: OpId,
        stage: &TransformStage<'_>,
    ) -> Result<Vec<OpId>, RewriteError> {
        let kind = stage.kind();
        let current = self.op_mut(op)?;
        let name = current.name.clone();

        if self.failures.iter().any(|(k, n)| *k == kind && *n == name) {
            return Err(RewriteError::new(format!("{} failed on {} ({})", kind, op, name)));
        }

        match kind {
            TransformationKind::Tile | TransformationKind::TileAndFuse => {
                let current = self.op_mut(op)?;
                current.erased = true;
                let result = current.result.clone();
                let tiled = self.push_op(result.as_deref(), &name);
                self.log.push(format!("{} {} -> {}", kind, op, tiled));
                Ok(vec![tiled])
            }
            TransformationKind::Vectorize => {
                self.op_mut(op)?.name = VECTORIZED_OP_NAME.to_string();
                self.log.push(format!("{} {}", kind, op));
                Ok(vec![op])
            }
            TransformationKind::Pad
            | TransformationKind::Decompose
            | TransformationKind::Peel
            | TransformationKind::VectorLowering => {
                self.log.push(format!("{} {}", kind, op));
                Ok(vec![op])
            }
        }
    }

    fn apply_cleanup(&mut self, stage: &CleanupStage) -> Result<(), RewriteError> {
        if let CleanupStage::DeadCodeElimination = stage {
            self.ops.retain(|op| !op.erased);
        }
        self.log.push(stage.name().to_string());
        Ok(())
    }
}
