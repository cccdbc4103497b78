// This module defines the closed set of transformation kinds a strategy can sequence. The
// Transformation enum carries one option record per kind and is pattern-matched wherever a
// kind needs specific handling (stage emission, execution, rendering), so adding a kind means
// touching the enum, the builder and those matches together. TransformationStep is one
// appended entry of a strategy: the transformation, the optional target operation name and
// the optional caller predicate. Steps are immutable once built; their fields are private.

//! Transformation kinds and strategy steps.

use std::fmt;
use std::sync::Arc;

use super::options::{
    PaddingOptions, PeelOptions, TileAndFuseOptions, TilingOptions, VectorLoweringOptions,
    VectorizationOptions,
};
use crate::core::marker::OpPredicate;

/// Field-less discriminant of [`Transformation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformationKind {
    Tile,
    TileAndFuse,
    Pad,
    Decompose,
    Peel,
    Vectorize,
    VectorLowering,
}

impl TransformationKind {
    pub const fn name(self) -> &'static str {
        match self {
            TransformationKind::Tile => "tile",
            TransformationKind::TileAndFuse => "tile-and-fuse",
            TransformationKind::Pad => "pad",
            TransformationKind::Decompose => "decompose",
            TransformationKind::Peel => "peel",
            TransformationKind::Vectorize => "vectorize",
            TransformationKind::VectorLowering => "vector-lowering",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parameterized rewrite.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    Tile(TilingOptions),
    TileAndFuse(TileAndFuseOptions),
    Pad(PaddingOptions),
    /// Decompose higher-dimensional convolutions into lower-dimensional ones.
    Decompose,
    Peel(PeelOptions),
    Vectorize(VectorizationOptions),
    VectorLowering(VectorLoweringOptions),
}

impl Transformation {
    pub fn kind(&self) -> TransformationKind {
        match self {
            Transformation::Tile(_) => TransformationKind::Tile,
            Transformation::TileAndFuse(_) => TransformationKind::TileAndFuse,
            Transformation::Pad(_) => TransformationKind::Pad,
            Transformation::Decompose => TransformationKind::Decompose,
            Transformation::Peel(_) => TransformationKind::Peel,
            Transformation::Vectorize(_) => TransformationKind::Vectorize,
            Transformation::VectorLowering(_) => TransformationKind::VectorLowering,
        }
    }

    /// Short rendering of the options, used in pipeline dumps.
    pub fn describe_options(&self) -> String {
        match self {
            Transformation::Tile(o) => {
                let mut s = format!("sizes={:?}", o.tile_sizes);
                if !o.interchange.is_empty() {
                    s.push_str(&format!(" interchange={:?}", o.interchange));
                }
                s.push_str(&format!(" loops={:?}", o.loop_type));
                if !o.peeled_loops.is_empty() {
                    s.push_str(&format!(" peel={:?}", o.peeled_loops));
                }
                s
            }
            Transformation::TileAndFuse(o) => {
                let mut s = format!("sizes={:?}", o.tile_sizes);
                if !o.tile_interchange.is_empty() {
                    s.push_str(&format!(" interchange={:?}", o.tile_interchange));
                }
                s.push_str(&format!(" scope={:?}", o.scope));
                s
            }
            Transformation::Pad(o) => format!(
                "values={:?} hoist={:?}",
                o.padding_values, o.hoist_depths
            ),
            Transformation::Decompose => String::new(),
            Transformation::Peel(o) => format!("loops={:?}", o.loops_to_peel),
            Transformation::Vectorize(o) => format!("pad={}", o.vectorize_padding),
            Transformation::VectorLowering(o) => format!(
                "contraction={} multi-reduction={} transfer-partial={} transfer-to-scf={} \
                 transfer={} transpose={} shape-cast={} max-rank={}",
                o.contraction_lowering,
                o.multi_reduction_lowering,
                o.transfer_partial_rewrite,
                o.transfer_to_scf_conversion,
                o.transfer_lowering,
                o.transpose_lowering,
                o.shape_cast_lowering,
                o.max_transfer_rank
            ),
        }
    }
}

/// One entry of a strategy, in append order.
#[derive(Clone)]
pub struct TransformationStep {
    transformation: Transformation,
    op_name: Option<String>,
    filter: Option<OpPredicate>,
}

impl TransformationStep {
    /// An empty `op_name` means no name constraint.
    pub fn new(
        transformation: Transformation,
        op_name: Option<&str>,
        filter: Option<OpPredicate>,
    ) -> Self {
        Self {
            transformation,
            op_name: op_name.filter(|n| !n.is_empty()).map(str::to_string),
            filter,
        }
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn kind(&self) -> TransformationKind {
        self.transformation.kind()
    }

    pub fn op_name(&self) -> Option<&str> {
        self.op_name.as_deref()
    }

    pub fn filter(&self) -> Option<&OpPredicate> {
        self.filter.as_ref()
    }
}

impl PartialEq for TransformationStep {
    fn eq(&self, other: &Self) -> bool {
        let same_filter = match (&self.filter, &other.filter) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.transformation == other.transformation && self.op_name == other.op_name && same_filter
    }
}

impl fmt::Debug for TransformationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationStep")
            .field("transformation", &self.transformation)
            .field("op_name", &self.op_name)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::marker::op_predicate;

    #[test]
    fn test_kind_names() {
        assert_eq!(Transformation::Decompose.kind().name(), "decompose");
        assert_eq!(
            Transformation::TileAndFuse(TileAndFuseOptions::default()).kind(),
            TransformationKind::TileAndFuse
        );
        assert_eq!(TransformationKind::VectorLowering.to_string(), "vector-lowering");
    }

    #[test]
    fn test_empty_op_name_is_no_constraint() {
        let step = TransformationStep::new(Transformation::Decompose, Some(""), None);
        assert_eq!(step.op_name(), None);

        let step = TransformationStep::new(
            Transformation::Peel(PeelOptions::default()),
            Some("linalg.matmul"),
            None,
        );
        assert_eq!(step.op_name(), Some("linalg.matmul"));
    }

    #[test]
    fn test_step_equality_tracks_filter_identity() {
        let pred = op_predicate(|_| true);
        let a = TransformationStep::new(Transformation::Decompose, None, Some(pred.clone()));
        let b = TransformationStep::new(Transformation::Decompose, None, Some(pred));
        let c = TransformationStep::new(Transformation::Decompose, None, None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
