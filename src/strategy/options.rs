//! Option records carried by transformation steps.
//!
//! Each record holds exactly what its rewrite needs. Nothing here is
//! validated: an inconsistent record (say, an interchange that is not a
//! permutation of the tile sizes) is handed through untouched and left to the
//! rewrite that consumes it.

/// Loop construct produced by tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopType {
    #[default]
    Loops,
    ParallelLoops,
}

/// Options for one level of tiling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TilingOptions {
    /// Tile size per loop; 0 leaves the loop untiled.
    pub tile_sizes: Vec<i64>,
    /// Permutation applied to the tiled loops.
    pub interchange: Vec<u32>,
    pub loop_type: LoopType,
    /// Tiled loops to peel right after tiling.
    pub peeled_loops: Vec<i64>,
}

impl TilingOptions {
    pub fn set_tile_sizes(mut self, sizes: impl Into<Vec<i64>>) -> Self {
        self.tile_sizes = sizes.into();
        self
    }

    pub fn set_interchange(mut self, interchange: impl Into<Vec<u32>>) -> Self {
        self.interchange = interchange.into();
        self
    }

    pub fn set_loop_type(mut self, loop_type: LoopType) -> Self {
        self.loop_type = loop_type;
        self
    }

    pub fn set_peeled_loops(mut self, loops: impl Into<Vec<i64>>) -> Self {
        self.peeled_loops = loops.into();
        self
    }
}

/// Which neighbours of the tiled op are fused into the tile loop nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionScope {
    #[default]
    Producers,
    ProducersAndConsumers,
}

/// Options for tiling an op and fusing its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileAndFuseOptions {
    pub tile_sizes: Vec<i64>,
    pub tile_interchange: Vec<i64>,
    pub scope: FusionScope,
}

impl TileAndFuseOptions {
    pub fn set_tile_sizes(mut self, sizes: impl Into<Vec<i64>>) -> Self {
        self.tile_sizes = sizes.into();
        self
    }

    pub fn set_tile_interchange(mut self, interchange: impl Into<Vec<i64>>) -> Self {
        self.tile_interchange = interchange.into();
        self
    }

    pub fn set_scope(mut self, scope: FusionScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Value used to fill padded regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadValue {
    Int(i64),
    Float(f64),
}

impl Default for PadValue {
    fn default() -> Self {
        PadValue::Int(0)
    }
}

/// Options for padding (and hoisting the padding of) an op's operands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaddingOptions {
    /// One value per operand.
    pub padding_values: Vec<PadValue>,
    pub padding_dimensions: Vec<i64>,
    /// Per operand: keep the pad even when it is statically a no-op.
    pub nofold_flags: Vec<bool>,
    /// Per operand: number of enclosing loops to hoist the pad out of.
    pub hoist_depths: Vec<u32>,
}

impl PaddingOptions {
    pub fn set_padding_values(mut self, values: impl Into<Vec<PadValue>>) -> Self {
        self.padding_values = values.into();
        self
    }

    pub fn set_padding_dimensions(mut self, dims: impl Into<Vec<i64>>) -> Self {
        self.padding_dimensions = dims.into();
        self
    }

    pub fn set_nofold_flags(mut self, flags: impl Into<Vec<bool>>) -> Self {
        self.nofold_flags = flags.into();
        self
    }

    pub fn set_hoist_depths(mut self, depths: impl Into<Vec<u32>>) -> Self {
        self.hoist_depths = depths.into();
        self
    }
}

/// Options for peeling partial iterations off tiled loops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeelOptions {
    pub loops_to_peel: Vec<i64>,
}

impl PeelOptions {
    pub fn set_loops_to_peel(mut self, loops: impl Into<Vec<i64>>) -> Self {
        self.loops_to_peel = loops.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VectorizationOptions {
    /// Also vectorize pad ops feeding the vectorized op.
    pub vectorize_padding: bool,
}

impl VectorizationOptions {
    pub fn set_vectorize_padding(mut self, enable: bool) -> Self {
        self.vectorize_padding = enable;
        self
    }
}

/// Toggles for the vector lowering stages, applied in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorLoweringOptions {
    pub contraction_lowering: bool,
    pub multi_reduction_lowering: bool,
    pub transfer_partial_rewrite: bool,
    pub transfer_to_scf_conversion: bool,
    pub transfer_lowering: bool,
    pub transpose_lowering: bool,
    pub shape_cast_lowering: bool,
    pub max_transfer_rank: u32,
    pub unroll_vector_transfers: bool,
}

impl Default for VectorLoweringOptions {
    fn default() -> Self {
        Self {
            contraction_lowering: false,
            multi_reduction_lowering: false,
            transfer_partial_rewrite: false,
            transfer_to_scf_conversion: false,
            transfer_lowering: true,
            transpose_lowering: false,
            shape_cast_lowering: true,
            max_transfer_rank: 1,
            unroll_vector_transfers: true,
        }
    }
}

impl VectorLoweringOptions {
    pub fn enable_contraction_lowering(mut self, enable: bool) -> Self {
        self.contraction_lowering = enable;
        self
    }

    pub fn enable_multi_reduction_lowering(mut self, enable: bool) -> Self {
        self.multi_reduction_lowering = enable;
        self
    }

    pub fn enable_transfer_partial_rewrite(mut self, enable: bool) -> Self {
        self.transfer_partial_rewrite = enable;
        self
    }

    pub fn enable_transfer_to_scf_conversion(mut self, enable: bool) -> Self {
        self.transfer_to_scf_conversion = enable;
        self
    }

    pub fn enable_transfer_lowering(mut self, enable: bool) -> Self {
        self.transfer_lowering = enable;
        self
    }

    pub fn enable_transpose_lowering(mut self, enable: bool) -> Self {
        self.transpose_lowering = enable;
        self
    }

    pub fn enable_shape_cast_lowering(mut self, enable: bool) -> Self {
        self.shape_cast_lowering = enable;
        self
    }

    pub fn set_max_transfer_rank(mut self, rank: u32) -> Self {
        self.max_transfer_rank = rank;
        self
    }

    pub fn set_unroll_vector_transfers(mut self, enable: bool) -> Self {
        self.unroll_vector_transfers = enable;
        self
    }
}

/// Pipeline-wide enabling transformations applied by the cleanup group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnablingOptions {
    /// Loop invariant code motion.
    pub licm: bool,
    pub hoist_redundant_vector_transfers: bool,
    pub hoist_redundant_vector_transfers_on_tensor: bool,
}

impl Default for EnablingOptions {
    fn default() -> Self {
        Self {
            licm: true,
            hoist_redundant_vector_transfers: true,
            hoist_redundant_vector_transfers_on_tensor: true,
        }
    }
}

impl EnablingOptions {
    pub fn enable_licm(mut self, enable: bool) -> Self {
        self.licm = enable;
        self
    }

    pub fn enable_hoist_redundant_vector_transfers(mut self, enable: bool) -> Self {
        self.hoist_redundant_vector_transfers = enable;
        self
    }

    pub fn enable_hoist_redundant_vector_transfers_on_tensor(mut self, enable: bool) -> Self {
        self.hoist_redundant_vector_transfers_on_tensor = enable;
        self
    }
}
