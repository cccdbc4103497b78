//! Tests for strategy construction and stage emission.

use bumpalo::Bump;
use codegen_strategy::core::{op_predicate, MarkerFilter, StrategyContext};
use codegen_strategy::strategy::{
    CleanupStage, CodegenStrategy, EnablingOptions, FusionScope, LoopType, PadValue,
    PaddingOptions, PeelOptions, Stage, StagePipeline, TileAndFuseOptions, TilingOptions,
    Transformation, TransformationKind, VectorLoweringOptions, VectorizationOptions,
};

/// Strategy used by most tests: a typical matmul lowering.
fn matmul_strategy() -> CodegenStrategy {
    let mut strategy = CodegenStrategy::new();
    strategy
        .tile_and_fuse(
            "linalg.matmul",
            TileAndFuseOptions::default()
                .set_tile_sizes(vec![64, 64])
                .set_scope(FusionScope::ProducersAndConsumers),
            None,
        )
        .tile(
            "linalg.matmul",
            TilingOptions::default()
                .set_tile_sizes(vec![8, 32, 16])
                .set_interchange(vec![0, 2, 1])
                .set_loop_type(LoopType::ParallelLoops),
            None,
        )
        .pad(
            "linalg.matmul",
            PaddingOptions::default()
                .set_padding_values(vec![PadValue::Float(0.0), PadValue::Float(0.0), PadValue::Int(0)])
                .set_hoist_depths(vec![2, 1, 0]),
            None,
        )
        .peel("linalg.matmul", PeelOptions::default().set_loops_to_peel(vec![0]), None)
        .vectorize(
            "linalg.matmul",
            VectorizationOptions::default().set_vectorize_padding(true),
            None,
        )
        .vector_lowering(
            VectorLoweringOptions::default()
                .enable_contraction_lowering(true)
                .enable_transfer_to_scf_conversion(true),
        );
    strategy
}

fn emit(strategy: &CodegenStrategy, add_cleanup_stages: bool) -> String {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, add_cleanup_stages);
    pm.to_string()
}

#[test]
fn test_tile_then_vectorize_emits_two_stages() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);

    let tiling = TilingOptions::default().set_tile_sizes(vec![4, 8]);
    let vectorization = VectorizationOptions::default();
    let mut strategy = CodegenStrategy::new();
    strategy
        .tile("A", tiling.clone(), None)
        .vectorize("B", vectorization, None);

    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    assert_eq!(pm.len(), 2);
    let stages: Vec<_> = pm.transform_stages().collect();
    assert_eq!(stages[0].transformation, Transformation::Tile(tiling));
    assert_eq!(stages[0].op_name, Some("A"));
    assert_eq!(stages[0].index, 0);
    assert_eq!(stages[1].transformation, Transformation::Vectorize(vectorization));
    assert_eq!(stages[1].op_name, Some("B"));
    assert_eq!(stages[1].index, 1);
}

#[test]
fn test_cleanup_stages_follow_transforms() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut strategy = matmul_strategy();
    let enabling = EnablingOptions::default().enable_licm(false);
    strategy.set_global_enabling_options(enabling);

    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, true);

    assert_eq!(pm.len(), strategy.len() + 3);
    let tail = &pm.stages()[strategy.len()..];
    assert_eq!(
        tail,
        &[
            Stage::Cleanup(CleanupStage::Canonicalize),
            Stage::Cleanup(CleanupStage::DeadCodeElimination),
            Stage::Cleanup(CleanupStage::Enable(enabling)),
        ]
    );
}

#[test]
fn test_stage_order_matches_step_order() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let strategy = matmul_strategy();

    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    let emitted: Vec<_> = pm.transform_stages().map(|s| s.kind()).collect();
    let appended: Vec<_> = strategy.steps().iter().map(|s| s.kind()).collect();
    assert_eq!(emitted, appended);

    use TransformationKind::*;
    assert_eq!(
        emitted,
        vec![TileAndFuse, Tile, Pad, Peel, Vectorize, VectorLowering]
    );
}

#[test]
fn test_emission_is_deterministic() {
    let strategy = matmul_strategy();

    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut first = StagePipeline::new();
    let mut second = StagePipeline::new();
    strategy.configure_pipeline(&mut first, &context, true);
    strategy.configure_pipeline(&mut second, &context, true);
    assert_eq!(first, second);

    let other_arena = Bump::new();
    let other_context = StrategyContext::new(&other_arena);
    let mut third = StagePipeline::new();
    strategy.configure_pipeline(&mut third, &other_context, true);
    assert_eq!(first, third);

    assert_eq!(emit(&strategy, true), emit(&strategy, true));
}

#[test]
fn test_false_conditionals_leave_pipeline_unchanged() {
    let filter = op_predicate(|op| op.name == "linalg.conv_2d_nhwc_hwcf");

    let mut baseline = CodegenStrategy::new();
    baseline
        .decompose(Some(filter.clone()))
        .vectorize("linalg.conv_1d_nwc_wcf", VectorizationOptions::default(), None);

    let mut conditional = CodegenStrategy::new();
    conditional
        .tile_and_fuse_if(false, "linalg.conv_2d_nhwc_hwcf", TileAndFuseOptions::default(), None)
        .tile_if(false, "linalg.conv_2d_nhwc_hwcf", TilingOptions::default(), None)
        .pad_if(false, "linalg.conv_2d_nhwc_hwcf", PaddingOptions::default(), None)
        .decompose_if(true, Some(filter))
        .peel_if(false, "linalg.conv_1d_nwc_wcf", PeelOptions::default(), None)
        .vectorize_if(true, "linalg.conv_1d_nwc_wcf", VectorizationOptions::default(), None);

    assert_eq!(baseline.steps(), conditional.steps());
    assert_eq!(emit(&baseline, true), emit(&conditional, true));
}

#[test]
fn test_step_predicate_is_part_of_stage_filter() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let predicate = op_predicate(|op| op.id.0 < 10);

    let mut strategy = CodegenStrategy::new();
    strategy.tile("linalg.matmul", TilingOptions::default(), Some(predicate.clone()));

    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    let stage = pm.transform_stages().next().unwrap();
    let expected = MarkerFilter::new()
        .exclude_namespace(context.namespace())
        .with_op_name("linalg.matmul")
        .with_predicate(predicate);
    assert_eq!(stage.filter, expected);
    assert_eq!(stage.filter.predicate_count(), 1);
}

#[test]
fn test_separate_namespaces_do_not_share_markers() {
    let arena = Bump::new();
    let gemm = StrategyContext::with_namespace(&arena, "gemm_");
    let conv = StrategyContext::with_namespace(&arena, "conv_");

    let mut strategy = CodegenStrategy::new();
    strategy.decompose(None).decompose(None);

    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &gemm, false);
    strategy.configure_pipeline(&mut pm, &conv, false);

    let markers: Vec<_> = pm.transform_stages().map(|s| s.marker.to_string()).collect();
    assert_eq!(markers, vec!["gemm_0", "gemm_1", "conv_0", "conv_1"]);
}

#[test]
fn test_strategies_emit_concurrently() {
    let strategy = matmul_strategy();
    let expected = emit(&strategy, true);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let strategy = strategy.clone();
                scope.spawn(move || emit(&strategy, true))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
