//! Tests executing emitted stage lists against the test payload IR.

use bumpalo::Bump;
use codegen_strategy::core::{op_predicate, OpId, PayloadIr, StrategyContext, StrategyError};
use codegen_strategy::strategy::{
    CodegenStrategy, PaddingOptions, StagePipeline, StrategyRunner, TilingOptions,
    TransformationKind, VectorLoweringOptions, VectorizationOptions,
};
use codegen_strategy::test_payload::{TestPayload, VECTORIZED_OP_NAME};

const MATMUL_PAYLOAD: &str = "
; two matmuls sharing an init
%init = linalg.fill
%a = linalg.matmul
%b = linalg.matmul
%c = linalg.generic
";

fn matmul_strategy() -> CodegenStrategy {
    let mut strategy = CodegenStrategy::new();
    strategy
        .tile(
            "linalg.matmul",
            TilingOptions::default().set_tile_sizes(vec![8, 32, 16]),
            None,
        )
        .pad("linalg.matmul", PaddingOptions::default(), None)
        .vectorize("linalg.matmul", VectorizationOptions::default(), None)
        .vector_lowering(VectorLoweringOptions::default());
    strategy
}

#[test]
fn test_stages_chain_through_markers() {
    let _ = env_logger::builder().is_test(true).try_init();

    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut pm = StagePipeline::new();
    matmul_strategy().configure_pipeline(&mut pm, &context, true);

    let mut payload = TestPayload::parse(MATMUL_PAYLOAD).unwrap();
    let report = StrategyRunner::new(pm.stages()).run(&mut payload).unwrap();

    // Tiling replaced %a (op 1) and %b (op 2) with ops 4 and 5.
    assert_eq!(report.processed_by(0), vec![OpId(1), OpId(2)]);
    assert_eq!(report.processed_by(1), vec![OpId(4), OpId(5)]);
    assert_eq!(report.processed_by(2), vec![OpId(4), OpId(5)]);
    // Vector lowering has no name constraint but only sees vectorized ops.
    assert_eq!(report.processed_by(3), vec![OpId(4), OpId(5)]);
    assert_eq!(report.cleanups, 3);

    assert_eq!(
        payload.log,
        vec![
            "tile %1 -> %4",
            "tile %2 -> %5",
            "pad %4",
            "pad %5",
            "vectorize %4",
            "vectorize %5",
            "vector-lowering %4",
            "vector-lowering %5",
            "canonicalize",
            "dce",
            "enable",
        ]
    );
    assert_eq!(
        payload.print(),
        "Printing payload\n  %init = linalg.fill\n  %c = linalg.generic\n  %a = vector.contract\n  %b = vector.contract\n"
    );

    let markers: Vec<_> = report
        .markers
        .markers_of(OpId(4))
        .iter()
        .map(|m| m.stage())
        .collect();
    assert_eq!(markers, vec![0, 1, 2, 3]);
    assert!(report.markers.markers_of(OpId(0)).is_empty());
}

#[test]
fn test_rerun_processes_nothing_new() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut pm = StagePipeline::new();
    matmul_strategy().configure_pipeline(&mut pm, &context, false);

    let mut payload = TestPayload::parse(MATMUL_PAYLOAD).unwrap();
    let runner = StrategyRunner::new(pm.stages());
    let first = runner.run(&mut payload).unwrap();
    let marks = first.markers.len();
    let log_len = payload.log.len();

    let second = runner.run_with_markers(&mut payload, first.markers).unwrap();
    assert!(second.applications.is_empty());
    assert_eq!(second.markers.len(), marks);
    assert_eq!(payload.log.len(), log_len);
}

#[test]
fn test_rerun_after_multi_level_tiling_processes_nothing_new() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);

    let mut strategy = CodegenStrategy::new();
    strategy
        .tile(
            "linalg.matmul",
            TilingOptions::default().set_tile_sizes(vec![64, 64]),
            None,
        )
        .tile(
            "linalg.matmul",
            TilingOptions::default().set_tile_sizes(vec![8, 8]),
            None,
        );
    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    let mut payload = TestPayload::parse("%a = linalg.matmul").unwrap();
    let runner = StrategyRunner::new(pm.stages());
    let first = runner.run(&mut payload).unwrap();
    assert_eq!(first.processed_by(0), vec![OpId(0)]);
    assert_eq!(first.processed_by(1), vec![OpId(1)]);
    assert_eq!(payload.log, vec!["tile %0 -> %1", "tile %1 -> %2"]);

    // %2 only carries the second stage's marker; the first stage must
    // still leave it alone.
    let second = runner.run_with_markers(&mut payload, first.markers).unwrap();
    assert!(second.applications.is_empty());
    assert_eq!(payload.log, vec!["tile %0 -> %1", "tile %1 -> %2"]);
}

#[test]
fn test_unprocessed_ops_skip_later_stages() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);

    let mut strategy = CodegenStrategy::new();
    strategy
        .tile("linalg.matmul", TilingOptions::default(), None)
        .decompose(None);
    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    let mut payload = TestPayload::parse(MATMUL_PAYLOAD).unwrap();
    let report = StrategyRunner::new(pm.stages()).run(&mut payload).unwrap();

    // Decompose has no name constraint, yet the fill and generic ops were
    // never tiled and so never reach it.
    let decomposed = report.processed_by(1);
    assert_eq!(decomposed, vec![OpId(4), OpId(5)]);
    for op in decomposed {
        assert_eq!(payload.op_name(op), Some("linalg.matmul"));
    }
}

#[test]
fn test_step_predicate_narrows_matches() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);

    let mut payload = TestPayload::parse(MATMUL_PAYLOAD).unwrap();
    let only_b = payload.find("b").unwrap();

    let mut strategy = CodegenStrategy::new();
    strategy.vectorize(
        "linalg.matmul",
        VectorizationOptions::default(),
        Some(op_predicate(move |op| op.id == only_b)),
    );
    let mut pm = StagePipeline::new();
    strategy.configure_pipeline(&mut pm, &context, false);

    let report = StrategyRunner::new(pm.stages()).run(&mut payload).unwrap();
    assert_eq!(report.processed_by(0), vec![only_b]);
    assert_eq!(payload.op_name(only_b), Some(VECTORIZED_OP_NAME));
    assert_eq!(payload.op_name(payload.find("a").unwrap()), Some("linalg.matmul"));
}

#[test]
fn test_first_failure_aborts_run() {
    let arena = Bump::new();
    let context = StrategyContext::new(&arena);
    let mut pm = StagePipeline::new();
    matmul_strategy().configure_pipeline(&mut pm, &context, true);

    let mut payload = TestPayload::parse(MATMUL_PAYLOAD).unwrap();
    payload.fail_on(TransformationKind::Pad, "linalg.matmul");

    let err = StrategyRunner::new(pm.stages()).run(&mut payload).unwrap_err();
    match &err {
        StrategyError::StageFailed { index, kind, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(*kind, "pad");
        }
    }
    assert_eq!(err.rewrite_error().message, "pad failed on %4 (linalg.matmul)");
    assert_eq!(
        err.to_string(),
        "stage 1 (pad) failed: pad failed on %4 (linalg.matmul)"
    );

    // Nothing after the failing rewrite ran.
    assert_eq!(payload.log, vec!["tile %1 -> %4", "tile %2 -> %5"]);
}
