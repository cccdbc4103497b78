// This module is the reference execution harness for emitted stage lists. StrategyRunner
// walks the stages in order against a PayloadIr. For a transform stage it snapshots the live
// operations, evaluates the stage's MarkerFilter afresh for each one against the run's
// MarkerTable, applies the rewrite to the matches and writes the stage's marker on every
// operation the rewrite reports. Cleanup stages are forwarded to the payload as a whole.
// The first rewrite failure aborts the run: the runner returns StrategyError::StageFailed
// with the payload's RewriteError as its untouched source, and no later stage runs.

//! Reference execution of emitted stages.

use super::emitter::{Stage, TransformStage};
use crate::core::adaptor::PayloadIr;
use crate::core::error::{StrategyError, StrategyResult};
use crate::core::marker::{MarkerTable, OpId, OpRef};

/// One successful rewrite performed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub stage: usize,
    pub op: OpId,
    pub results: Vec<OpId>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct RunReport<'ctx> {
    pub markers: MarkerTable<'ctx>,
    pub applications: Vec<Application>,
    pub cleanups: usize,
}

impl RunReport<'_> {
    /// Operations rewritten by the stage at position `stage`.
    pub fn processed_by(&self, stage: usize) -> Vec<OpId> {
        self.applications
            .iter()
            .filter(|a| a.stage == stage)
            .map(|a| a.op)
            .collect()
    }
}

/// Executes a stage list against a payload.
pub struct StrategyRunner<'p, 'ctx> {
    stages: &'p [Stage<'ctx>],
}

impl<'p, 'ctx> StrategyRunner<'p, 'ctx> {
    pub fn new(stages: &'p [Stage<'ctx>]) -> Self {
        Self { stages }
    }

    /// Run every stage with a fresh marker table.
    pub fn run<P: PayloadIr + ?Sized>(&self, payload: &mut P) -> StrategyResult<RunReport<'ctx>> {
        self.run_with_markers(payload, MarkerTable::new())
    }

    /// Run every stage, continuing from markers of an earlier run.
    pub fn run_with_markers<P: PayloadIr + ?Sized>(
        &self,
        payload: &mut P,
        markers: MarkerTable<'ctx>,
    ) -> StrategyResult<RunReport<'ctx>> {
        let mut report = RunReport {
            markers,
            ..RunReport::default()
        };

        for (position, stage) in self.stages.iter().enumerate() {
            match stage {
                Stage::Transform(transform) => {
                    self.run_transform(position, transform, payload, &mut report)?;
                }
                Stage::Cleanup(cleanup) => {
                    log::trace!("stage {}: {}", position, cleanup.name());
                    payload
                        .apply_cleanup(cleanup)
                        .map_err(|source| StrategyError::StageFailed {
                            index: position,
                            kind: cleanup.name(),
                            source,
                        })?;
                    report.cleanups += 1;
                }
            }
        }

        Ok(report)
    }

    fn run_transform<P: PayloadIr + ?Sized>(
        &self,
        position: usize,
        stage: &TransformStage<'ctx>,
        payload: &mut P,
        report: &mut RunReport<'ctx>,
    ) -> StrategyResult<()> {
        for op in payload.ops() {
            let matched = match payload.op_name(op) {
                Some(name) => stage.filter.matches(&OpRef::new(op, name), &report.markers),
                None => false,
            };
            if !matched {
                continue;
            }

            log::trace!("stage {}: {} on {}", position, stage.kind(), op);
            let results = payload
                .apply_transform(op, stage)
                .map_err(|source| StrategyError::StageFailed {
                    index: position,
                    kind: stage.kind().name(),
                    source,
                })?;

            for &result in &results {
                report.markers.mark(result, stage.marker);
            }
            report.applications.push(Application {
                stage: position,
                op,
                results,
            });
        }
        Ok(())
    }
}
