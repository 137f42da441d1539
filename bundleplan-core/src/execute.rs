//! Parallel, fail-fast execution of planned pipelines.

use crate::ports::{Artifact, ArtifactSink, ModuleGraph, PipelineExecutor, StageTransform};
use bundleplan_types::plan::{BuildPlan, TargetPipeline};
use bundleplan_types::stage::StageId;
use bundleplan_types::target::TargetKind;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Marker error returned by executors that stopped because a sibling failed.
#[derive(Debug, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

/// Error type for execution results.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("target {target} failed: {source:#}")]
    Target {
        target: TargetKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("build cancelled")]
    Cancelled,
    #[error("emit artifacts: {0:#}")]
    Emit(anyhow::Error),
}

/// Shared cooperative cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    raised: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Runs every pipeline of `plan` on its own rayon worker.
///
/// The first failing target raises the shared signal so siblings stop at their next
/// checkpoint. Artifacts reach `sink` only when all targets succeeded, in target
/// order. A sink error stops emission and is returned as [`ExecuteError::Emit`];
/// artifacts already handed to the sink are not rolled back.
pub fn execute_all(
    plan: &BuildPlan,
    executor: &dyn PipelineExecutor,
    sink: &dyn ArtifactSink,
) -> Result<Vec<Artifact>, ExecuteError> {
    let cancel = CancelSignal::new();
    let pipelines: Vec<&TargetPipeline> = plan.pipelines.values().collect();

    let results: Vec<(TargetKind, anyhow::Result<Artifact>)> = pipelines
        .par_iter()
        .map(|pipeline| {
            if cancel.is_raised() {
                return (pipeline.target, Err(Cancelled.into()));
            }
            let result = executor.execute(pipeline, &cancel);
            if result.is_err() {
                cancel.raise();
            }
            (pipeline.target, result)
        })
        .collect();

    let mut artifacts = Vec::with_capacity(results.len());
    let mut failure = None;
    let mut cancelled = false;
    for (target, result) in results {
        match result {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) if e.is::<Cancelled>() => {
                debug!(kind = %target, "target cancelled");
                cancelled = true;
            }
            Err(e) => {
                if failure.is_none() {
                    failure = Some(ExecuteError::Target { target, source: e });
                }
            }
        }
    }

    if let Some(err) = failure {
        warn!("build aborted: {}", err);
        return Err(err);
    }
    if cancelled {
        return Err(ExecuteError::Cancelled);
    }

    for artifact in &artifacts {
        sink.emit(artifact).map_err(ExecuteError::Emit)?;
    }
    info!(artifacts = artifacts.len(), "build complete");
    Ok(artifacts)
}

/// Default executor: threads a [`ModuleGraph`] through registered transforms in
/// ordinal order.
#[derive(Default)]
pub struct GraphExecutor {
    transforms: BTreeMap<StageId, Box<dyn StageTransform>>,
}

impl GraphExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: StageId, transform: Box<dyn StageTransform>) -> Self {
        self.transforms.insert(id, transform);
        self
    }
}

impl PipelineExecutor for GraphExecutor {
    fn execute(&self, pipeline: &TargetPipeline, cancel: &CancelSignal) -> anyhow::Result<Artifact> {
        let entry = pipeline
            .entry
            .as_ref()
            .map(|e| e.input.clone())
            .unwrap_or_default();
        let mut graph = ModuleGraph::new(entry);

        for stage in &pipeline.stages {
            if cancel.is_raised() {
                return Err(Cancelled.into());
            }
            let transform = self.transforms.get(&stage.id).ok_or_else(|| {
                anyhow::anyhow!("no transform registered for stage {}", stage.id)
            })?;
            debug!(kind = %pipeline.target, stage = %stage.id, "running stage");
            graph = transform.transform(stage, graph)?;
        }

        Ok(Artifact {
            target: pipeline.target,
            output: pipeline.entry.as_ref().map(|e| e.output.clone()),
            graph,
        })
    }
}
