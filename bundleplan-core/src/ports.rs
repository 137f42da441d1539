//! Port traits abstracting stage execution and emission away from the orchestrator.

use crate::execute::CancelSignal;
use bundleplan_types::plan::TargetPipeline;
use bundleplan_types::stage::Stage;
use bundleplan_types::target::TargetKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque module graph threaded through a pipeline. The core never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGraph {
    pub entry: String,
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl ModuleGraph {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            modules: BTreeMap::new(),
        }
    }
}

/// Output of one successfully executed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub target: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub graph: ModuleGraph,
}

/// The capability every stage implementation provides.
pub trait StageTransform: Send + Sync {
    fn transform(&self, stage: &Stage, graph: ModuleGraph) -> anyhow::Result<ModuleGraph>;
}

/// Runs one target pipeline to completion.
///
/// Implementations should poll `cancel` between units of work and return
/// [`Cancelled`](crate::execute::Cancelled) once it is raised.
pub trait PipelineExecutor: Send + Sync {
    fn execute(&self, pipeline: &TargetPipeline, cancel: &CancelSignal) -> anyhow::Result<Artifact>;
}

/// Receives finished artifacts. Only called once every target has succeeded.
///
/// Artifacts arrive one at a time in target order and emission stops at the
/// first error. Artifacts emitted before that error stay emitted; a sink that
/// needs all-or-nothing output must stage its writes itself.
pub trait ArtifactSink: Sync {
    fn emit(&self, artifact: &Artifact) -> anyhow::Result<()>;
}

/// Source of the project's declared runtime dependencies.
pub trait DependencySource {
    fn declared_dependencies(&self) -> anyhow::Result<BTreeSet<String>>;
}
