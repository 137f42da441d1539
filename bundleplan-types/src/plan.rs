use crate::env::EnvironmentContext;
use crate::stage::{AliasEntry, Stage, StageId};
use crate::target::TargetKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Entry point and output location for one target. Supplied externally and copied
/// verbatim into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub input: String,
    pub output: String,
}

/// Which diagnostics the reporter should drop for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticPolicy {
    /// Diagnostic code eligible for suppression.
    pub code: String,
    /// Package namespace whose internal cycles are suppressed.
    pub namespace: String,
}

/// The assembled, frozen pipeline for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPipeline {
    pub target: TargetKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryPoint>,

    #[serde(default)]
    pub stages: Vec<Stage>,

    /// Modules the bundler must leave unresolved. Empty means everything is bundled.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub external_dependencies: BTreeSet<String>,

    pub diagnostics: DiagnosticPolicy,
}

impl TargetPipeline {
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id).collect()
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.stages.iter().any(|s| s.id == id)
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }
}

/// All three target pipelines for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub schema: String,
    pub env: EnvironmentContext,

    #[serde(default)]
    pub aliases: Vec<AliasEntry>,

    #[serde(default)]
    pub pipelines: BTreeMap<TargetKind, TargetPipeline>,
}

impl BuildPlan {
    pub fn new(env: EnvironmentContext, aliases: Vec<AliasEntry>) -> Self {
        Self {
            schema: crate::schema::BUNDLEPLAN_PLAN_V1.to_string(),
            env,
            aliases,
            pipelines: BTreeMap::new(),
        }
    }

    pub fn pipeline(&self, kind: TargetKind) -> Option<&TargetPipeline> {
        self.pipelines.get(&kind)
    }

    pub fn total_stages(&self) -> usize {
        self.pipelines.values().map(|p| p.stages.len()).sum()
    }
}
