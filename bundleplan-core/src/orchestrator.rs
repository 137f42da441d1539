//! Top-level build orchestration: one shared alias table, three independent plans.

use crate::settings::BuildSettings;
use bundleplan_domain::{
    AliasResolver, DependencyClassifier, DiagnosticFilter, PlanContext, PlannerConfig, StagePlanner,
};
use bundleplan_types::BuildError;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::plan::{BuildPlan, TargetPipeline};
use bundleplan_types::target::TargetKind;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct BuildOrchestrator {
    settings: BuildSettings,
    planner: StagePlanner,
}

impl BuildOrchestrator {
    pub fn new(settings: BuildSettings) -> Self {
        Self::with_planner(settings, StagePlanner::new())
    }

    pub fn with_planner(settings: BuildSettings, planner: StagePlanner) -> Self {
        Self { settings, planner }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn planner(&self) -> &StagePlanner {
        &self.planner
    }

    /// The shared alias table. Fails on a duplicate symbolic name.
    pub fn alias_resolver(&self) -> Result<AliasResolver, BuildError> {
        AliasResolver::from_entries(&self.settings.aliases, self.settings.extensions.clone())
    }

    /// The diagnostic filter attached to every pipeline.
    pub fn diagnostic_filter(&self) -> Result<DiagnosticFilter, BuildError> {
        DiagnosticFilter::with_code(
            &self.settings.diagnostic_code,
            &self.settings.framework_namespace,
        )
    }

    /// Plan all three targets.
    pub fn build_all(&self, env: &EnvironmentContext) -> Result<BuildPlan, BuildError> {
        self.build_targets(env, &TargetKind::ALL)
    }

    /// Plan only the named targets. Every name is validated before any planning
    /// starts, so an unknown name never yields a partial plan.
    pub fn build_selected(&self, env: &EnvironmentContext, names: &[String]) -> Result<BuildPlan, BuildError> {
        let kinds = names
            .iter()
            .map(|n| n.trim().parse::<TargetKind>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        let kinds: Vec<TargetKind> = kinds.into_iter().collect();
        self.build_targets(env, &kinds)
    }

    fn build_targets(&self, env: &EnvironmentContext, kinds: &[TargetKind]) -> Result<BuildPlan, BuildError> {
        let aliases = self.alias_resolver()?;
        let filter = self.diagnostic_filter()?;
        let classifier = DependencyClassifier::new(self.settings.host_builtins.clone());
        let config = PlannerConfig {
            dedupe: self.settings.dedupe.clone(),
            diagnostics: filter.policy(),
        };
        let ctx = PlanContext::new(*env, &aliases, &config);

        info!(
            mode = %env.mode(),
            legacy = env.legacy_build(),
            typescript = env.typescript(),
            targets = kinds.len(),
            "planning targets"
        );

        let pipelines: Vec<TargetPipeline> = kinds
            .par_iter()
            .map(|&kind| self.plan_target(kind, &ctx, &classifier))
            .collect();

        let mut plan = BuildPlan::new(*env, aliases.entries().to_vec());
        for pipeline in pipelines {
            plan.pipelines.insert(pipeline.target, pipeline);
        }
        Ok(plan)
    }

    fn plan_target(
        &self,
        kind: TargetKind,
        ctx: &PlanContext<'_>,
        classifier: &DependencyClassifier,
    ) -> TargetPipeline {
        let mut pipeline = self.planner.plan(kind, ctx);
        pipeline.entry = self.settings.entries.get(&kind).cloned();
        pipeline.external_dependencies =
            classifier.externals_for(kind, &self.settings.declared_dependencies);

        debug!(
            kind = %kind,
            stages = pipeline.stages.len(),
            externals = pipeline.external_dependencies.len(),
            "planned target"
        );
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundleplan_domain::HostBuiltins;
    use bundleplan_types::env::Mode;
    use bundleplan_types::plan::EntryPoint;
    use bundleplan_types::stage::{AliasEntry, StageId};
    use pretty_assertions::assert_eq;

    fn settings() -> BuildSettings {
        let mut s = BuildSettings::for_root("/app".into());
        s.declared_dependencies = ["left-pad".to_string()].into_iter().collect();
        s.host_builtins = HostBuiltins::new("node", "test", ["fs", "path"]);
        s
    }

    fn prod_browser() -> EnvironmentContext {
        EnvironmentContext::new(Mode::Production, false, true)
    }

    #[test]
    fn build_all_production_end_to_end() {
        let plan = BuildOrchestrator::new(settings()).build_all(&prod_browser()).unwrap();
        assert_eq!(plan.pipelines.len(), 3);

        let client = plan.pipeline(TargetKind::Client).unwrap();
        assert!(!client.contains(StageId::LegacyDownlevel));
        assert!(client.contains(StageId::Minification));
        assert!(client.external_dependencies.is_empty());

        let server = plan.pipeline(TargetKind::Server).unwrap();
        assert!(!server.contains(StageId::Minification));
        let expected: BTreeSet<String> = ["fs", "left-pad", "path"].into_iter().map(String::from).collect();
        assert_eq!(server.external_dependencies, expected);

        let sw = plan.pipeline(TargetKind::ServiceWorker).unwrap();
        assert!(sw.contains(StageId::Minification));
        assert!(!sw.contains(StageId::ComponentCompilation));
        assert!(sw.external_dependencies.is_empty());
    }

    #[test]
    fn every_pipeline_carries_the_diagnostic_policy() {
        let plan = BuildOrchestrator::new(settings()).build_all(&prod_browser()).unwrap();
        for pipeline in plan.pipelines.values() {
            assert_eq!(pipeline.diagnostics.code, "CIRCULAR_DEPENDENCY");
            assert_eq!(pipeline.diagnostics.namespace, "@sapper");
        }
    }

    #[test]
    fn plan_records_shared_alias_table() {
        let plan = BuildOrchestrator::new(settings()).build_all(&prod_browser()).unwrap();
        assert_eq!(plan.aliases.len(), 5);
        assert_eq!(plan.aliases[1], AliasEntry::new("components", "/app/src/components/"));
    }

    #[test]
    fn duplicate_alias_aborts_before_planning() {
        let mut s = settings();
        s.aliases.push(AliasEntry::new("store", "/elsewhere/"));
        let err = BuildOrchestrator::new(s).build_all(&prod_browser()).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateAlias {
                name: "store".to_string()
            }
        );
    }

    #[test]
    fn empty_namespace_is_configuration_error() {
        let mut s = settings();
        s.framework_namespace = String::new();
        let err = BuildOrchestrator::new(s).build_all(&prod_browser()).unwrap_err();
        assert!(matches!(err, BuildError::Configuration { .. }));
    }

    #[test]
    fn build_selected_rejects_unknown_target_without_partial_plan() {
        let orch = BuildOrchestrator::new(settings());
        let names = vec!["client".to_string(), "edge".to_string()];
        let err = orch.build_selected(&prod_browser(), &names).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownTarget {
                kind: "edge".to_string()
            }
        );
    }

    #[test]
    fn build_selected_plans_only_requested_targets() {
        let orch = BuildOrchestrator::new(settings());
        let names = vec!["server".to_string(), "server".to_string()];
        let plan = orch.build_selected(&prod_browser(), &names).unwrap();
        assert_eq!(plan.pipelines.keys().copied().collect::<Vec<_>>(), vec![TargetKind::Server]);
    }

    #[test]
    fn entries_are_copied_verbatim() {
        let mut s = settings();
        s.entries.insert(
            TargetKind::Client,
            EntryPoint {
                input: "src/client.js".to_string(),
                output: "__sapper__/build/client".to_string(),
            },
        );
        let plan = BuildOrchestrator::new(s).build_all(&prod_browser()).unwrap();
        assert_eq!(
            plan.pipeline(TargetKind::Client).and_then(|p| p.entry.as_ref()).map(|e| e.output.as_str()),
            Some("__sapper__/build/client")
        );
        assert!(plan.pipeline(TargetKind::Server).unwrap().entry.is_none());
    }

    #[test]
    fn repeated_builds_are_identical() {
        let orch = BuildOrchestrator::new(settings());
        let env = EnvironmentContext::new(Mode::Development, true, true).with_typescript(true);
        let a = orch.build_all(&env).unwrap();
        let b = orch.build_all(&env).unwrap();
        assert_eq!(a, b);
    }
}
