use crate::alias::AliasResolver;
use crate::diagnostics::DEFAULT_FRAMEWORK_NAMESPACE;
use crate::stages::{self, StageDefinition};
use bundleplan_types::BuildError;
use bundleplan_types::diagnostic::CIRCULAR_DEPENDENCY;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::plan::{DiagnosticPolicy, TargetPipeline};
use bundleplan_types::stage::{Stage, StageId};
use bundleplan_types::target::TargetKind;
use std::collections::BTreeSet;
use tracing::debug;

/// Core UI-framework package deduplicated across nested dependency copies.
pub const DEFAULT_DEDUPE_PACKAGE: &str = "svelte";

/// Whether `module` is a copy of `package` that deduplication collapses: the
/// package itself or any of its subpaths.
pub fn is_deduped(package: &str, module: &str) -> bool {
    module
        .strip_prefix(package)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Package kept to a single runtime instance. `None` disables deduplication.
    pub dedupe: Option<String>,
    pub diagnostics: DiagnosticPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            dedupe: Some(DEFAULT_DEDUPE_PACKAGE.to_string()),
            diagnostics: DiagnosticPolicy {
                code: CIRCULAR_DEPENDENCY.to_string(),
                namespace: DEFAULT_FRAMEWORK_NAMESPACE.to_string(),
            },
        }
    }
}

/// Read-only inputs shared by every target's planning.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    pub env: EnvironmentContext,
    pub aliases: &'a AliasResolver,
    pub config: &'a PlannerConfig,
}

impl<'a> PlanContext<'a> {
    pub fn new(env: EnvironmentContext, aliases: &'a AliasResolver, config: &'a PlannerConfig) -> Self {
        Self { env, aliases, config }
    }
}

/// Assembles the ordered, conditionally included stage list for a target.
pub struct StagePlanner {
    stages: Vec<Box<dyn StageDefinition>>,
}

impl Default for StagePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StagePlanner {
    pub fn new() -> Self {
        Self {
            stages: stages::builtin_stages(),
        }
    }

    pub fn with_stages(stages: Vec<Box<dyn StageDefinition>>) -> Self {
        Self { stages }
    }

    pub fn definitions(&self) -> &[Box<dyn StageDefinition>] {
        &self.stages
    }

    pub fn definition(&self, id: StageId) -> Option<&dyn StageDefinition> {
        self.stages.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    /// Single pass over the definitions: each predicate is evaluated once and the
    /// result is frozen. Ordinals follow append order, starting at 1.
    pub fn plan(&self, target: TargetKind, ctx: &PlanContext<'_>) -> TargetPipeline {
        let target_ctx = PlanContext {
            env: ctx.env.for_target(target),
            ..*ctx
        };

        let mut stages = Vec::new();
        for def in &self.stages {
            if !def.applies_when(target, &target_ctx.env) {
                debug!(kind = %target, stage = %def.id(), "stage skipped");
                continue;
            }
            let ordinal = stages.len() as u32 + 1;
            debug!(kind = %target, stage = %def.id(), ordinal, "stage included");
            stages.push(Stage::new(ordinal, def.options(target, &target_ctx)));
        }

        TargetPipeline {
            target,
            entry: None,
            stages,
            external_dependencies: BTreeSet::new(),
            diagnostics: ctx.config.diagnostics.clone(),
        }
    }

    /// Plan a target given by name; unknown names fail with
    /// [`BuildError::UnknownTarget`].
    pub fn plan_named(&self, target: &str, ctx: &PlanContext<'_>) -> Result<TargetPipeline, BuildError> {
        let kind = target.parse::<TargetKind>()?;
        Ok(self.plan(kind, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundleplan_types::env::Mode;
    use bundleplan_types::stage::{ComponentOutput, StageOptions};
    use pretty_assertions::assert_eq;

    fn plan(target: TargetKind, env: EnvironmentContext) -> TargetPipeline {
        let aliases = AliasResolver::default();
        let config = PlannerConfig::default();
        let ctx = PlanContext::new(env, &aliases, &config);
        StagePlanner::new().plan(target, &ctx)
    }

    fn prod() -> EnvironmentContext {
        EnvironmentContext::new(Mode::Production, false, true)
    }

    fn dev() -> EnvironmentContext {
        EnvironmentContext::new(Mode::Development, false, true)
    }

    #[test]
    fn client_production_order() {
        let p = plan(TargetKind::Client, prod());
        assert_eq!(
            p.stage_ids(),
            vec![
                StageId::AliasResolution,
                StageId::EnvSubstitution,
                StageId::ComponentCompilation,
                StageId::ModuleResolution,
                StageId::InteropNormalization,
                StageId::Minification,
            ]
        );
        let ordinals: Vec<u32> = p.stages.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn client_legacy_development_order() {
        let env = EnvironmentContext::new(Mode::Development, true, true);
        let p = plan(TargetKind::Client, env);
        assert_eq!(
            p.stage_ids(),
            vec![
                StageId::AliasResolution,
                StageId::EnvSubstitution,
                StageId::ComponentCompilation,
                StageId::ModuleResolution,
                StageId::InteropNormalization,
                StageId::LegacyDownlevel,
            ]
        );
    }

    #[test]
    fn server_never_minifies_or_downlevels() {
        let env = EnvironmentContext::new(Mode::Production, true, true);
        let p = plan(TargetKind::Server, env);
        assert!(!p.contains(StageId::Minification));
        assert!(!p.contains(StageId::LegacyDownlevel));
        assert_eq!(p.stages.len(), 5);
    }

    #[test]
    fn serviceworker_skips_component_compilation() {
        let p = plan(TargetKind::ServiceWorker, prod());
        assert_eq!(
            p.stage_ids(),
            vec![
                StageId::AliasResolution,
                StageId::EnvSubstitution,
                StageId::ModuleResolution,
                StageId::InteropNormalization,
                StageId::Minification,
            ]
        );
    }

    #[test]
    fn env_substitution_follows_target_runtime() {
        let server = plan(TargetKind::Server, prod());
        let Some(StageOptions::EnvSubstitution { replacements }) =
            server.stage(StageId::EnvSubstitution).map(|s| &s.options)
        else {
            panic!("missing env substitution");
        };
        assert_eq!(replacements["process.browser"], "false");
        assert_eq!(replacements["process.env.NODE_ENV"], "\"production\"");

        let client = plan(TargetKind::Client, dev());
        let Some(StageOptions::EnvSubstitution { replacements }) =
            client.stage(StageId::EnvSubstitution).map(|s| &s.options)
        else {
            panic!("missing env substitution");
        };
        assert_eq!(replacements["process.browser"], "true");
        assert_eq!(replacements["process.env.NODE_ENV"], "\"development\"");
    }

    #[test]
    fn mode_replacement_is_a_valid_json_string_literal() {
        for (env, mode) in [(prod(), "production"), (dev(), "development")] {
            for target in TargetKind::ALL {
                let pipeline = plan(target, env.clone());
                let Some(StageOptions::EnvSubstitution { replacements }) =
                    pipeline.stage(StageId::EnvSubstitution).map(|s| &s.options)
                else {
                    panic!("missing env substitution for {target}");
                };
                let literal: serde_json::Value =
                    serde_json::from_str(&replacements["process.env.NODE_ENV"]).unwrap();
                assert_eq!(literal, serde_json::Value::String(mode.to_string()));
            }
        }
    }

    #[test]
    fn component_options_per_target() {
        let client = plan(TargetKind::Client, dev());
        assert_eq!(
            client.stage(StageId::ComponentCompilation).map(|s| &s.options),
            Some(&StageOptions::ComponentCompilation {
                generate: ComponentOutput::Dom,
                dev: true,
                hydratable: true,
                emit_css: true,
                preprocess_typescript: true,
            })
        );

        let server = plan(TargetKind::Server, prod());
        assert_eq!(
            server.stage(StageId::ComponentCompilation).map(|s| &s.options),
            Some(&StageOptions::ComponentCompilation {
                generate: ComponentOutput::Ssr,
                dev: false,
                hydratable: false,
                emit_css: false,
                preprocess_typescript: true,
            })
        );
    }

    #[test]
    fn resolution_dedupes_for_client_and_server_only() {
        let opts = |t| plan(t, prod()).stage(StageId::ModuleResolution).map(|s| s.options.clone());
        assert_eq!(
            opts(TargetKind::Client),
            Some(StageOptions::ModuleResolution {
                browser: true,
                dedupe: Some("svelte".to_string())
            })
        );
        assert_eq!(
            opts(TargetKind::Server),
            Some(StageOptions::ModuleResolution {
                browser: false,
                dedupe: Some("svelte".to_string())
            })
        );
        assert_eq!(
            opts(TargetKind::ServiceWorker),
            Some(StageOptions::ModuleResolution {
                browser: false,
                dedupe: None
            })
        );
    }

    #[test]
    fn typed_source_sits_between_interop_and_legacy() {
        let env = EnvironmentContext::new(Mode::Production, true, true).with_typescript(true);
        let p = plan(TargetKind::Client, env);
        let ids = p.stage_ids();
        let pos = |id: StageId| ids.iter().position(|s| *s == id).unwrap();
        assert_eq!(pos(StageId::TypedSource), pos(StageId::InteropNormalization) + 1);
        assert_eq!(pos(StageId::LegacyDownlevel), pos(StageId::TypedSource) + 1);

        assert!(!plan(TargetKind::ServiceWorker, env).contains(StageId::TypedSource));
        assert!(plan(TargetKind::Server, env).contains(StageId::TypedSource));
    }

    #[test]
    fn minify_module_flag_differs_by_target() {
        let client = plan(TargetKind::Client, prod());
        let sw = plan(TargetKind::ServiceWorker, prod());
        assert_eq!(
            client.stage(StageId::Minification).map(|s| &s.options),
            Some(&StageOptions::Minification { module: true })
        );
        assert_eq!(
            sw.stage(StageId::Minification).map(|s| &s.options),
            Some(&StageOptions::Minification { module: false })
        );
    }

    #[test]
    fn plan_named_rejects_unknown_target() {
        let aliases = AliasResolver::default();
        let config = PlannerConfig::default();
        let ctx = PlanContext::new(prod(), &aliases, &config);
        let err = StagePlanner::new().plan_named("edge", &ctx).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownTarget {
                kind: "edge".to_string()
            }
        );
        assert!(StagePlanner::new().plan_named("server", &ctx).is_ok());
    }

    #[test]
    fn dedupe_matches_package_and_subpaths() {
        assert!(is_deduped("svelte", "svelte"));
        assert!(is_deduped("svelte", "svelte/internal"));
        assert!(!is_deduped("svelte", "svelte-routing"));
        assert!(!is_deduped("svelte", "sveltekit"));
    }

    #[test]
    fn custom_definitions_keep_append_order() {
        let planner = StagePlanner::with_stages(
            stages::builtin_stages()
                .into_iter()
                .filter(|s| s.id() != StageId::ComponentCompilation)
                .collect(),
        );
        let aliases = AliasResolver::default();
        let config = PlannerConfig::default();
        let p = planner.plan(TargetKind::Client, &PlanContext::new(dev(), &aliases, &config));
        assert_eq!(p.stages[2].id, StageId::ModuleResolution);
        assert_eq!(p.stages[2].ordinal, 3);
        assert!(planner.definition(StageId::ComponentCompilation).is_none());
    }
}
