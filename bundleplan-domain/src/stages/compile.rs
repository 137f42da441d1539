use super::StageDefinition;
use crate::planner::PlanContext;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::stage::{ComponentOutput, StageId, StageOptions};
use bundleplan_types::target::TargetKind;

const LEGACY_EXTENSIONS: &[&str] = &[".js", ".mjs", ".html", ".svelte", ".ts"];
const LEGACY_EXCLUDE: &[&str] = &["node_modules/@babel/**"];
const LEGACY_BROWSERSLIST: &str = "> 0.25%, not dead";
const LEGACY_PLUGINS: &[&str] = &["syntax-dynamic-import", "transform-runtime:esm"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub struct ComponentCompilationStage;

impl StageDefinition for ComponentCompilationStage {
    fn id(&self) -> StageId {
        StageId::ComponentCompilation
    }

    fn applies_when(&self, target: TargetKind, _env: &EnvironmentContext) -> bool {
        !matches!(target, TargetKind::ServiceWorker)
    }

    fn options(&self, target: TargetKind, ctx: &PlanContext<'_>) -> StageOptions {
        let client = matches!(target, TargetKind::Client);
        StageOptions::ComponentCompilation {
            generate: if client { ComponentOutput::Dom } else { ComponentOutput::Ssr },
            dev: ctx.env.is_dev(),
            hydratable: client,
            emit_css: client,
            preprocess_typescript: true,
        }
    }

    fn rule(&self) -> &'static str {
        "client (hydratable, CSS-emitting) and server (SSR); never serviceworker"
    }
}

pub struct TypedSourceStage;

impl StageDefinition for TypedSourceStage {
    fn id(&self) -> StageId {
        StageId::TypedSource
    }

    fn applies_when(&self, target: TargetKind, env: &EnvironmentContext) -> bool {
        env.typescript() && !matches!(target, TargetKind::ServiceWorker)
    }

    fn options(&self, _target: TargetKind, _ctx: &PlanContext<'_>) -> StageOptions {
        StageOptions::TypedSource { check: false }
    }

    fn rule(&self) -> &'static str {
        "client and server when typescript is enabled, after interop-normalization"
    }
}

pub struct LegacyDownlevelStage;

impl StageDefinition for LegacyDownlevelStage {
    fn id(&self) -> StageId {
        StageId::LegacyDownlevel
    }

    fn applies_when(&self, target: TargetKind, env: &EnvironmentContext) -> bool {
        env.legacy_build() && matches!(target, TargetKind::Client)
    }

    fn options(&self, _target: TargetKind, _ctx: &PlanContext<'_>) -> StageOptions {
        StageOptions::LegacyDownlevel {
            extensions: strings(LEGACY_EXTENSIONS),
            runtime_helpers: true,
            exclude: strings(LEGACY_EXCLUDE),
            browserslist: LEGACY_BROWSERSLIST.to_string(),
            plugins: strings(LEGACY_PLUGINS),
        }
    }

    fn rule(&self) -> &'static str {
        "client only, when the legacy build flag is set"
    }
}
