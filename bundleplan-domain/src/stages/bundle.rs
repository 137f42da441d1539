use super::StageDefinition;
use crate::planner::PlanContext;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::stage::{StageId, StageOptions};
use bundleplan_types::target::TargetKind;

pub struct ModuleResolutionStage;

impl StageDefinition for ModuleResolutionStage {
    fn id(&self) -> StageId {
        StageId::ModuleResolution
    }

    fn applies_when(&self, _target: TargetKind, _env: &EnvironmentContext) -> bool {
        true
    }

    fn options(&self, target: TargetKind, ctx: &PlanContext<'_>) -> StageOptions {
        match target {
            TargetKind::Client => StageOptions::ModuleResolution {
                browser: true,
                dedupe: ctx.config.dedupe.clone(),
            },
            TargetKind::Server => StageOptions::ModuleResolution {
                browser: false,
                dedupe: ctx.config.dedupe.clone(),
            },
            TargetKind::ServiceWorker => StageOptions::ModuleResolution {
                browser: false,
                dedupe: None,
            },
        }
    }

    fn rule(&self) -> &'static str {
        "always; client and server dedupe the UI framework, client resolves browser fields"
    }
}

pub struct InteropNormalizationStage;

impl StageDefinition for InteropNormalizationStage {
    fn id(&self) -> StageId {
        StageId::InteropNormalization
    }

    fn applies_when(&self, _target: TargetKind, _env: &EnvironmentContext) -> bool {
        true
    }

    fn options(&self, _target: TargetKind, _ctx: &PlanContext<'_>) -> StageOptions {
        StageOptions::InteropNormalization
    }

    fn rule(&self) -> &'static str {
        "always, for every target"
    }
}

pub struct MinificationStage;

impl StageDefinition for MinificationStage {
    fn id(&self) -> StageId {
        StageId::Minification
    }

    fn applies_when(&self, target: TargetKind, env: &EnvironmentContext) -> bool {
        env.mode().is_production() && !matches!(target, TargetKind::Server)
    }

    fn options(&self, target: TargetKind, _ctx: &PlanContext<'_>) -> StageOptions {
        StageOptions::Minification {
            module: matches!(target, TargetKind::Client),
        }
    }

    fn rule(&self) -> &'static str {
        "client and serviceworker in production; never server"
    }
}
