use super::StageDefinition;
use crate::planner::PlanContext;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::stage::{StageId, StageOptions};
use bundleplan_types::target::TargetKind;
use std::collections::BTreeMap;

pub(crate) const BROWSER_FLAG: &str = "process.browser";
pub(crate) const MODE_VAR: &str = "process.env.NODE_ENV";

pub struct AliasResolutionStage;

impl StageDefinition for AliasResolutionStage {
    fn id(&self) -> StageId {
        StageId::AliasResolution
    }

    fn applies_when(&self, _target: TargetKind, _env: &EnvironmentContext) -> bool {
        true
    }

    fn options(&self, _target: TargetKind, ctx: &PlanContext<'_>) -> StageOptions {
        StageOptions::AliasResolution {
            entries: ctx.aliases.entries().to_vec(),
            extensions: ctx.aliases.extensions().to_vec(),
        }
    }

    fn rule(&self) -> &'static str {
        "always, first, for every target"
    }
}

pub struct EnvSubstitutionStage;

impl StageDefinition for EnvSubstitutionStage {
    fn id(&self) -> StageId {
        StageId::EnvSubstitution
    }

    fn applies_when(&self, _target: TargetKind, _env: &EnvironmentContext) -> bool {
        true
    }

    fn options(&self, _target: TargetKind, ctx: &PlanContext<'_>) -> StageOptions {
        let mut replacements = BTreeMap::new();
        replacements.insert(BROWSER_FLAG.to_string(), ctx.env.is_browser().to_string());
        // Substituted as a JS string literal.
        let mode = serde_json::Value::String(ctx.env.mode().to_string());
        replacements.insert(MODE_VAR.to_string(), mode.to_string());
        StageOptions::EnvSubstitution { replacements }
    }

    fn rule(&self) -> &'static str {
        "always, second, for every target; browser flag follows the target runtime"
    }
}
