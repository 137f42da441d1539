use crate::planner::PlanContext;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::stage::{StageId, StageOptions};
use bundleplan_types::target::TargetKind;

mod bundle;
mod compile;
mod source;

/// A schedulable transformation step.
///
/// The planner asks two questions of each definition, once per target at plan time:
/// does it apply, and with which options. What the stage does to a module graph is
/// not visible here.
pub trait StageDefinition: Send + Sync {
    fn id(&self) -> StageId;

    /// `env` is already specialized for `target` (see [`EnvironmentContext::for_target`]).
    fn applies_when(&self, target: TargetKind, env: &EnvironmentContext) -> bool;

    fn options(&self, target: TargetKind, ctx: &PlanContext<'_>) -> StageOptions;

    /// Human-readable inclusion rule, used by `explain` output.
    fn rule(&self) -> &'static str;
}

/// Built-in stages in scheduling order.
pub fn builtin_stages() -> Vec<Box<dyn StageDefinition>> {
    vec![
        Box::new(source::AliasResolutionStage),
        Box::new(source::EnvSubstitutionStage),
        Box::new(compile::ComponentCompilationStage),
        Box::new(bundle::ModuleResolutionStage),
        Box::new(bundle::InteropNormalizationStage),
        Box::new(compile::TypedSourceStage),
        Box::new(compile::LegacyDownlevelStage),
        Box::new(bundle::MinificationStage),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_matches_stage_id_order() {
        let ids: Vec<StageId> = builtin_stages().iter().map(|s| s.id()).collect();
        assert_eq!(ids, StageId::ALL.to_vec());
    }

    #[test]
    fn every_stage_documents_its_rule() {
        for stage in builtin_stages() {
            assert!(!stage.rule().is_empty(), "{} has no rule", stage.id());
        }
    }
}
