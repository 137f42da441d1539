//! Rendering helpers (markdown and plain text) for human-readable build plans.

use bundleplan_types::plan::{BuildPlan, TargetPipeline};
use bundleplan_types::stage::{ComponentOutput, StageOptions};

pub fn render_plan_md(plan: &BuildPlan) -> String {
    let mut out = String::new();
    out.push_str("# bundleplan plan\n\n");
    out.push_str(&format!("- Mode: `{}`\n", plan.env.mode()));
    out.push_str(&format!("- Legacy build: `{}`\n", plan.env.legacy_build()));
    out.push_str(&format!("- Typescript: `{}`\n", plan.env.typescript()));
    out.push_str(&format!(
        "- Targets: {} ({} stages)\n\n",
        plan.pipelines.len(),
        plan.total_stages()
    ));

    out.push_str("## Aliases\n\n");
    if plan.aliases.is_empty() {
        out.push_str("_No aliases._\n");
    }
    for alias in &plan.aliases {
        out.push_str(&format!(
            "- `{}` → `{}`\n",
            alias.symbolic_name, alias.physical_path
        ));
    }
    out.push('\n');

    out.push_str("## Targets\n\n");
    if plan.pipelines.is_empty() {
        out.push_str("_No targets planned._\n");
        return out;
    }

    for pipeline in plan.pipelines.values() {
        render_pipeline_md(&mut out, pipeline);
    }

    out
}

fn render_pipeline_md(out: &mut String, pipeline: &TargetPipeline) {
    out.push_str(&format!("### {}\n\n", pipeline.target));
    if let Some(entry) = &pipeline.entry {
        out.push_str(&format!("- Entry: `{}` → `{}`\n", entry.input, entry.output));
    }
    out.push_str(&format!(
        "- Suppressed diagnostics: `{}` inside `{}`\n",
        pipeline.diagnostics.code, pipeline.diagnostics.namespace
    ));
    if !pipeline.external_dependencies.is_empty() {
        let names: Vec<&str> = pipeline
            .external_dependencies
            .iter()
            .map(String::as_str)
            .collect();
        out.push_str(&format!("- External: {}\n", names.join(", ")));
    }
    out.push('\n');

    for stage in &pipeline.stages {
        let detail = options_summary(&stage.options);
        if detail.is_empty() {
            out.push_str(&format!("{}. `{}`\n", stage.ordinal, stage.id));
        } else {
            out.push_str(&format!("{}. `{}`: {}\n", stage.ordinal, stage.id, detail));
        }
    }
    out.push('\n');
}

/// One line per target: `client: alias_resolution > env_substitution > ...`.
pub fn render_plan_text(plan: &BuildPlan) -> String {
    let mut out = String::new();
    for pipeline in plan.pipelines.values() {
        let ids: Vec<&str> = pipeline.stages.iter().map(|s| s.id.as_str()).collect();
        out.push_str(&format!("{}: {}\n", pipeline.target, ids.join(" > ")));
    }
    out
}

/// Short human summary of a stage's options. Empty when there is nothing to say.
pub fn options_summary(options: &StageOptions) -> String {
    match options {
        StageOptions::AliasResolution { entries, extensions } => format!(
            "{} aliases, extensions {}",
            entries.len(),
            extensions.join(" ")
        ),
        StageOptions::EnvSubstitution { replacements } => replacements
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        StageOptions::ComponentCompilation {
            generate,
            dev,
            hydratable,
            emit_css,
            ..
        } => {
            let mut parts = vec![match generate {
                ComponentOutput::Dom => "dom".to_string(),
                ComponentOutput::Ssr => "ssr".to_string(),
            }];
            if *dev {
                parts.push("dev".to_string());
            }
            if *hydratable {
                parts.push("hydratable".to_string());
            }
            if *emit_css {
                parts.push("emit css".to_string());
            }
            parts.join(", ")
        }
        StageOptions::ModuleResolution { browser, dedupe } => {
            let mut s = if *browser { "browser fields" } else { "default fields" }.to_string();
            if let Some(pkg) = dedupe {
                s.push_str(&format!(", dedupe {pkg}"));
            }
            s
        }
        StageOptions::InteropNormalization => String::new(),
        StageOptions::TypedSource { check } => {
            if *check {
                "type-checked".to_string()
            } else {
                "transpile only".to_string()
            }
        }
        StageOptions::LegacyDownlevel { browserslist, .. } => format!("targets `{browserslist}`"),
        StageOptions::Minification { module } => {
            if *module {
                "module output".to_string()
            } else {
                "script output".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundleplan_types::env::{EnvironmentContext, Mode};
    use bundleplan_types::plan::{DiagnosticPolicy, EntryPoint};
    use bundleplan_types::stage::{AliasEntry, Stage};
    use bundleplan_types::target::TargetKind;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn policy() -> DiagnosticPolicy {
        DiagnosticPolicy {
            code: "CIRCULAR_DEPENDENCY".to_string(),
            namespace: "@sapper".to_string(),
        }
    }

    fn sample_plan() -> BuildPlan {
        let env = EnvironmentContext::new(Mode::Production, false, true);
        let mut plan = BuildPlan::new(env, vec![AliasEntry::new("store", "/app/src/store/")]);
        plan.pipelines.insert(
            TargetKind::Client,
            TargetPipeline {
                target: TargetKind::Client,
                entry: Some(EntryPoint {
                    input: "src/client.js".to_string(),
                    output: "build/client".to_string(),
                }),
                stages: vec![
                    Stage::new(1, StageOptions::InteropNormalization),
                    Stage::new(2, StageOptions::Minification { module: true }),
                ],
                external_dependencies: BTreeSet::new(),
                diagnostics: policy(),
            },
        );
        plan.pipelines.insert(
            TargetKind::Server,
            TargetPipeline {
                target: TargetKind::Server,
                entry: None,
                stages: vec![Stage::new(
                    1,
                    StageOptions::ModuleResolution {
                        browser: false,
                        dedupe: Some("svelte".to_string()),
                    },
                )],
                external_dependencies: ["fs", "polka"].into_iter().map(String::from).collect(),
                diagnostics: policy(),
            },
        );
        plan
    }

    #[test]
    fn text_lists_one_line_per_target() {
        assert_eq!(
            render_plan_text(&sample_plan()),
            "client: interop_normalization > minification\nserver: module_resolution\n"
        );
    }

    #[test]
    fn markdown_has_header_and_targets() {
        let md = render_plan_md(&sample_plan());
        assert!(md.starts_with("# bundleplan plan\n"));
        assert!(md.contains("- Mode: `production`"));
        assert!(md.contains("- Targets: 2 (3 stages)"));
        assert!(md.contains("- `store` → `/app/src/store/`"));
        assert!(md.contains("### client"));
        assert!(md.contains("- Entry: `src/client.js` → `build/client`"));
        assert!(md.contains("1. `interop_normalization`\n"));
        assert!(md.contains("2. `minification`: module output"));
        assert!(md.contains("- External: fs, polka"));
        assert!(md.contains("1. `module_resolution`: default fields, dedupe svelte"));
    }

    #[test]
    fn markdown_handles_empty_plan() {
        let env = EnvironmentContext::new(Mode::Development, false, true);
        let md = render_plan_md(&BuildPlan::new(env, Vec::new()));
        assert!(md.contains("_No aliases._"));
        assert!(md.contains("_No targets planned._"));
    }

    #[test]
    fn env_substitution_summary_is_sorted() {
        let mut replacements = std::collections::BTreeMap::new();
        replacements.insert("process.env.NODE_ENV".to_string(), "\"development\"".to_string());
        replacements.insert("process.browser".to_string(), "true".to_string());
        assert_eq!(
            options_summary(&StageOptions::EnvSubstitution { replacements }),
            "process.browser=true, process.env.NODE_ENV=\"development\""
        );
    }
}
