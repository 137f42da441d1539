//! Stage explanations for the `bundleplan explain` and `list-stages` commands.

use bundleplan_types::stage::StageId;

#[derive(Debug, Clone)]
pub struct StageExplanation {
    pub id: StageId,
    pub title: &'static str,
    /// What the stage does to a module graph.
    pub description: &'static str,
    /// Options the planner hands to the stage implementation.
    pub options: &'static str,
}

/// One entry per [`StageId`], in scheduling order.
pub static STAGE_REGISTRY: &[StageExplanation] = &[
    StageExplanation {
        id: StageId::AliasResolution,
        title: "Alias Resolution",
        description: r#"Rewrites import specifiers that start with a symbolic source-tree prefix
(styles, components, pages, store, locales) to the physical directory behind it.

A specifier matches an alias when it equals the alias name or continues with '/'.
Candidates are tried in order: the path itself, the path with each configured
extension, then <path>/index with each extension. The first existing file wins.
When nothing matches, default module resolution takes over."#,
        options: "entries (symbolic_name, physical_path), extensions",
    },
    StageExplanation {
        id: StageId::EnvSubstitution,
        title: "Environment Substitution",
        description: r#"Replaces compile-time constants in source text before anything else reads it:

    process.browser       -> true | false (the runtime the target executes in)
    process.env.NODE_ENV  -> "development" | "production""#,
        options: "replacements (expression -> literal)",
    },
    StageExplanation {
        id: StageId::ComponentCompilation,
        title: "Component Compilation",
        description: r#"Compiles single-file UI components into JavaScript.

The client build generates DOM code that hydrates server-rendered markup and emits
component CSS. The server build generates SSR code. Both run a transpile-only
TypeScript preprocessor. The service worker has no components."#,
        options: "generate (dom | ssr), dev, hydratable, emit_css, preprocess_typescript",
    },
    StageExplanation {
        id: StageId::ModuleResolution,
        title: "Module Resolution",
        description: r#"Resolves bare specifiers against installed packages.

The client prefers browser-specific package entry points. Client and server keep a
single copy of the UI framework package (and its subpaths) even when nested
dependencies ship their own."#,
        options: "browser, dedupe",
    },
    StageExplanation {
        id: StageId::InteropNormalization,
        title: "Interop Normalization",
        description: r#"Converts CommonJS modules into ES modules so they can be bundled alongside
native ES modules."#,
        options: "(none)",
    },
    StageExplanation {
        id: StageId::TypedSource,
        title: "Typed Source",
        description: r#"Strips type annotations from .ts modules. Runs for client and server when
TypeScript support is enabled, right after interop normalization."#,
        options: "check",
    },
    StageExplanation {
        id: StageId::LegacyDownlevel,
        title: "Legacy Downleveling",
        description: r#"Transpiles the client bundle to an older language level for legacy browsers.

Covers .js .mjs .html .svelte .ts, injects runtime helpers as ES modules, supports
dynamic import syntax and skips the transpiler's own helper packages."#,
        options: "extensions, runtime_helpers, exclude, browserslist, plugins",
    },
    StageExplanation {
        id: StageId::Minification,
        title: "Minification",
        description: r#"Shrinks production output. The client is minified as an ES module, the
service worker as a classic script. Server output is never minified."#,
        options: "module",
    },
];

pub fn lookup_stage(key: &str) -> Option<&'static StageExplanation> {
    let id = StageId::parse(&key.to_ascii_lowercase())?;
    STAGE_REGISTRY.iter().find(|s| s.id == id)
}

pub fn list_stage_keys() -> Vec<&'static str> {
    STAGE_REGISTRY.iter().map(|s| s.id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_stage_in_order() {
        let ids: Vec<StageId> = STAGE_REGISTRY.iter().map(|s| s.id).collect();
        assert_eq!(ids, StageId::ALL.to_vec());
    }

    #[test]
    fn lookup_accepts_dashes_and_case() {
        assert_eq!(
            lookup_stage("Legacy-Downlevel").map(|s| s.id),
            Some(StageId::LegacyDownlevel)
        );
        assert!(lookup_stage("tree-shaking").is_none());
    }

    #[test]
    fn keys_are_snake_case() {
        assert!(list_stage_keys().contains(&"env_substitution"));
    }
}
