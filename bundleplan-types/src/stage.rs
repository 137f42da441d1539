use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a transformation stage.
///
/// Declaration order is the canonical scheduling order used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    AliasResolution,
    EnvSubstitution,
    ComponentCompilation,
    ModuleResolution,
    InteropNormalization,
    TypedSource,
    LegacyDownlevel,
    Minification,
}

impl StageId {
    pub const ALL: [StageId; 8] = [
        StageId::AliasResolution,
        StageId::EnvSubstitution,
        StageId::ComponentCompilation,
        StageId::ModuleResolution,
        StageId::InteropNormalization,
        StageId::TypedSource,
        StageId::LegacyDownlevel,
        StageId::Minification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::AliasResolution => "alias_resolution",
            StageId::EnvSubstitution => "env_substitution",
            StageId::ComponentCompilation => "component_compilation",
            StageId::ModuleResolution => "module_resolution",
            StageId::InteropNormalization => "interop_normalization",
            StageId::TypedSource => "typed_source",
            StageId::LegacyDownlevel => "legacy_downlevel",
            StageId::Minification => "minification",
        }
    }

    pub fn parse(s: &str) -> Option<StageId> {
        let normalized = s.trim().replace('-', "_");
        StageId::ALL.into_iter().find(|id| id.as_str() == normalized)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbolic source-tree prefix mapped to a physical directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub symbolic_name: String,
    pub physical_path: String,
}

impl AliasEntry {
    pub fn new(symbolic_name: impl Into<String>, physical_path: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            physical_path: physical_path.into(),
        }
    }
}

/// Code generation requested from the component compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentOutput {
    /// Browser DOM output.
    Dom,
    /// Server-side rendering output.
    Ssr,
}

/// Stage-specific parameters handed to the external stage implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageOptions {
    AliasResolution {
        entries: Vec<AliasEntry>,
        extensions: Vec<String>,
    },
    EnvSubstitution {
        replacements: BTreeMap<String, String>,
    },
    ComponentCompilation {
        generate: ComponentOutput,
        dev: bool,
        hydratable: bool,
        emit_css: bool,
        preprocess_typescript: bool,
    },
    ModuleResolution {
        browser: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dedupe: Option<String>,
    },
    InteropNormalization,
    TypedSource {
        check: bool,
    },
    LegacyDownlevel {
        extensions: Vec<String>,
        runtime_helpers: bool,
        exclude: Vec<String>,
        browserslist: String,
        plugins: Vec<String>,
    },
    Minification {
        module: bool,
    },
}

impl StageOptions {
    pub fn stage_id(&self) -> StageId {
        match self {
            StageOptions::AliasResolution { .. } => StageId::AliasResolution,
            StageOptions::EnvSubstitution { .. } => StageId::EnvSubstitution,
            StageOptions::ComponentCompilation { .. } => StageId::ComponentCompilation,
            StageOptions::ModuleResolution { .. } => StageId::ModuleResolution,
            StageOptions::InteropNormalization => StageId::InteropNormalization,
            StageOptions::TypedSource { .. } => StageId::TypedSource,
            StageOptions::LegacyDownlevel { .. } => StageId::LegacyDownlevel,
            StageOptions::Minification { .. } => StageId::Minification,
        }
    }
}

/// One scheduled step of a target pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    /// 1-based position in the pipeline.
    pub ordinal: u32,
    pub options: StageOptions,
}

impl Stage {
    pub fn new(ordinal: u32, options: StageOptions) -> Self {
        Self {
            id: options.stage_id(),
            ordinal,
            options,
        }
    }
}
