//! Clap-free settings for a build invocation.

use bundleplan_domain::{
    DEFAULT_DEDUPE_PACKAGE, DEFAULT_EXTENSIONS, DEFAULT_FRAMEWORK_NAMESPACE, HostBuiltins,
    default_alias_table,
};
use bundleplan_types::diagnostic::CIRCULAR_DEPENDENCY;
use bundleplan_types::plan::EntryPoint;
use bundleplan_types::stage::AliasEntry;
use bundleplan_types::target::TargetKind;
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet};

/// Everything the orchestrator reads besides the environment context.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub project_root: Utf8PathBuf,

    // Aliasing
    pub aliases: Vec<AliasEntry>,
    pub extensions: Vec<String>,

    // Resolution
    pub dedupe: Option<String>,

    // Diagnostics
    pub diagnostic_code: String,
    pub framework_namespace: String,

    // Server externals
    pub declared_dependencies: BTreeSet<String>,
    pub host_builtins: HostBuiltins,

    /// Entry and output per target, supplied by the host bundler.
    pub entries: BTreeMap<TargetKind, EntryPoint>,
}

impl BuildSettings {
    /// Defaults with the alias table rooted at `project_root`.
    pub fn for_root(project_root: Utf8PathBuf) -> Self {
        Self {
            aliases: default_alias_table(&project_root),
            project_root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            dedupe: Some(DEFAULT_DEDUPE_PACKAGE.to_string()),
            diagnostic_code: CIRCULAR_DEPENDENCY.to_string(),
            framework_namespace: DEFAULT_FRAMEWORK_NAMESPACE.to_string(),
            declared_dependencies: BTreeSet::new(),
            host_builtins: HostBuiltins::node20(),
            entries: BTreeMap::new(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::for_root(Utf8PathBuf::from("."))
    }
}
