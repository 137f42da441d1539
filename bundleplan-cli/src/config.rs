//! Configuration file loading for bundleplan.
//!
//! Discovers and loads `bundleplan.toml` from the project root and merges it with
//! CLI arguments (CLI takes precedence).

use anyhow::Context;
use bundleplan_core::BuildSettings;
use bundleplan_domain::HostBuiltins;
use bundleplan_types::plan::EntryPoint;
use bundleplan_types::stage::AliasEntry;
use bundleplan_types::target::TargetKind;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "bundleplan.toml";

/// Top-level configuration from bundleplan.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleplanConfig {
    /// Ordered alias table. Empty means the built-in table.
    pub alias: Vec<AliasConfig>,

    pub resolve: ResolveConfig,

    pub diagnostics: DiagnosticsConfig,

    pub runtime: Option<RuntimeConfig>,

    pub build: BuildConfig,

    /// Entry and output per target, keyed by target name.
    pub entries: BTreeMap<String, EntryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub find: String,
    /// Relative paths are joined onto the project root.
    pub replacement: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub extensions: Option<Vec<String>>,
    /// Empty string disables deduplication.
    pub dedupe: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub framework_namespace: Option<String>,
    pub circular_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub name: String,
    pub version: String,
    pub builtins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub typescript: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    pub input: String,
    pub output: String,
}

/// Discover the bundleplan.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a bundleplan.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<BundleplanConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<BundleplanConfig> {
    let config: BundleplanConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return the default if none exists.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<BundleplanConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(BundleplanConfig::default()),
    }
}

/// Merges the config file with CLI arguments into [`BuildSettings`].
pub struct ConfigMerger {
    config: BundleplanConfig,
}

impl ConfigMerger {
    pub fn new(config: BundleplanConfig) -> Self {
        Self { config }
    }

    /// CLI `--typescript` switches the typed-source stage on; the config can only
    /// turn it on too.
    pub fn typescript(&self, cli_typescript: bool) -> bool {
        cli_typescript || self.config.build.typescript
    }

    /// Build settings rooted at `root`. Target names under `[entries]` are
    /// validated here so a typo fails before planning.
    pub fn into_settings(&self, root: &Utf8Path) -> anyhow::Result<BuildSettings> {
        let mut settings = BuildSettings::for_root(root.to_path_buf());
        let cfg = &self.config;

        if !cfg.alias.is_empty() {
            settings.aliases = cfg
                .alias
                .iter()
                .map(|a| AliasEntry::new(a.find.clone(), absolutize(root, &a.replacement)))
                .collect();
        }

        if let Some(extensions) = &cfg.resolve.extensions {
            settings.extensions = extensions.clone();
        }
        if let Some(dedupe) = &cfg.resolve.dedupe {
            settings.dedupe = Some(dedupe.trim().to_string()).filter(|d| !d.is_empty());
        }

        if let Some(ns) = &cfg.diagnostics.framework_namespace {
            settings.framework_namespace = ns.clone();
        }
        if let Some(code) = &cfg.diagnostics.circular_code {
            settings.diagnostic_code = code.clone();
        }

        if let Some(rt) = &cfg.runtime {
            settings.host_builtins =
                HostBuiltins::new(rt.name.clone(), rt.version.clone(), rt.builtins.iter().cloned());
        }

        for (name, entry) in &cfg.entries {
            let kind: TargetKind = name
                .parse()
                .with_context(|| format!("[entries.{name}] in {CONFIG_FILE_NAME}"))?;
            settings.entries.insert(
                kind,
                EntryPoint {
                    input: entry.input.clone(),
                    output: entry.output.clone(),
                },
            );
        }

        Ok(settings)
    }
}

fn absolutize(root: &Utf8Path, replacement: &str) -> String {
    let path = Utf8Path::new(replacement);
    if path.is_absolute() {
        return replacement.to_string();
    }
    let joined = root.join(path).to_string();
    if replacement.ends_with('/') && !joined.ends_with('/') {
        format!("{joined}/")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[[alias]]
find = "store"
replacement = "src/state/"

[[alias]]
find = "ui"
replacement = "/abs/ui/"

[resolve]
extensions = [".ts", ".svelte"]
dedupe = "svelte"

[diagnostics]
framework_namespace = "@framework-internal"
circular_code = "CIRCULAR"

[runtime]
name = "node"
version = "18"
builtins = ["fs", "path"]

[build]
typescript = true

[entries.client]
input = "src/client.js"
output = "__sapper__/build/client"
"#;
        let config = parse_config(contents).unwrap();
        assert_eq!(config.alias.len(), 2);
        assert!(config.build.typescript);

        let settings = ConfigMerger::new(config)
            .into_settings(Utf8Path::new("/app"))
            .unwrap();
        assert_eq!(
            settings.aliases,
            vec![
                AliasEntry::new("store", "/app/src/state/"),
                AliasEntry::new("ui", "/abs/ui/"),
            ]
        );
        assert_eq!(settings.extensions, vec![".ts", ".svelte"]);
        assert_eq!(settings.framework_namespace, "@framework-internal");
        assert_eq!(settings.diagnostic_code, "CIRCULAR");
        assert_eq!(settings.host_builtins.label(), "node@18");
        assert_eq!(settings.host_builtins.names.len(), 2);
        assert_eq!(
            settings.entries[&TargetKind::Client].output,
            "__sapper__/build/client"
        );
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = parse_config("").unwrap();
        let settings = ConfigMerger::new(config)
            .into_settings(Utf8Path::new("/app"))
            .unwrap();
        assert_eq!(settings.aliases.len(), 5);
        assert_eq!(settings.dedupe.as_deref(), Some("svelte"));
        assert_eq!(settings.framework_namespace, "@sapper");
        assert_eq!(settings.host_builtins.label(), "node@20");
        assert!(settings.entries.is_empty());
    }

    #[test]
    fn test_empty_dedupe_disables_it() {
        let config = parse_config("[resolve]\ndedupe = \"\"\n").unwrap();
        let settings = ConfigMerger::new(config)
            .into_settings(Utf8Path::new("/app"))
            .unwrap();
        assert_eq!(settings.dedupe, None);
    }

    #[test]
    fn test_unknown_entry_target_is_rejected() {
        let config = parse_config("[entries.edge]\ninput = \"a\"\noutput = \"b\"\n").unwrap();
        let err = ConfigMerger::new(config)
            .into_settings(Utf8Path::new("/app"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown target `edge`"));
    }

    #[test]
    fn test_typescript_cli_or_config() {
        let on = parse_config("[build]\ntypescript = true\n").unwrap();
        assert!(ConfigMerger::new(on).typescript(false));
        let off = BundleplanConfig::default();
        assert!(ConfigMerger::new(off.clone()).typescript(true));
        assert!(!ConfigMerger::new(off).typescript(false));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(parse_config("[[alias]]\nfind = ").is_err());
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());
        assert!(load_or_default(&root).unwrap().alias.is_empty());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }
}
