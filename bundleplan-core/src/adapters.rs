//! Default filesystem-backed port implementations.

use crate::ports::{Artifact, ArtifactSink, DependencySource};
use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

/// Reads the `dependencies` table of a `package.json`.
///
/// A missing manifest is not an error: the project simply declares nothing.
#[derive(Debug, Clone)]
pub struct PackageJsonSource {
    pub manifest: Utf8PathBuf,
}

impl PackageJsonSource {
    pub fn new(manifest: Utf8PathBuf) -> Self {
        Self { manifest }
    }

    pub fn in_root(root: &Utf8Path) -> Self {
        Self::new(root.join("package.json"))
    }
}

impl DependencySource for PackageJsonSource {
    fn declared_dependencies(&self) -> anyhow::Result<BTreeSet<String>> {
        if !self.manifest.is_file() {
            debug!(path = %self.manifest, "no package manifest");
            return Ok(BTreeSet::new());
        }
        let raw = fs_err::read_to_string(&self.manifest)?;
        let parsed: PackageManifest = serde_json::from_str(&raw)
            .with_context(|| format!("parse {}", self.manifest))?;
        Ok(parsed.dependencies.into_keys().collect())
    }
}

/// Fixed dependency list for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDependencySource {
    names: BTreeSet<String>,
}

impl InMemoryDependencySource {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl DependencySource for InMemoryDependencySource {
    fn declared_dependencies(&self) -> anyhow::Result<BTreeSet<String>> {
        Ok(self.names.clone())
    }
}

/// Writes each artifact as pretty JSON to `<out_dir>/<output or target>.json`.
///
/// Outputs must be relative paths that stay inside `out_dir`.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    pub out_dir: Utf8PathBuf,
}

impl FsArtifactSink {
    pub fn new(out_dir: Utf8PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path_for(&self, artifact: &Artifact) -> anyhow::Result<Utf8PathBuf> {
        let stem = artifact
            .output
            .clone()
            .unwrap_or_else(|| artifact.target.to_string());
        let escapes = Utf8Path::new(&stem).components().any(|c| {
            matches!(
                c,
                Utf8Component::Prefix(_) | Utf8Component::RootDir | Utf8Component::ParentDir
            )
        });
        if escapes {
            anyhow::bail!(
                "output `{stem}` of target {} is not a relative path inside {}",
                artifact.target,
                self.out_dir
            );
        }
        Ok(self.out_dir.join(format!("{stem}.json")))
    }
}

impl ArtifactSink for FsArtifactSink {
    fn emit(&self, artifact: &Artifact) -> anyhow::Result<()> {
        let path = self.path_for(artifact)?;
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        let json = serde_json::to_string_pretty(artifact).context("serialize artifact")?;
        fs_err::write(&path, json)?;
        debug!(kind = %artifact.target, path = %path, "artifact written");
        Ok(())
    }
}
