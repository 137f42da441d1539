use crate::ports::FileProbe;
use bundleplan_types::BuildError;
use bundleplan_types::stage::AliasEntry;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Candidate extensions tried in order when a specifier has no file of its own:
/// source script, stylesheet, compiled stylesheet, typed source, component.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".scss", ".css", ".ts", ".svelte"];

const DEFAULT_ALIAS_NAMES: &[&str] = &["styles", "components", "pages", "store", "locales"];

/// The fixed alias table: each name maps to `<root>/src/<name>/`.
pub fn default_alias_table(root: &Utf8Path) -> Vec<AliasEntry> {
    DEFAULT_ALIAS_NAMES
        .iter()
        .map(|name| AliasEntry::new(*name, format!("{}/", root.join("src").join(name))))
        .collect()
}

/// Outcome of alias resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Utf8PathBuf),
    /// No alias applies, or no candidate file exists. Default module resolution
    /// takes over.
    Unresolved,
}

impl Resolution {
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Resolution::Resolved(p) => Some(p),
            Resolution::Unresolved => None,
        }
    }
}

/// Maps symbolic source-tree prefixes to physical locations.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    entries: Vec<AliasEntry>,
    extensions: Vec<String>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

impl AliasResolver {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            entries: Vec::new(),
            extensions,
        }
    }

    /// Build a resolver from a whole table, failing on the first duplicate.
    pub fn from_entries(entries: &[AliasEntry], extensions: Vec<String>) -> Result<Self, BuildError> {
        let mut resolver = Self::new(extensions);
        for entry in entries {
            resolver.register(&entry.symbolic_name, &entry.physical_path)?;
        }
        Ok(resolver)
    }

    pub fn register(&mut self, symbolic_name: &str, physical_path: &str) -> Result<(), BuildError> {
        if symbolic_name.is_empty() {
            return Err(BuildError::configuration("alias symbolic name must not be empty"));
        }
        if self.entries.iter().any(|e| e.symbolic_name == symbolic_name) {
            return Err(BuildError::DuplicateAlias {
                name: symbolic_name.to_string(),
            });
        }
        self.entries.push(AliasEntry::new(symbolic_name, physical_path));
        Ok(())
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The entry whose symbolic name is the specifier itself or a leading path
    /// segment of it, with the remainder after the name.
    fn matching_entry<'s>(&self, specifier: &'s str) -> Option<(&AliasEntry, &'s str)> {
        self.entries.iter().find_map(|entry| {
            let rest = specifier.strip_prefix(entry.symbolic_name.as_str())?;
            if rest.is_empty() || rest.starts_with('/') {
                Some((entry, rest))
            } else {
                None
            }
        })
    }

    /// Physical paths probed for `specifier`, in order. Empty when no alias applies.
    pub fn candidates(&self, specifier: &str) -> Vec<Utf8PathBuf> {
        let Some((entry, rest)) = self.matching_entry(specifier) else {
            return Vec::new();
        };

        let base = format!("{}{}", entry.physical_path.trim_end_matches('/'), rest);
        let base = base.trim_end_matches('/');

        let mut out = Vec::with_capacity(1 + self.extensions.len() * 2);
        if !rest.is_empty() {
            out.push(Utf8PathBuf::from(base));
            for ext in &self.extensions {
                out.push(Utf8PathBuf::from(format!("{base}{ext}")));
            }
        }
        for ext in &self.extensions {
            out.push(Utf8PathBuf::from(format!("{base}/index{ext}")));
        }
        out
    }

    pub fn resolve(&self, specifier: &str, probe: &dyn FileProbe) -> Resolution {
        let candidates = self.candidates(specifier);
        if candidates.is_empty() {
            return Resolution::Unresolved;
        }

        match candidates.into_iter().find(|c| probe.is_file(c)) {
            Some(path) => {
                debug!(specifier, resolved = path.as_str(), "alias resolved");
                Resolution::Resolved(path)
            }
            None => {
                debug!(specifier, "alias matched but no candidate file exists");
                Resolution::Unresolved
            }
        }
    }
}
