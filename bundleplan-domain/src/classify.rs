use bundleplan_types::target::TargetKind;
use std::collections::BTreeSet;

/// Node.js 20 built-in module names, as listed by `module.builtinModules`
/// (underscore-prefixed internals omitted).
pub const NODE_20_BUILTINS: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Explicit, versioned list of modules the host runtime provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBuiltins {
    pub runtime: String,
    pub version: String,
    pub names: BTreeSet<String>,
}

impl HostBuiltins {
    pub fn new(
        runtime: impl Into<String>,
        version: impl Into<String>,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            version: version.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn node20() -> Self {
        Self::new("node", "20", NODE_20_BUILTINS.iter().copied())
    }

    pub fn label(&self) -> String {
        format!("{}@{}", self.runtime, self.version)
    }
}

impl Default for HostBuiltins {
    fn default() -> Self {
        Self::node20()
    }
}

/// Decides which dependencies the server bundle leaves to the host runtime.
#[derive(Debug, Clone, Default)]
pub struct DependencyClassifier {
    builtins: HostBuiltins,
}

impl DependencyClassifier {
    pub fn new(builtins: HostBuiltins) -> Self {
        Self { builtins }
    }

    pub fn builtins(&self) -> &HostBuiltins {
        &self.builtins
    }

    /// Union of declared dependency names and host builtin names.
    pub fn classify<'a>(
        declared: impl IntoIterator<Item = &'a str>,
        builtins: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<String> {
        declared
            .into_iter()
            .chain(builtins)
            .map(str::to_string)
            .collect()
    }

    /// Only the server target is consulted; browser targets bundle everything.
    pub fn consulted_for(kind: TargetKind) -> bool {
        matches!(kind, TargetKind::Server)
    }

    /// External set for `kind`, empty for browser targets.
    pub fn externals_for(&self, kind: TargetKind, declared: &BTreeSet<String>) -> BTreeSet<String> {
        if !Self::consulted_for(kind) {
            return BTreeSet::new();
        }
        Self::classify(
            declared.iter().map(String::as_str),
            self.builtins.names.iter().map(String::as_str),
        )
    }
}
