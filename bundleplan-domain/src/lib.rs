//! Domain logic: turn an environment context into deterministic target pipelines.
//!
//! This crate owns *whether* and *in what order* a stage runs. It does not own what a
//! stage does to a module graph; that belongs to the external stage implementations.

mod alias;
mod classify;
mod diagnostics;
mod planner;
mod ports;
mod stages;

pub use alias::{AliasResolver, DEFAULT_EXTENSIONS, Resolution, default_alias_table};
pub use classify::{DependencyClassifier, HostBuiltins, NODE_20_BUILTINS};
pub use diagnostics::{DEFAULT_FRAMEWORK_NAMESPACE, DiagnosticFilter};
pub use planner::{DEFAULT_DEDUPE_PACKAGE, PlanContext, PlannerConfig, StagePlanner, is_deduped};
pub use ports::{FileProbe, FsFileProbe};
pub use stages::{StageDefinition, builtin_stages};
