//! Embeddable core library for bundleplan.
//!
//! Provides a clap-free entry point suitable for linking into a bundler host or a
//! dev server.
//!
//! # Port traits
//!
//! Stage execution and artifact emission are abstracted behind traits in [`ports`]:
//! - [`StageTransform`](ports::StageTransform): one stage's effect on a module graph
//! - [`PipelineExecutor`](ports::PipelineExecutor): run one target pipeline
//! - [`ArtifactSink`](ports::ArtifactSink): receive finished artifacts
//! - [`DependencySource`](ports::DependencySource): declared runtime dependencies
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`BuildOrchestrator::build_all`](orchestrator::BuildOrchestrator::build_all): plan all three targets
//! - [`execute_all`](execute::execute_all): run planned pipelines in parallel, fail-fast

pub mod adapters;
pub mod execute;
pub mod orchestrator;
pub mod ports;
pub mod settings;

pub use execute::{CancelSignal, Cancelled, ExecuteError, GraphExecutor, execute_all};
pub use orchestrator::BuildOrchestrator;
pub use settings::BuildSettings;

// Re-export the domain pieces embedders need so they don't depend on bundleplan-domain directly.
pub use bundleplan_domain::{AliasResolver, DiagnosticFilter, FileProbe, FsFileProbe, HostBuiltins, Resolution};
