//! Configuration-time failures.
//!
//! Every variant is deterministic: the same inputs always fail the same way, so
//! nothing here is ever retried. Each aborts the whole build invocation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Invalid or missing environment input. Raised before any pipeline is planned.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The static alias table registers the same symbolic name twice.
    #[error("duplicate alias `{name}`")]
    DuplicateAlias { name: String },

    /// A target kind outside client, server and serviceworker was requested.
    #[error("unknown target `{kind}` (expected one of: client, server, serviceworker)")]
    UnknownTarget { kind: String },
}

impl BuildError {
    pub fn configuration(message: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
        }
    }

    /// Short machine-readable token for reports and logs.
    pub fn token(&self) -> &'static str {
        match self {
            BuildError::Configuration { .. } => "configuration",
            BuildError::DuplicateAlias { .. } => "duplicate_alias",
            BuildError::UnknownTarget { .. } => "unknown_target",
        }
    }
}
