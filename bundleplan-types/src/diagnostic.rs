use serde::{Deserialize, Serialize};

/// Code emitted by the bundler for an import cycle.
pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";

/// A warning emitted while building a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub code: String,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
