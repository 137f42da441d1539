use bundleplan_types::BuildError;
use bundleplan_types::diagnostic::{CIRCULAR_DEPENDENCY, DiagnosticRecord};
use bundleplan_types::plan::DiagnosticPolicy;
use regex::Regex;
use tracing::debug;

/// Namespace of the application framework's internal packages.
pub const DEFAULT_FRAMEWORK_NAMESPACE: &str = "@sapper";

/// Drops cycle warnings that lie inside framework-internal code and forwards
/// everything else.
#[derive(Debug, Clone)]
pub struct DiagnosticFilter {
    code: String,
    namespace: String,
    pattern: Regex,
}

impl DiagnosticFilter {
    pub fn new(namespace: &str) -> Result<Self, BuildError> {
        Self::with_code(CIRCULAR_DEPENDENCY, namespace)
    }

    pub fn with_code(code: &str, namespace: &str) -> Result<Self, BuildError> {
        if namespace.trim().is_empty() {
            return Err(BuildError::configuration(
                "diagnostic framework namespace must not be empty",
            ));
        }
        // The namespace must appear as a whole path segment, with either separator.
        let pattern = Regex::new(&format!(r"[/\\]{}[/\\]", regex::escape(namespace)))
            .map_err(|e| BuildError::configuration(format!("framework namespace pattern: {e}")))?;
        Ok(Self {
            code: code.to_string(),
            namespace: namespace.to_string(),
            pattern,
        })
    }

    pub fn from_policy(policy: &DiagnosticPolicy) -> Result<Self, BuildError> {
        Self::with_code(&policy.code, &policy.namespace)
    }

    pub fn policy(&self) -> DiagnosticPolicy {
        DiagnosticPolicy {
            code: self.code.clone(),
            namespace: self.namespace.clone(),
        }
    }

    pub fn should_suppress(&self, diagnostic: &DiagnosticRecord) -> bool {
        diagnostic.code == self.code && self.pattern.is_match(&diagnostic.message)
    }

    /// Records that should reach the reporter, in their original order.
    pub fn forward(&self, records: impl IntoIterator<Item = DiagnosticRecord>) -> Vec<DiagnosticRecord> {
        records
            .into_iter()
            .filter(|r| {
                let suppress = self.should_suppress(r);
                if suppress {
                    debug!(code = r.code.as_str(), message = r.message.as_str(), "suppressed diagnostic");
                }
                !suppress
            })
            .collect()
    }
}
