use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three independently configured build outputs.
///
/// Declaration order is the canonical output order (`Ord` is derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Client,
    Server,
    #[serde(rename = "serviceworker")]
    ServiceWorker,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Client, TargetKind::Server, TargetKind::ServiceWorker];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Client => "client",
            TargetKind::Server => "server",
            TargetKind::ServiceWorker => "serviceworker",
        }
    }

    /// Whether the emitted bundle executes in a browser runtime.
    pub fn runs_in_browser(self) -> bool {
        !matches!(self, TargetKind::Server)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(TargetKind::Client),
            "server" => Ok(TargetKind::Server),
            "serviceworker" => Ok(TargetKind::ServiceWorker),
            other => Err(BuildError::UnknownTarget {
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        for kind in TargetKind::ALL {
            assert_eq!(kind.to_string().parse::<TargetKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_unknown_is_unknown_target() {
        let err = "edge-worker".parse::<TargetKind>().unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownTarget {
                kind: "edge-worker".to_string()
            }
        );
    }

    #[test]
    fn only_server_runs_outside_browser() {
        assert!(TargetKind::Client.runs_in_browser());
        assert!(!TargetKind::Server.runs_in_browser());
        assert!(TargetKind::ServiceWorker.runs_in_browser());
    }
}
