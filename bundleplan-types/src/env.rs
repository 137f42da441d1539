use crate::error::BuildError;
use crate::target::TargetKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Mode::Development)
    }

    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            other => Err(BuildError::configuration(format!(
                "unrecognized mode '{other}' (expected 'development' or 'production')"
            ))),
        }
    }
}

/// Immutable snapshot of the flags that affect a build.
///
/// Created once at orchestration start and threaded by reference to every
/// component. There are no setters: a different build needs a different value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentContext {
    mode: Mode,
    legacy_build: bool,
    is_browser: bool,
    #[serde(default)]
    typescript: bool,
}

impl EnvironmentContext {
    pub fn new(mode: Mode, legacy_build: bool, is_browser: bool) -> Self {
        Self {
            mode,
            legacy_build,
            is_browser,
            typescript: false,
        }
    }

    /// Build a context from raw external inputs.
    ///
    /// Fails with [`BuildError::Configuration`] when `mode` is not one of the two
    /// recognized values.
    pub fn from_inputs(mode: &str, legacy_build: bool, is_browser: bool) -> Result<Self, BuildError> {
        let mode = mode.trim().parse::<Mode>()?;
        Ok(Self::new(mode, legacy_build, is_browser))
    }

    /// Same context with the typed-source stage switched on or off.
    pub fn with_typescript(self, typescript: bool) -> Self {
        Self { typescript, ..self }
    }

    /// The context as seen by one target: `is_browser` follows the runtime the
    /// target's output executes in.
    pub fn for_target(self, kind: TargetKind) -> Self {
        Self {
            is_browser: kind.runs_in_browser(),
            ..self
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn legacy_build(&self) -> bool {
        self.legacy_build
    }

    pub fn is_browser(&self) -> bool {
        self.is_browser
    }

    pub fn typescript(&self) -> bool {
        self.typescript
    }

    pub fn is_dev(&self) -> bool {
        self.mode.is_development()
    }
}
