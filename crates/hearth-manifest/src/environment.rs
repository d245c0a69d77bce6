//! Execution environments and runtime-environment classification.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Environment variable holding the raw runtime environment label.
pub const RUNTIME_ENV_VAR: &str = "APP_ENV";

/// Execution context the application was launched in.
///
/// Provider and preload entries declare which contexts they activate in.
/// [`AppEnvironment::Unknown`] never matches any entry.
///
/// # Example
///
/// ```
/// use hearth_manifest::AppEnvironment;
///
/// let env: AppEnvironment = "console".parse().expect("known environment");
/// assert_eq!(env, AppEnvironment::Console);
/// assert_eq!(env.as_str(), "console");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppEnvironment {
    /// HTTP server process.
    Web,
    /// Command-line process.
    Console,
    /// Test runner process.
    Test,
    /// Interactive shell.
    Repl,
    /// Not yet decided; nothing is filtered in.
    #[default]
    Unknown,
}

impl AppEnvironment {
    /// Environments an entry may declare.
    pub const KNOWN: [Self; 4] = [Self::Web, Self::Console, Self::Test, Self::Repl];

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` for every variant except [`AppEnvironment::Unknown`].
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Error returned when a string names no [`AppEnvironment`].
pub type AppEnvironmentParseError = strum::ParseError;

/// Non-empty set of known environments an entry activates in.
///
/// Iteration follows the canonical order `web, console, test, repl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvironmentSet(BTreeSet<AppEnvironment>);

impl Default for EnvironmentSet {
    fn default() -> Self {
        Self::all()
    }
}

impl EnvironmentSet {
    /// Every known environment.
    #[must_use]
    pub fn all() -> Self {
        Self(AppEnvironment::KNOWN.into_iter().collect())
    }

    /// Builds a set from `environments`.
    ///
    /// Returns `None` when the input is empty or mentions
    /// [`AppEnvironment::Unknown`].
    #[must_use]
    pub fn new(environments: impl IntoIterator<Item = AppEnvironment>) -> Option<Self> {
        let set: BTreeSet<_> = environments.into_iter().collect();
        if set.is_empty() || set.contains(&AppEnvironment::Unknown) {
            return None;
        }
        Some(Self(set))
    }

    /// Whether an entry with this set activates in `target`.
    ///
    /// Always `false` for [`AppEnvironment::Unknown`].
    #[must_use]
    pub fn allows(&self, target: AppEnvironment) -> bool {
        target.is_known() && self.0.contains(&target)
    }

    /// Iterates in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = AppEnvironment> + '_ {
        self.0.iter().copied()
    }
}

/// Canonical runtime environment derived from the raw `APP_ENV` value.
///
/// # Example
///
/// ```
/// use hearth_manifest::RuntimeEnvironment;
///
/// assert_eq!(RuntimeEnvironment::classify(Some("prod")), RuntimeEnvironment::Production);
/// assert_eq!(RuntimeEnvironment::classify(Some("Staging")).as_str(), "staging");
/// assert_eq!(RuntimeEnvironment::classify(None), RuntimeEnvironment::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeEnvironment {
    /// `dev`, `develop` or `development`.
    Development,
    /// `prod` or `production`.
    Production,
    /// `test` or `testing`.
    Test,
    /// Any other non-empty label, lower-cased.
    Other(String),
    /// No label was provided.
    Unknown,
}

impl RuntimeEnvironment {
    /// Normalises a raw environment label. Total: never fails.
    ///
    /// Matching is case-insensitive; labels outside the known aliases pass
    /// through lower-cased. Missing or empty input yields `Unknown`.
    #[must_use]
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(label) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::Unknown;
        };
        let lowered = label.to_lowercase();
        match lowered.as_str() {
            "dev" | "develop" | "development" => Self::Development,
            "prod" | "production" => Self::Production,
            "test" | "testing" => Self::Test,
            _ => Self::Other(lowered),
        }
    }

    /// Canonical label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
            Self::Other(label) => label.as_str(),
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
