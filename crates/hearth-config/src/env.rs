//! Owned environment-variable snapshots.
//!
//! The snapshot is captured once while the application initialises and is
//! then passed by reference. Nothing downstream reads the process table
//! directly, which keeps lifecycle code deterministic under test.

use std::collections::BTreeMap;

use tracing::debug;

const CONFIG_TARGET: &str = "hearth::config";

/// Immutable copy of the environment variables visible at boot.
///
/// # Example
///
/// ```
/// use hearth_config::EnvironmentSnapshot;
///
/// let env = EnvironmentSnapshot::from_iter([("APP_ENV", "production")]);
/// assert_eq!(env.get("APP_ENV"), Some("production"));
/// assert!(env.get("HOME_DIR").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns `true` when `key` is present, even with an empty value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Iterates over all captured variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvironmentSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Source of the environment snapshot taken during `init`.
pub trait EnvLoader: Send + Sync {
    /// Captures the variables the application should see.
    fn load(&self) -> EnvironmentSnapshot;
}

/// Loader that copies the current process environment.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvLoader;

impl EnvLoader for ProcessEnvLoader {
    fn load(&self) -> EnvironmentSnapshot {
        std::env::vars_os()
            .filter_map(|(name, raw)| match (name.into_string(), raw.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (Ok(key), Err(_)) => {
                    debug!(
                        target: CONFIG_TARGET,
                        variable = %key,
                        "skipping environment variable with non-UTF-8 value"
                    );
                    None
                }
                (Err(key), _) => {
                    debug!(
                        target: CONFIG_TARGET,
                        variable = %key.to_string_lossy(),
                        "skipping environment variable with non-UTF-8 name"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Loader serving a fixed set of variables.
#[derive(Debug, Default, Clone)]
pub struct StaticEnvLoader {
    snapshot: EnvironmentSnapshot,
}

impl StaticEnvLoader {
    /// Wraps a prepared snapshot.
    #[must_use]
    pub const fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self { snapshot }
    }
}

impl EnvLoader for StaticEnvLoader {
    fn load(&self) -> EnvironmentSnapshot {
        self.snapshot.clone()
    }
}
