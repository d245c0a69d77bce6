use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default log filter expression used when the config tree does not set one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable overriding the configured log filter.
pub const LOG_LEVEL_ENV_VAR: &str = "APP_LOG_LEVEL";

const DEFAULT_DIRECTORIES: &[(&str, &str)] = &[
    ("config", "config"),
    ("commands", "commands"),
    ("contracts", "contracts"),
    ("public", "public"),
    ("providers", "providers"),
    ("languageFiles", "resources/lang"),
    ("migrations", "database/migrations"),
    ("seeders", "database/seeders"),
    ("factories", "database/factories"),
    ("views", "resources/views"),
    ("start", "start"),
    ("tmp", "tmp"),
    ("tests", "tests"),
    ("httpControllers", "app/controllers"),
    ("models", "app/models"),
    ("services", "app/services"),
    ("exceptions", "app/exceptions"),
    ("mails", "app/mails"),
    ("middleware", "app/middleware"),
    ("policies", "app/policies"),
    ("validators", "app/validators"),
    ("events", "app/events"),
    ("listeners", "app/listeners"),
    ("stubs", "stubs"),
];

/// Returns the built-in directory conventions.
#[must_use]
pub fn default_directories() -> Directories {
    Directories::default()
}

/// Named application directories, relative to the application root.
///
/// Keys follow the manifest spelling (`httpControllers`, `languageFiles`).
/// Unknown keys are allowed so applications can declare their own
/// directories next to the conventional ones.
///
/// # Example
///
/// ```
/// use hearth_config::Directories;
///
/// let directories = Directories::default();
/// assert_eq!(directories.get("httpControllers"), Some("app/controllers"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directories(BTreeMap<String, String>);

impl Default for Directories {
    fn default() -> Self {
        Self(
            DEFAULT_DIRECTORIES
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        )
    }
}

impl Directories {
    /// Builds a directory map without any of the built-in entries.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Looks up the relative path registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Registers or replaces a directory.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Shallow-merges `overrides` over `self`; entries in `overrides` win.
    #[must_use]
    pub fn merged_with(mut self, overrides: Self) -> Self {
        self.0.extend(overrides.0);
        self
    }

    /// Iterates over the registered directories in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of registered directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no directory is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Directories {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
