//! Loading the configuration tree from the application's config directory.

use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::tree::ConfigTree;

const CONFIG_TARGET: &str = "hearth::config";

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration tree from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a file cannot be read or parsed.
    fn load(&self, config_dir: &Utf8Path) -> Result<ConfigTree, ConfigError>;
}

/// Loader reading every `*.toml` and `*.json` file in the config directory.
///
/// Each file becomes a top-level key named after its stem, so
/// `config/database.toml` is reachable as `database.*`. Sub-directories are
/// ignored and a missing directory yields an empty tree. When two files
/// share a stem, the JSON file wins because files are visited in name order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryConfigLoader;

impl ConfigLoader for DirectoryConfigLoader {
    fn load(&self, config_dir: &Utf8Path) -> Result<ConfigTree, ConfigError> {
        let entries = match fs::read_dir(config_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(
                    target: CONFIG_TARGET,
                    directory = %config_dir,
                    "config directory missing, using empty tree"
                );
                return Ok(ConfigTree::default());
            }
            Err(error) => return Err(ConfigError::read(config_dir, error)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let dir_entry = entry.map_err(|error| ConfigError::read(config_dir, error))?;
            let path = Utf8PathBuf::from_path_buf(dir_entry.path()).map_err(|_| {
                ConfigError::NonUtf8Path {
                    directory: config_dir.to_owned(),
                }
            })?;
            if path.is_file() && matches!(path.extension(), Some("toml" | "json")) {
                files.push(path);
            }
        }
        files.sort();

        let mut tree = ConfigTree::default();
        for path in files {
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let section = read_section(&path)?;
            debug!(target: CONFIG_TARGET, file = %path, key = stem, "loaded config file");
            tree.insert(stem, section);
        }
        Ok(tree)
    }
}

fn read_section(path: &Utf8Path) -> Result<Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|error| ConfigError::read(path, error))?;
    let value: Value = if path.extension() == Some("toml") {
        toml::from_str(&text).map_err(|error| ConfigError::Syntax {
            path: path.to_owned(),
            message: error.to_string(),
        })?
    } else {
        serde_json::from_str(&text).map_err(|error| ConfigError::Syntax {
            path: path.to_owned(),
            message: error.to_string(),
        })?
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err(ConfigError::NotATable {
            path: path.to_owned(),
        })
    }
}

/// Loader serving a fixed tree regardless of the directory.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigLoader {
    tree: ConfigTree,
}

impl StaticConfigLoader {
    /// Wraps a prepared tree.
    #[must_use]
    pub const fn new(tree: ConfigTree) -> Self {
        Self { tree }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _config_dir: &Utf8Path) -> Result<ConfigTree, ConfigError> {
        Ok(self.tree.clone())
    }
}
