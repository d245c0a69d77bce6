//! Package metadata read from the application's `Cargo.toml`.

use std::fs;
use std::io::ErrorKind;

use camino::Utf8Path;
use semver::Version;
use serde::Deserialize;

use crate::error::ConfigError;

const PACKAGE_FILE: &str = "Cargo.toml";

/// Name and version of the application package.
///
/// Both fields are optional: an application without a `Cargo.toml`, or one
/// inheriting its version from a workspace, simply reports `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    name: Option<String>,
    version: Option<Version>,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    name: Option<String>,
    version: Option<toml::Value>,
}

impl PackageMetadata {
    /// Builds metadata from known values.
    #[must_use]
    pub const fn new(name: Option<String>, version: Option<Version>) -> Self {
        Self { name, version }
    }

    /// Reads `Cargo.toml` from `app_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read,
    /// is not valid TOML, or declares a version that is not semver.
    pub fn read(app_root: &Utf8Path) -> Result<Self, ConfigError> {
        let path = app_root.join(PACKAGE_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => return Err(ConfigError::read(path, error)),
        };
        let manifest: CargoManifest = toml::from_str(&text).map_err(|error| ConfigError::Syntax {
            path: path.clone(),
            message: error.to_string(),
        })?;
        let Some(package) = manifest.package else {
            return Ok(Self::default());
        };
        let version = match package.version {
            Some(toml::Value::String(raw)) => Some(Version::parse(&raw).map_err(|source| {
                ConfigError::InvalidVersion {
                    path: path.clone(),
                    version: raw.clone(),
                    source,
                }
            })?),
            _ => None,
        };
        Ok(Self {
            name: package.name,
            version,
        })
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Package version.
    #[must_use]
    pub const fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }
}
