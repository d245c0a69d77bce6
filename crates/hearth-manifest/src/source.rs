//! Locating and reading the rc file from the application root.

use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ManifestError;

const LOG_TARGET: &str = "hearth::manifest";

/// Reads the raw rc file for an application.
///
/// `hearthrc.toml` is preferred over `hearthrc.json`. When neither exists the
/// raw manifest is an empty object, which parses to the default manifest.
///
/// # Example
///
/// ```
/// use hearth_manifest::RcFileSource;
///
/// let source = RcFileSource::new("/srv/shop");
/// assert_eq!(source.candidates()[0].as_str(), "/srv/shop/hearthrc.toml");
/// ```
#[derive(Debug, Clone)]
pub struct RcFileSource {
    app_root: Utf8PathBuf,
}

impl RcFileSource {
    /// File name of the TOML rc file.
    pub const TOML_FILE: &'static str = "hearthrc.toml";
    /// File name of the JSON rc file.
    pub const JSON_FILE: &'static str = "hearthrc.json";

    /// Creates a source rooted at `app_root`.
    #[must_use]
    pub fn new(app_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    /// Candidate paths in lookup order.
    #[must_use]
    pub fn candidates(&self) -> [Utf8PathBuf; 2] {
        [
            self.app_root.join(Self::TOML_FILE),
            self.app_root.join(Self::JSON_FILE),
        ]
    }

    /// Reads the first rc file that exists.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] when a present file cannot be read
    /// and [`ManifestError::Syntax`] when it is not valid TOML or JSON.
    pub fn read(&self) -> Result<Value, ManifestError> {
        for path in self.candidates() {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(target: LOG_TARGET, file = %path, "reading rc file");
                    return decode(&path, &text);
                }
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(ManifestError::Read {
                        path,
                        source: Arc::new(error),
                    });
                }
            }
        }
        debug!(
            target: LOG_TARGET,
            root = %self.app_root,
            "no rc file found, using empty manifest"
        );
        Ok(Value::Object(Map::new()))
    }
}

fn decode(path: &Utf8Path, text: &str) -> Result<Value, ManifestError> {
    let syntax = |message: String| ManifestError::Syntax {
        path: path.to_owned(),
        message,
    };
    if path.extension() == Some("toml") {
        toml::from_str(text).map_err(|error| syntax(error.to_string()))
    } else {
        serde_json::from_str(text).map_err(|error| syntax(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    struct AppRoot {
        _temp: TempDir,
        source: RcFileSource,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn app_root() -> AppRoot {
        let temp = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
        AppRoot {
            _temp: temp,
            source: RcFileSource::new(path.clone()),
            path,
        }
    }

    #[rstest]
    fn absent_rc_file_yields_empty_object(app_root: AppRoot) {
        assert_eq!(app_root.source.read().expect("read"), json!({}));
    }

    #[rstest]
    fn toml_is_preferred_over_json(app_root: AppRoot) {
        fs::write(
            app_root.path.join("hearthrc.toml"),
            "providers = [\"providers/app\"]\n",
        )
        .expect("write toml");
        fs::write(app_root.path.join("hearthrc.json"), r#"{"providers":[]}"#)
            .expect("write json");

        let raw = app_root.source.read().expect("read");
        assert_eq!(raw, json!({ "providers": ["providers/app"] }));
    }

    #[rstest]
    fn json_is_used_when_toml_is_absent(app_root: AppRoot) {
        fs::write(app_root.path.join("hearthrc.json"), r#"{"typescript":false}"#)
            .expect("write json");
        let raw = app_root.source.read().expect("read");
        assert_eq!(raw, json!({ "typescript": false }));
    }

    #[rstest]
    fn syntax_errors_name_the_file(app_root: AppRoot) {
        fs::write(app_root.path.join("hearthrc.json"), "{ providers").expect("write json");
        let error = app_root.source.read().expect_err("invalid json must fail");
        assert_eq!(error.code(), "E_RC_FILE_SYNTAX");
        assert!(error.to_string().contains("hearthrc.json"), "message: {error}");
    }
}
