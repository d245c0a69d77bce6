use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{DEFAULT_LOG_FILTER, LOG_LEVEL_ENV_VAR};
use crate::env::EnvironmentSnapshot;
use crate::tree::ConfigTree;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Logger settings resolved from the `logger` section of the config tree.
///
/// # Example
///
/// ```
/// use hearth_config::{ConfigTree, EnvironmentSnapshot, LogFormat, LoggerConfig};
/// use serde_json::json;
///
/// let tree = ConfigTree::new(json!({ "logger": { "level": "debug", "format": "compact" } }));
/// let logger = LoggerConfig::resolve(&tree, &EnvironmentSnapshot::default());
/// assert_eq!(logger.filter(), "debug");
/// assert_eq!(logger.format(), LogFormat::Compact);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    filter: String,
    format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
            format: LogFormat::default(),
        }
    }
}

impl LoggerConfig {
    /// Builds logger settings from explicit values.
    #[must_use]
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
        }
    }

    /// Reads `logger.level` and `logger.format` from the tree.
    ///
    /// `APP_LOG_LEVEL` in the environment snapshot wins over the configured
    /// level. Unparseable formats fall back to the default with a warning.
    #[must_use]
    pub fn resolve(config: &ConfigTree, env: &EnvironmentSnapshot) -> Self {
        let mut logger = Self::default();
        if let Some(level) = config.get("logger.level").and_then(|value| value.as_str()) {
            level.clone_into(&mut logger.filter);
        }
        if let Some(format) = config.get("logger.format").and_then(|value| value.as_str()) {
            match format.parse::<LogFormat>() {
                Ok(parsed) => logger.format = parsed,
                Err(error) => tracing::warn!(
                    target: "hearth::config",
                    format,
                    %error,
                    "ignoring unsupported log format"
                ),
            }
        }
        if let Some(level) = env.get(LOG_LEVEL_ENV_VAR).filter(|level| !level.is_empty()) {
            level.clone_into(&mut logger.filter);
        }
        logger
    }

    /// Filter expression handed to the subscriber.
    #[must_use]
    pub fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::json("json", LogFormat::Json)]
    #[case::compact("COMPACT", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
        assert_eq!(text.parse::<LogFormat>().expect("parse format"), expected);
    }

    #[test]
    fn defaults_apply_without_logger_section() {
        let logger = LoggerConfig::resolve(&ConfigTree::default(), &EnvironmentSnapshot::default());
        assert_eq!(logger, LoggerConfig::default());
        assert_eq!(logger.filter(), "info");
    }

    #[test]
    fn environment_level_overrides_config() {
        let tree = ConfigTree::new(json!({ "logger": { "level": "warn" } }));
        let env = EnvironmentSnapshot::from_iter([(LOG_LEVEL_ENV_VAR, "trace")]);
        let logger = LoggerConfig::resolve(&tree, &env);
        assert_eq!(logger.filter(), "trace");
    }

    #[test]
    fn unsupported_format_keeps_default() {
        let tree = ConfigTree::new(json!({ "logger": { "format": "xml" } }));
        let logger = LoggerConfig::resolve(&tree, &EnvironmentSnapshot::default());
        assert_eq!(logger.format(), LogFormat::Json);
    }
}
