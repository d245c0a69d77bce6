//! Normalised manifest value types.
//!
//! A [`Manifest`] is produced only by [`Manifest::parse`], which accepts the
//! raw rc-file object and rewrites every variant form (bare module
//! specifiers, single-string file lists, boolean bundler switches) into the
//! single canonical shape defined here. Nothing downstream ever has to
//! branch on how an entry was written.

mod parser;

use std::collections::BTreeMap;
use std::fmt;

use hearth_config::Directories;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::environment::{AppEnvironment, EnvironmentSet};
use crate::error::ManifestError;

/// Default test-runner timeout in milliseconds.
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 2000;

/// Identifier of a module resolved later through an importer.
///
/// # Example
///
/// ```
/// use hearth_manifest::ModuleSpecifier;
///
/// let specifier = ModuleSpecifier::new("providers/app");
/// assert_eq!(specifier.as_str(), "providers/app");
/// assert_eq!(specifier.to_string(), "providers/app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleSpecifier(String);

impl ModuleSpecifier {
    /// Wraps a specifier string.
    #[must_use]
    pub fn new(specifier: impl Into<String>) -> Self {
        Self(specifier.into())
    }

    /// Returns the specifier text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleSpecifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleSpecifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A side-effect module imported once providers have started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadEntry {
    file: ModuleSpecifier,
    environment: EnvironmentSet,
    optional: bool,
}

impl PreloadEntry {
    /// Creates an entry active in `environment`.
    #[must_use]
    pub fn new(file: impl Into<ModuleSpecifier>, environment: EnvironmentSet) -> Self {
        Self {
            file: file.into(),
            environment,
            optional: false,
        }
    }

    /// Marks the entry optional: a missing module is skipped silently.
    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Module to import.
    #[must_use]
    pub const fn file(&self) -> &ModuleSpecifier {
        &self.file
    }

    /// Environments the entry activates in.
    #[must_use]
    pub const fn environment(&self) -> &EnvironmentSet {
        &self.environment
    }

    /// Whether a missing module is tolerated.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the entry activates in `target`.
    #[must_use]
    pub fn is_active_in(&self, target: AppEnvironment) -> bool {
        self.environment.allows(target)
    }
}

/// A provider module registered during boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderEntry {
    file: ModuleSpecifier,
    environment: EnvironmentSet,
}

impl ProviderEntry {
    /// Creates an entry active in `environment`.
    #[must_use]
    pub fn new(file: impl Into<ModuleSpecifier>, environment: EnvironmentSet) -> Self {
        Self {
            file: file.into(),
            environment,
        }
    }

    /// Module exporting the provider class.
    #[must_use]
    pub const fn file(&self) -> &ModuleSpecifier {
        &self.file
    }

    /// Environments the entry activates in.
    #[must_use]
    pub const fn environment(&self) -> &EnvironmentSet {
        &self.environment
    }

    /// Whether the entry activates in `target`.
    #[must_use]
    pub fn is_active_in(&self, target: AppEnvironment) -> bool {
        self.environment.allows(target)
    }
}

/// Glob of files copied to the build output, optionally restarting the dev
/// server on change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaFileEntry {
    pattern: String,
    reload_server: bool,
}

impl MetaFileEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(pattern: impl Into<String>, reload_server: bool) -> Self {
        Self {
            pattern: pattern.into(),
            reload_server,
        }
    }

    /// Glob pattern.
    #[must_use]
    pub const fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether a change restarts the dev server.
    #[must_use]
    pub const fn reload_server(&self) -> bool {
        self.reload_server
    }
}

/// One named group of test files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    name: String,
    files: Vec<String>,
    directories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

impl TestSuite {
    /// Suite name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// File globs, in declaration order.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Glob parent of each file pattern, index-aligned with [`Self::files`].
    #[must_use]
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    /// Per-suite timeout override in milliseconds.
    #[must_use]
    pub const fn timeout(&self) -> Option<u64> {
        self.timeout
    }
}

/// Test runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    suites: Vec<TestSuite>,
    timeout: u64,
    force_exit: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            suites: Vec::new(),
            timeout: DEFAULT_TEST_TIMEOUT_MS,
            force_exit: true,
        }
    }
}

impl TestConfig {
    /// Configured suites.
    #[must_use]
    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    /// Global timeout in milliseconds.
    #[must_use]
    pub const fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Whether the runner exits once suites finish.
    #[must_use]
    pub const fn force_exit(&self) -> bool {
        self.force_exit
    }
}

/// External command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundlerCommand {
    command: String,
    args: Vec<String>,
}

impl BundlerCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Executable name.
    #[must_use]
    pub const fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Asset bundler integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsBundlerConfig {
    name: String,
    dev_server: BundlerCommand,
    build: BundlerCommand,
}

impl AssetsBundlerConfig {
    /// Bundler name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Command starting the dev server.
    #[must_use]
    pub const fn dev_server(&self) -> &BundlerCommand {
        &self.dev_server
    }

    /// Command producing a production build.
    #[must_use]
    pub const fn build(&self) -> &BundlerCommand {
        &self.build
    }
}

/// Tri-state bundler setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssetsBundler {
    /// Not mentioned in the rc file.
    #[default]
    Unset,
    /// Explicitly disabled with `false`.
    Disabled,
    /// Fully configured.
    Enabled(AssetsBundlerConfig),
}

impl AssetsBundler {
    /// Returns `true` when the rc file did not mention a bundler.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns the configuration when enabled.
    #[must_use]
    pub const fn config(&self) -> Option<&AssetsBundlerConfig> {
        match self {
            Self::Enabled(config) => Some(config),
            Self::Unset | Self::Disabled => None,
        }
    }
}

impl Serialize for AssetsBundler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Enabled(config) => config.serialize(serializer),
        }
    }
}

/// The normalised rc file.
///
/// Serialising a manifest yields its canonical JSON form; parsing that form
/// again produces an equal manifest. The unvalidated input is retained for
/// diagnostics through [`Manifest::raw`] and takes no part in equality.
///
/// # Example
///
/// ```
/// use hearth_manifest::Manifest;
/// use serde_json::json;
///
/// let manifest = Manifest::parse(&json!({})).expect("empty manifest is valid");
/// assert!(manifest.providers().is_empty());
/// assert_eq!(manifest.tests().timeout(), 2000);
/// assert!(manifest.tests().force_exit());
/// assert_eq!(manifest.directories().get("config"), Some("config"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    typescript: bool,
    directories: Directories,
    preloads: Vec<PreloadEntry>,
    meta_files: Vec<MetaFileEntry>,
    providers: Vec<ProviderEntry>,
    commands: Vec<ModuleSpecifier>,
    #[serde(rename = "commandsAliases")]
    command_aliases: BTreeMap<String, String>,
    tests: TestConfig,
    #[serde(skip_serializing_if = "AssetsBundler::is_unset")]
    assets_bundler: AssetsBundler,
    #[serde(skip)]
    raw: Value,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            typescript: true,
            directories: hearth_config::default_directories(),
            preloads: Vec::new(),
            meta_files: Vec::new(),
            providers: Vec::new(),
            commands: Vec::new(),
            command_aliases: BTreeMap::new(),
            tests: TestConfig::default(),
            assets_bundler: AssetsBundler::Unset,
            raw: Value::Object(serde_json::Map::new()),
        }
    }
}

impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.typescript == other.typescript
            && self.directories == other.directories
            && self.preloads == other.preloads
            && self.meta_files == other.meta_files
            && self.providers == other.providers
            && self.commands == other.commands
            && self.command_aliases == other.command_aliases
            && self.tests == other.tests
            && self.assets_bundler == other.assets_bundler
    }
}

impl Manifest {
    /// Validates and normalises a raw rc-file object.
    ///
    /// `null` is treated as an empty object. Unknown top-level keys are kept
    /// in [`Manifest::raw`] and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] naming the first malformed entry and the
    /// field that is missing or has the wrong shape.
    pub fn parse(raw: &Value) -> Result<Self, ManifestError> {
        parser::parse(raw)
    }

    /// Whether the project is written with type annotations compiled ahead
    /// of time.
    #[must_use]
    pub const fn typescript(&self) -> bool {
        self.typescript
    }

    /// Directory map: built-in defaults overlaid with user entries.
    #[must_use]
    pub const fn directories(&self) -> &Directories {
        &self.directories
    }

    /// Preload entries in declaration order.
    #[must_use]
    pub fn preloads(&self) -> &[PreloadEntry] {
        &self.preloads
    }

    /// Meta-file entries in declaration order.
    #[must_use]
    pub fn meta_files(&self) -> &[MetaFileEntry] {
        &self.meta_files
    }

    /// Provider entries in declaration order.
    #[must_use]
    pub fn providers(&self) -> &[ProviderEntry] {
        &self.providers
    }

    /// Command-loader specifiers in declaration order.
    #[must_use]
    pub fn commands(&self) -> &[ModuleSpecifier] {
        &self.commands
    }

    /// Command aliases, alias to command name.
    #[must_use]
    pub const fn command_aliases(&self) -> &BTreeMap<String, String> {
        &self.command_aliases
    }

    /// Test runner settings.
    #[must_use]
    pub const fn tests(&self) -> &TestConfig {
        &self.tests
    }

    /// Asset bundler setting.
    #[must_use]
    pub const fn assets_bundler(&self) -> &AssetsBundler {
        &self.assets_bundler
    }

    /// The input this manifest was parsed from.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Canonical JSON form of the normalised manifest.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
