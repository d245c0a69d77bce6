//! Path construction relative to the application root.
//!
//! Every helper joins its segments onto a conventional directory taken from
//! the manifest's `directories` map, so applications that relocate, say,
//! their views only change the rc file.

use camino::{Utf8Path, Utf8PathBuf};
use hearth_config::Directories;
use url::Url;

/// Resolves application paths from the root and directory map.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use hearth::AppPaths;
/// use hearth_config::Directories;
///
/// let paths = AppPaths::new("/srv/app", Directories::default());
/// assert_eq!(
///     paths.views_path(&["emails", "welcome.html"]),
///     Utf8PathBuf::from("/srv/app/resources/views/emails/welcome.html"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: Utf8PathBuf,
    directories: Directories,
}

macro_rules! directory_paths {
    ($($(#[$doc:meta])* $name:ident => $key:literal;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(&self, segments: &[&str]) -> Utf8PathBuf {
                self.directory_path($key, segments)
            }
        )+
    };
}

impl AppPaths {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, directories: Directories) -> Self {
        Self {
            root: root.into(),
            directories,
        }
    }

    /// Application root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory map in effect.
    #[must_use]
    pub const fn directories(&self) -> &Directories {
        &self.directories
    }

    /// Joins `segments` onto the application root.
    #[must_use]
    pub fn make_path(&self, segments: &[&str]) -> Utf8PathBuf {
        join(self.root.clone(), segments)
    }

    /// Expresses `path` relative to the application root.
    ///
    /// Paths outside the root are returned unchanged.
    #[must_use]
    pub fn relative_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        path.strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Utf8Path::to_path_buf)
    }

    /// Builds a `file://` URL for `segments` under the application root.
    ///
    /// Returns `None` when the root is not absolute.
    #[must_use]
    pub fn make_url(&self, segments: &[&str]) -> Option<Url> {
        Url::from_file_path(self.make_path(segments)).ok()
    }

    /// Joins `segments` onto the directory registered under `key`.
    ///
    /// Unknown keys resolve against the application root.
    #[must_use]
    pub fn directory_path(&self, key: &str, segments: &[&str]) -> Utf8PathBuf {
        let base = self.directories.get(key).unwrap_or_default();
        join(self.root.join(base), segments)
    }

    directory_paths! {
        /// Path inside the config directory.
        config_path => "config";
        /// Path inside the command loaders directory.
        commands_path => "commands";
        /// Path inside the contracts directory.
        contracts_path => "contracts";
        /// Path inside the public assets directory.
        public_path => "public";
        /// Path inside the providers directory.
        providers_path => "providers";
        /// Path inside the language files directory.
        language_files_path => "languageFiles";
        /// Path inside the migrations directory.
        migrations_path => "migrations";
        /// Path inside the seeders directory.
        seeders_path => "seeders";
        /// Path inside the model factories directory.
        factories_path => "factories";
        /// Path inside the views directory.
        views_path => "views";
        /// Path inside the preload (`start`) directory.
        start_path => "start";
        /// Path inside the scratch directory.
        tmp_path => "tmp";
        /// Path inside the tests directory.
        tests_path => "tests";
        /// Path inside the HTTP controllers directory.
        http_controllers_path => "httpControllers";
        /// Path inside the models directory.
        models_path => "models";
        /// Path inside the services directory.
        services_path => "services";
        /// Path inside the exceptions directory.
        exceptions_path => "exceptions";
        /// Path inside the mails directory.
        mails_path => "mails";
        /// Path inside the middleware directory.
        middleware_path => "middleware";
        /// Path inside the policies directory.
        policies_path => "policies";
        /// Path inside the validators directory.
        validators_path => "validators";
        /// Path inside the events directory.
        events_path => "events";
        /// Path inside the listeners directory.
        listeners_path => "listeners";
        /// Path inside the stubs directory.
        stubs_path => "stubs";
    }
}

fn join(base: Utf8PathBuf, segments: &[&str]) -> Utf8PathBuf {
    segments.iter().fold(base, |path, segment| path.join(segment))
}
