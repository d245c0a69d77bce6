//! Coarse application progress markers.

use strum::{AsRefStr, Display};

/// The application's position in its one-way lifecycle.
///
/// Variants are ordered: `Created < Initiated < Booted < Ready < Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationState {
    /// Constructed; nothing has been loaded.
    #[default]
    Created,
    /// Manifest, config and environment snapshot are loaded.
    Initiated,
    /// Providers have registered and booted.
    Booted,
    /// Providers have started, preloads are imported.
    Ready,
    /// Shutdown hooks have run.
    Terminated,
}
