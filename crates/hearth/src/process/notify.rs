//! Parent-process notification over a Unix datagram socket.
//!
//! A supervising process that wants to know when the application is ready
//! exports [`NOTIFY_SOCKET_ENV_VAR`] pointing at a bound datagram socket.
//! Without it, notifications are silently skipped.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use hearth_config::EnvironmentSnapshot;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::PROCESS_TARGET;

/// Environment variable naming the parent's notification socket.
pub const NOTIFY_SOCKET_ENV_VAR: &str = "HEARTH_NOTIFY_SOCKET";

/// Errors raised while notifying the parent process.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The datagram could not be delivered.
    #[error("failed to notify '{socket}': {source}")]
    Send {
        /// Destination socket.
        socket: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Delivers messages to whatever supervises the process.
pub trait Notifier: Send + Sync {
    /// Sends `message`; a no-op when there is nobody to tell.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when a channel exists but delivery fails.
    fn notify(&self, message: &Value) -> Result<(), NotifyError>;
}

/// Notifier writing compact JSON datagrams to a Unix socket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketNotifier {
    socket: Option<Utf8PathBuf>,
}

impl SocketNotifier {
    /// Notifier targeting `socket`.
    #[must_use]
    pub fn new(socket: impl Into<Utf8PathBuf>) -> Self {
        Self {
            socket: Some(socket.into()),
        }
    }

    /// Notifier that never sends anything.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { socket: None }
    }

    /// Reads the socket path from `env`. Empty values count as unset.
    #[must_use]
    pub fn from_env(env: &EnvironmentSnapshot) -> Self {
        env.get(NOTIFY_SOCKET_ENV_VAR)
            .filter(|path| !path.is_empty())
            .map_or_else(Self::disconnected, Self::new)
    }

    /// Destination socket, if any.
    #[must_use]
    pub fn socket(&self) -> Option<&Utf8Path> {
        self.socket.as_deref()
    }
}

impl Notifier for SocketNotifier {
    fn notify(&self, message: &Value) -> Result<(), NotifyError> {
        let Some(socket) = self.socket.as_ref() else {
            debug!(target: PROCESS_TARGET, "no notification channel, skipping");
            return Ok(());
        };
        send(socket, message.to_string().as_bytes()).map_err(|source| NotifyError::Send {
            socket: socket.clone(),
            source,
        })
    }
}

#[cfg(unix)]
fn send(socket: &Utf8Path, payload: &[u8]) -> io::Result<()> {
    use std::os::unix::net::UnixDatagram;

    let sender = UnixDatagram::unbound()?;
    sender.send_to(payload, socket)?;
    debug!(target: PROCESS_TARGET, socket = %socket, "parent notified");
    Ok(())
}

#[cfg(not(unix))]
fn send(socket: &Utf8Path, _payload: &[u8]) -> io::Result<()> {
    debug!(target: PROCESS_TARGET, socket = %socket, "notification sockets need unix, skipping");
    Ok(())
}
