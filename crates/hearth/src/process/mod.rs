//! Thin wrappers over the host process: signal delivery and parent
//! notification.

mod notify;
mod signals;

pub use notify::{NOTIFY_SOCKET_ENV_VAR, Notifier, NotifyError, SocketNotifier};
pub use signals::{Signal, SignalError, SignalListener, listen, listen_if, listen_once, listen_once_if};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
