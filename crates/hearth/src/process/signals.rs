//! Signal listeners backed by `signal-hook` iterators.
//!
//! Each listener owns a background thread draining a
//! [`Signals`] iterator for one signal. Handlers run on that thread, not in
//! the signal handler, so they may allocate, lock and log freely.

use std::ffi::c_int;
use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::debug;

use super::PROCESS_TARGET;

/// Raw signal number, e.g. [`signal_hook::consts::SIGTERM`].
pub type Signal = c_int;

/// Errors reported while installing a listener.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The signal cannot be handled (for instance `SIGKILL`).
    #[error("failed to install handler for signal {signal}: {source}")]
    Install {
        /// Requested signal.
        signal: Signal,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The listener thread could not be spawned.
    #[error("failed to spawn listener thread for signal {signal}: {source}")]
    Spawn {
        /// Requested signal.
        signal: Signal,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Handle to a running listener.
///
/// Dropping the handle leaves the listener running for the life of the
/// process; call [`close`](Self::close) to stop it.
#[derive(Debug)]
pub struct SignalListener {
    signal: Signal,
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalListener {
    /// Signal this listener handles.
    #[must_use]
    pub const fn signal(&self) -> Signal {
        self.signal
    }

    /// Returns `true` once the listener has stopped delivering signals.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Stops delivery and waits for the listener thread to exit.
    pub fn close(self) {
        self.handle.close();
        if self.thread.join().is_err() {
            debug!(
                target: PROCESS_TARGET,
                signal = self.signal,
                "signal handler panicked"
            );
        }
    }
}

/// Calls `handler` every time `signal` is delivered.
///
/// # Errors
///
/// Returns [`SignalError`] when the signal cannot be handled or the listener
/// thread fails to start.
pub fn listen<F>(signal: Signal, mut handler: F) -> Result<SignalListener, SignalError>
where
    F: FnMut(Signal) + Send + 'static,
{
    spawn(signal, move |signals| {
        for received in signals.forever() {
            handler(received);
        }
    })
}

/// Calls `handler` the first time `signal` is delivered, then stops.
///
/// # Errors
///
/// Returns [`SignalError`] when the signal cannot be handled or the listener
/// thread fails to start.
pub fn listen_once<F>(signal: Signal, handler: F) -> Result<SignalListener, SignalError>
where
    F: FnOnce(Signal) + Send + 'static,
{
    spawn(signal, move |signals| {
        if let Some(received) = signals.forever().next() {
            signals.handle().close();
            handler(received);
        }
    })
}

/// [`listen`] when `condition` holds, otherwise nothing.
///
/// # Errors
///
/// As for [`listen`].
pub fn listen_if<F>(
    condition: bool,
    signal: Signal,
    handler: F,
) -> Result<Option<SignalListener>, SignalError>
where
    F: FnMut(Signal) + Send + 'static,
{
    condition.then(|| listen(signal, handler)).transpose()
}

/// [`listen_once`] when `condition` holds, otherwise nothing.
///
/// # Errors
///
/// As for [`listen_once`].
pub fn listen_once_if<F>(
    condition: bool,
    signal: Signal,
    handler: F,
) -> Result<Option<SignalListener>, SignalError>
where
    F: FnOnce(Signal) + Send + 'static,
{
    condition.then(|| listen_once(signal, handler)).transpose()
}

fn spawn<F>(signal: Signal, drain: F) -> Result<SignalListener, SignalError>
where
    F: FnOnce(&mut Signals) + Send + 'static,
{
    let mut signals =
        Signals::new([signal]).map_err(|source| SignalError::Install { signal, source })?;
    let handle = signals.handle();
    let thread = thread::Builder::new()
        .name(format!("hearth-signal-{signal}"))
        .spawn(move || drain(&mut signals))
        .map_err(|source| SignalError::Spawn { signal, source })?;
    debug!(target: PROCESS_TARGET, signal, "signal listener installed");
    Ok(SignalListener {
        signal,
        handle,
        thread,
    })
}
