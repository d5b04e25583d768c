//! Starting and stopping a relay session on a console.
//!
//! A console carries at most one session at a time. Starting while a session
//! is active hands back the existing [`StopHandle`]; stopping restores the
//! entry points captured when the session began and shuts the relay down.

use std::{
    io,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;

use crate::{
    console::{self, Console, EntryPoints},
    level::ConsoleLevel,
    relay::{RelayConfig, RelayHandle, TcpTransport, Transport},
    shim,
};

struct Session {
    console: Weak<Console>,
    originals: Mutex<Option<EntryPoints>>,
    relay: Arc<RelayHandle>,
}

/// Ends a relay session. Clones refer to the same session.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<Session>,
}

impl StopHandle {
    /// Restore the original entry points and shut the relay down.
    ///
    /// Only the first call has an effect.
    pub fn stop(&self) {
        let Some(originals) = self.inner.originals.lock().take() else {
            return;
        };
        if let Some(console) = self.inner.console.upgrade() {
            shim::restore(&console, originals);
            let mut slot = console.session.lock();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(self)) {
                *slot = None;
            }
        }
        self.inner.relay.close();
    }

    pub fn is_active(&self) -> bool {
        self.inner.originals.lock().is_some()
    }

    /// True when both handles belong to the same session.
    pub fn ptr_eq(&self, other: &StopHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The relay backing this session.
    pub fn relay(&self) -> &RelayHandle {
        &self.inner.relay
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("active", &self.is_active())
            .field("relay", &self.inner.relay)
            .finish()
    }
}

/// Relay `console` to the loopback collector described by `config`.
///
/// Returns the active session's handle unchanged if one exists.
pub fn init_logger(console: &Arc<Console>, config: RelayConfig) -> io::Result<StopHandle> {
    let transport = TcpTransport::from_config(&config);
    init_logger_with_transport(console, config, transport)
}

/// Relay the process-wide console returned by [`console::global`].
pub fn init_global_logger(config: RelayConfig) -> io::Result<StopHandle> {
    init_logger(console::global(), config)
}

/// Like [`init_logger`] but over a caller-supplied transport.
pub fn init_logger_with_transport<T: Transport>(
    console: &Arc<Console>,
    config: RelayConfig,
    transport: T,
) -> io::Result<StopHandle> {
    let mut slot = console.session.lock();
    if let Some(existing) = slot.as_ref() {
        return Ok(existing.clone());
    }

    // Diagnostics go to the pre-relay error sink so they cannot loop back.
    let diagnostics = Arc::clone(console.entry_points().get(ConsoleLevel::Error));
    let relay = Arc::new(RelayHandle::with_transport(transport, config, diagnostics)?);
    let originals = shim::intercept(console, &relay);
    log::debug!("console relay session started");

    let handle = StopHandle {
        inner: Arc::new(Session {
            console: Arc::downgrade(console),
            originals: Mutex::new(Some(originals)),
            relay,
        }),
    };
    *slot = Some(handle.clone());
    Ok(handle)
}
