//! Public handle owning the relay worker.

use std::{io, thread, time::Duration};

use crossbeam_channel::{Sender, bounded};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::{console::SharedSink, log_record::LogRecord};

use super::{
    config::RelayConfig,
    manager::RelayStats,
    transport::Transport,
    worker::{RelayCommand, spawn_worker},
};

/// Extra time granted to the worker, beyond one write timeout, to
/// acknowledge shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("the relay has been stopped")]
    Stopped,
}

/// Handle to a running relay worker.
///
/// Submitting never blocks on the network. Dropping the handle shuts the
/// worker down.
pub struct RelayHandle {
    tx: RwLock<Option<Sender<RelayCommand>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl RelayHandle {
    /// Start a relay over a caller-supplied transport.
    ///
    /// `diagnostics` receives transport errors; pass a sink that does not
    /// route back into this relay.
    pub fn with_transport<T: Transport>(
        transport: T,
        config: RelayConfig,
        diagnostics: SharedSink,
    ) -> io::Result<Self> {
        let shutdown_timeout = config.write_timeout + SHUTDOWN_GRACE;
        let (tx, handle) = spawn_worker(transport, config, diagnostics)?;
        Ok(Self {
            tx: RwLock::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            shutdown_timeout,
        })
    }

    /// Hand a record to the worker.
    pub fn submit(&self, record: LogRecord) -> Result<(), SubmitError> {
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            return Err(SubmitError::Stopped);
        };
        tx.send(RelayCommand::Record(record))
            .map_err(|_| SubmitError::Stopped)
    }

    /// Wait until every record submitted so far has been written.
    ///
    /// Returns `false` when the relay is disconnected, has been stopped, or
    /// does not answer within `timeout`.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.request(RelayCommand::Flush, timeout).unwrap_or(false)
    }

    /// Current connection state and counters, or `None` once stopped.
    pub fn stats(&self, timeout: Duration) -> Option<RelayStats> {
        self.request(RelayCommand::Stats, timeout)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.read().is_none()
    }

    /// Stop the worker and wait for it to exit. Safe to call repeatedly.
    pub fn close(&self) {
        let acknowledged = self.request_shutdown();
        self.join_worker(acknowledged);
    }

    fn request<R>(
        &self,
        command: impl FnOnce(Sender<R>) -> RelayCommand,
        timeout: Duration,
    ) -> Option<R> {
        let tx = self.tx.read().clone()?;
        let (ack_tx, ack_rx) = bounded(1);
        tx.send(command(ack_tx)).ok()?;
        ack_rx.recv_timeout(timeout).ok()
    }

    fn request_shutdown(&self) -> bool {
        let Some(tx) = self.tx.write().take() else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(RelayCommand::Shutdown(ack_tx)).is_err() {
            // The worker has already exited.
            return true;
        }
        ack_rx.recv_timeout(self.shutdown_timeout).is_ok()
    }

    fn join_worker(&self, acknowledged: bool) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if !acknowledged {
            log::warn!(
                "console relay worker did not stop within {:?}; detaching",
                self.shutdown_timeout
            );
            return;
        }
        if handle.join().is_err() {
            log::warn!("console relay worker thread panicked");
        }
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RelayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayHandle")
            .field("closed", &self.is_closed())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}
