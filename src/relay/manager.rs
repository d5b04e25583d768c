//! Connection state machine driven by the relay worker.
//!
//! The manager is single-threaded: the worker feeds it records, transport
//! events and timer expiries one at a time. It owns the only transport handle,
//! the outbound queue and the pending retry deadline.

use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::{
    arg::Arg, console::SharedSink, level::ConsoleLevel, log_record::LogRecord,
    queue::OutboundQueue,
};

use super::{
    backoff::RetryState,
    config::RelayConfig,
    serialise::serialise_record,
    transport::{Connection, EventSink, Transport, TransportEvent, TransportMessage},
};

/// Diagnostic emitted through the original error sink on transport errors.
pub(crate) const CONNECT_FAILURE: &str = "\x1b[31mFailed to connect to debug server:\x1b[0m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt pending.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Records are written straight to the collector.
    Connected,
    /// A retry is scheduled.
    WaitingToReconnect,
    /// The relay was shut down; nothing happens any more.
    Stopped,
}

/// Point-in-time view of the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayStats {
    /// Connection state when the snapshot was taken.
    pub state: ConnectionState,
    /// Records waiting for a connection.
    pub queued: usize,
    /// Records rejected because the queue was full.
    pub dropped: u64,
    /// Records written to the collector.
    pub sent: u64,
    /// Retries scheduled since the last successful connect.
    pub reconnect_attempts: u32,
    /// Whether the retry budget ran out.
    pub gave_up: bool,
}

pub(crate) struct ConnectionManager<T: Transport> {
    transport: T,
    state: ConnectionState,
    connection: Option<T::Connection>,
    attempt: u64,
    queue: OutboundQueue,
    retry: RetryState,
    retry_at: Option<Instant>,
    gave_up: bool,
    sent: u64,
    diagnostics: SharedSink,
    events: Sender<TransportMessage<T::Connection>>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(
        transport: T,
        config: &RelayConfig,
        diagnostics: SharedSink,
        events: Sender<TransportMessage<T::Connection>>,
    ) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            connection: None,
            attempt: 0,
            queue: OutboundQueue::new(config.queue_capacity),
            retry: RetryState::new(config.retry.clone()),
            retry_at: None,
            gave_up: false,
            sent: 0,
            diagnostics,
            events,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// When the pending retry fires, if one is scheduled.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_at
    }

    /// Start a fresh connection attempt, discarding any previous handle.
    pub fn connect(&mut self) {
        if self.state == ConnectionState::Stopped {
            return;
        }
        self.close_connection();
        self.retry_at = None;
        self.attempt += 1;
        self.state = ConnectionState::Connecting;
        debug!("console relay connecting (attempt {})", self.attempt);
        self.transport
            .connect(EventSink::new(self.attempt, self.events.clone()));
    }

    /// Write `record` when connected, queue it otherwise.
    pub fn submit(&mut self, record: LogRecord, now: Instant) {
        match self.state {
            ConnectionState::Connected => self.write(record, now),
            ConnectionState::Stopped => {}
            _ => {
                // Overflow is a silent drop; the queue counts it.
                let _ = self.queue.enqueue(record);
            }
        }
    }

    /// Reconnect if the retry deadline has passed.
    pub fn fire_retry_timer(&mut self, now: Instant) {
        if self.state == ConnectionState::WaitingToReconnect
            && self.retry_at.is_some_and(|deadline| deadline <= now)
        {
            self.connect();
        }
    }

    pub fn handle_event(&mut self, message: TransportMessage<T::Connection>, now: Instant) {
        let TransportMessage { attempt, event } = message;
        let current = attempt == self.attempt;
        let live = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        );
        match event {
            TransportEvent::Connected(connection)
                if current && self.state == ConnectionState::Connecting =>
            {
                self.on_connected(connection, now);
            }
            TransportEvent::Refused if current && self.state == ConnectionState::Connecting => {
                self.schedule_reconnect(now);
            }
            TransportEvent::Error(err) if current && live => {
                self.report_failure(&err);
                self.schedule_reconnect(now);
            }
            TransportEvent::Closed if current && live => {
                debug!("console relay: collector closed the connection");
                self.schedule_reconnect(now);
            }
            TransportEvent::Connected(mut connection) => {
                connection.close();
                debug!("console relay: closed stale connection from attempt {attempt}");
            }
            _ => debug!("console relay: ignoring stale event from attempt {attempt}"),
        }
    }

    /// Cancel the pending retry and release the connection for good.
    pub fn stop(&mut self) {
        if self.state == ConnectionState::Stopped {
            return;
        }
        self.retry_at = None;
        self.close_connection();
        self.state = ConnectionState::Stopped;
        debug!(
            "console relay stopped with {} records still queued",
            self.queue.len()
        );
    }

    /// True when every record received so far has reached the socket.
    pub fn is_flushed(&self) -> bool {
        self.state == ConnectionState::Connected && self.queue.is_empty()
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            state: self.state(),
            queued: self.queue.len(),
            dropped: self.queue.dropped(),
            sent: self.sent,
            reconnect_attempts: self.retry.attempts(),
            gave_up: self.gave_up,
        }
    }

    fn on_connected(&mut self, connection: T::Connection, now: Instant) {
        self.connection = Some(connection);
        self.state = ConnectionState::Connected;
        self.retry.record_success();
        self.gave_up = false;
        let backlog = self.queue.len();
        self.drain_queue(now);
        debug!("console relay connected; drained {backlog} queued records");
    }

    fn drain_queue(&mut self, now: Instant) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        let mut failure = None;
        for record in self.queue.drain() {
            let Some(frame) = encode(&record) else {
                continue;
            };
            if let Err(err) = connection.send(&frame) {
                failure = Some(err);
                break;
            }
            self.sent += 1;
        }
        if let Some(err) = failure {
            self.report_failure(&err);
            self.schedule_reconnect(now);
        }
    }

    fn write(&mut self, record: LogRecord, now: Instant) {
        let Some(connection) = self.connection.as_mut() else {
            let _ = self.queue.enqueue(record);
            return;
        };
        let Some(frame) = encode(&record) else {
            return;
        };
        match connection.send(&frame) {
            Ok(()) => self.sent += 1,
            Err(err) => {
                self.report_failure(&err);
                self.schedule_reconnect(now);
            }
        }
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        self.close_connection();
        self.retry_at = None;
        match self.retry.next_delay() {
            Some(delay) => {
                self.state = ConnectionState::WaitingToReconnect;
                self.retry_at = Some(now + delay);
                debug!(
                    "console relay retrying in {delay:?} (attempt {})",
                    self.retry.attempts()
                );
            }
            None => {
                self.state = ConnectionState::Disconnected;
                if !self.gave_up {
                    self.gave_up = true;
                    let message = format!(
                        "Giving up on debug server after {} attempts",
                        self.retry.attempts()
                    );
                    self.diagnostics
                        .write(ConsoleLevel::Error, &[Arg::from(message)]);
                }
            }
        }
    }

    fn report_failure(&self, err: &std::io::Error) {
        self.diagnostics.write(
            ConsoleLevel::Error,
            &[Arg::from(CONNECT_FAILURE), Arg::display(err)],
        );
    }

    fn close_connection(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
    }
}

fn encode(record: &LogRecord) -> Option<Vec<u8>> {
    match serialise_record(record) {
        Ok(frame) => Some(frame),
        Err(err) => {
            warn!("console relay could not encode record: {err}");
            None
        }
    }
}
