//! In-memory transport for exercising the connection state machine.
//!
//! `FakeTransport::connect` only records the attempt's [`EventSink`]. Tests
//! decide what happens next through the paired [`FakeController`].

use std::{io, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::relay::{Connection, EventSink, Transport};

use super::wait_until;

#[derive(Default)]
struct Shared {
    attempts: Vec<EventSink<FakeConnection>>,
    wire: Vec<Vec<u8>>,
    fail_writes: bool,
    closed: usize,
}

pub struct FakeTransport {
    shared: Arc<Mutex<Shared>>,
}

impl FakeTransport {
    pub fn new() -> (Self, FakeController) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            FakeController { shared },
        )
    }
}

impl Transport for FakeTransport {
    type Connection = FakeConnection;

    fn connect(&mut self, events: EventSink<FakeConnection>) {
        self.shared.lock().attempts.push(events);
    }
}

pub struct FakeConnection {
    shared: Arc<Mutex<Shared>>,
    closed: bool,
}

impl Connection for FakeConnection {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let mut shared = self.shared.lock();
        if shared.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "fake write failure"));
        }
        shared.wire.push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.lock().closed += 1;
        }
    }
}

#[derive(Clone)]
pub struct FakeController {
    shared: Arc<Mutex<Shared>>,
}

impl FakeController {
    /// Number of connection attempts started so far.
    pub fn attempts(&self) -> usize {
        self.shared.lock().attempts.len()
    }

    pub fn wait_for_attempts(&self, count: usize, timeout: Duration) -> bool {
        wait_until(timeout, || self.attempts() >= count)
    }

    /// Event sink of the attempt with the given zero-based index.
    pub fn sink(&self, index: usize) -> EventSink<FakeConnection> {
        self.shared.lock().attempts[index].clone()
    }

    pub fn latest(&self) -> EventSink<FakeConnection> {
        let shared = self.shared.lock();
        shared
            .attempts
            .last()
            .cloned()
            .expect("no connection attempt recorded")
    }

    /// A connection writing into this controller's wire.
    pub fn connection(&self) -> FakeConnection {
        FakeConnection {
            shared: Arc::clone(&self.shared),
            closed: false,
        }
    }

    pub fn accept_latest(&self) -> bool {
        self.latest().connected(self.connection())
    }

    pub fn refuse_latest(&self) -> bool {
        self.latest().refused()
    }

    pub fn close_latest(&self) -> bool {
        self.latest().closed()
    }

    pub fn fail_latest(&self, kind: io::ErrorKind) -> bool {
        self.latest().error(io::Error::new(kind, "fake transport error"))
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.shared.lock().fail_writes = fail;
    }

    /// Frames written so far, without their trailing newline.
    pub fn written_lines(&self) -> Vec<String> {
        self.shared
            .lock()
            .wire
            .iter()
            .map(|frame| {
                String::from_utf8_lossy(frame)
                    .trim_end_matches('\n')
                    .to_owned()
            })
            .collect()
    }

    /// Connections closed by the relay so far.
    pub fn closed_connections(&self) -> usize {
        self.shared.lock().closed
    }
}
