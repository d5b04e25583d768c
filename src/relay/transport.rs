//! Transport capability used by the connection manager.
//!
//! The manager only ever asks a [`Transport`] to start a connection attempt.
//! Everything that happens afterwards (success, refusal, errors, the peer
//! hanging up) comes back as a [`TransportEvent`] through the attempt's
//! [`EventSink`]. Each sink is tagged with the attempt it belongs to, so the
//! manager can ignore events from handles it has already torn down.

use std::{
    fmt,
    io::{self, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;

use super::config::{LOOPBACK_HOST, RelayConfig};

/// A live connection to the collector.
pub trait Connection: Send + 'static {
    /// Write one encoded frame in full.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Close the connection. Further events from it are ignored by the
    /// manager.
    fn close(&mut self);
}

/// Opens connections to the collector.
pub trait Transport: Send + 'static {
    type Connection: Connection;

    /// Begin a connection attempt without blocking the caller. The outcome,
    /// and any later close or error, is reported through `events`.
    fn connect(&mut self, events: EventSink<Self::Connection>);
}

/// Something that happened to a connection attempt.
#[derive(Debug)]
pub enum TransportEvent<C> {
    /// The connection is open and ready for writes.
    Connected(C),
    /// Nobody is listening at the target address.
    Refused,
    /// Any other failure, either while connecting or on a live connection.
    Error(io::Error),
    /// The peer closed the connection.
    Closed,
}

#[derive(Debug)]
pub(crate) struct TransportMessage<C> {
    pub attempt: u64,
    pub event: TransportEvent<C>,
}

/// Reports events for a single connection attempt back to the relay worker.
pub struct EventSink<C> {
    attempt: u64,
    tx: Sender<TransportMessage<C>>,
}

impl<C> EventSink<C> {
    pub(crate) fn new(attempt: u64, tx: Sender<TransportMessage<C>>) -> Self {
        Self { attempt, tx }
    }

    /// Deliver `event`. Returns `false` once the relay has shut down.
    pub fn emit(&self, event: TransportEvent<C>) -> bool {
        self.tx
            .send(TransportMessage {
                attempt: self.attempt,
                event,
            })
            .is_ok()
    }

    pub fn connected(&self, connection: C) -> bool {
        self.emit(TransportEvent::Connected(connection))
    }

    pub fn refused(&self) -> bool {
        self.emit(TransportEvent::Refused)
    }

    pub fn error(&self, err: io::Error) -> bool {
        self.emit(TransportEvent::Error(err))
    }

    pub fn closed(&self) -> bool {
        self.emit(TransportEvent::Closed)
    }
}

impl<C> Clone for EventSink<C> {
    fn clone(&self) -> Self {
        Self {
            attempt: self.attempt,
            tx: self.tx.clone(),
        }
    }
}

impl<C> fmt::Debug for EventSink<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Plain TCP transport to a collector on the local machine.
#[derive(Clone, Debug)]
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpTransport {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        connect_timeout: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout,
            write_timeout,
        }
    }

    /// Target the loopback collector described by `config`.
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            LOOPBACK_HOST,
            config.port,
            config.connect_timeout,
            config.write_timeout,
        )
    }

    fn run_attempt(self, events: EventSink<TcpConnection>) {
        let stream = match connect_tcp(&self.host, self.port, self.connect_timeout) {
            Ok(stream) => stream,
            Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => {
                events.refused();
                return;
            }
            Err(err) => {
                events.error(err);
                return;
            }
        };
        let reader = match stream
            .set_write_timeout(Some(self.write_timeout))
            .and_then(|()| stream.set_nodelay(true))
            .and_then(|()| stream.try_clone())
        {
            Ok(reader) => reader,
            Err(err) => {
                events.error(err);
                return;
            }
        };
        if events.connected(TcpConnection { stream }) {
            watch_for_close(reader, &events);
        }
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    fn connect(&mut self, events: EventSink<TcpConnection>) {
        let target = self.clone();
        let attempt_events = events.clone();
        let spawned = thread::Builder::new()
            .name("console-relay-connect".into())
            .spawn(move || target.run_attempt(attempt_events));
        if let Err(err) = spawned {
            events.error(err);
        }
    }
}

/// Open TCP stream owned by the relay worker.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame)?;
        self.stream.flush()
    }

    fn close(&mut self) {
        // Also wakes the reader blocked in `watch_for_close`.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut refused = None;
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => refused = Some(err),
            Err(err) => last_err = Some(err),
        }
    }
    // A refusal on any address means the collector is simply not running.
    Err(refused.or(last_err).unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{host}:{port} did not resolve to any address"),
        )
    }))
}

/// Block until the peer hangs up, then report the close.
///
/// The collector never writes back, so anything read is discarded.
fn watch_for_close(mut reader: TcpStream, events: &EventSink<TcpConnection>) {
    let mut buf = [0u8; 256];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => continue,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
                ) =>
            {
                break;
            }
            Err(err) => {
                events.error(err);
                return;
            }
        }
    }
    events.closed();
}
