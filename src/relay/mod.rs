//! Connection management for shipping records to the collector.
//!
//! [`RelayHandle`] owns a worker thread that runs the connection state
//! machine. Records submitted while the collector is reachable are written
//! straight to the socket as newline-delimited JSON; otherwise they wait in a
//! bounded [`OutboundQueue`](crate::queue::OutboundQueue) until the next
//! successful connect, which drains them in order. Failed or refused
//! connections are retried after a fixed interval, optionally giving up after
//! a configured number of attempts.

mod backoff;
mod config;
mod handle;
mod manager;
pub mod serialise;
pub mod transport;
mod worker;


pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, DEFAULT_RECONNECT_INTERVAL,
    DEFAULT_WRITE_TIMEOUT, LOOPBACK_HOST, RelayConfig, RetryPolicy,
};
pub use handle::{RelayHandle, SubmitError};
pub use manager::{ConnectionState, RelayStats};
pub use transport::{
    Connection, EventSink, TcpConnection, TcpTransport, Transport, TransportEvent,
};
