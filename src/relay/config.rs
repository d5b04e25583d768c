//! Configuration consumed by the relay worker.
//!
//! [`RelayBuilder`](crate::RelayBuilder) validates user input before
//! producing these values.

use std::time::Duration;

/// Host the relay connects to. The collector always runs on the same machine.
pub const LOOPBACK_HOST: &str = "localhost";
/// Default collector port.
pub const DEFAULT_PORT: u16 = 8099;
/// Default delay between a failed connection and the next attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(2_000);
/// Default number of records held while disconnected.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1_000;
/// Default timeout for a single connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// Collector port on [`LOOPBACK_HOST`].
    pub port: u16,
    /// Limit for a single connection attempt.
    pub connect_timeout: Duration,
    /// Limit for writing one frame.
    pub write_timeout: Duration,
    /// Records held while disconnected. `None` lets the queue grow without
    /// limit.
    pub queue_capacity: Option<usize>,
    /// When and how often to reconnect.
    pub retry: RetryPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            queue_capacity: Some(DEFAULT_QUEUE_CAPACITY),
            retry: RetryPolicy::default(),
        }
    }
}

impl RelayConfig {
    /// Override the collector port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Fixed-interval reconnection policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a failure and the next attempt.
    pub interval: Duration,
    /// Consecutive failed attempts tolerated before giving up. `None` retries
    /// forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RECONNECT_INTERVAL,
            max_attempts: None,
        }
    }
}
