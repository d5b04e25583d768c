//! Fluent construction of [`RelayConfig`] values.
//!
//! Every setter is optional; unset fields fall back to the defaults in
//! [`relay`](crate::relay). Validation runs when the configuration is built so
//! a bad value is reported once, before any thread or socket exists.

use std::{io, sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    console::Console,
    lifecycle::{StopHandle, init_logger},
    relay::{RelayConfig, RetryPolicy},
};

/// Errors that may occur while configuring or starting a relay.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid user supplied configuration.
    #[error("invalid relay configuration: {0}")]
    InvalidConfig(String),
    /// The relay worker could not be started.
    #[error(transparent)]
    Io(#[from] io::Error),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for relay configuration.
#[derive(Clone, Debug, Default)]
pub struct RelayBuilder {
    port: Option<u16>,
    reconnect_interval_ms: Option<u64>,
    queue_capacity: Option<usize>,
    unbounded_queue: bool,
    max_reconnect_attempts: Option<u32>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
}

impl RelayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    option_setter!(
        #[doc = "Set the collector port."]
        with_port,
        port,
        u16
    );
    option_setter!(
        #[doc = "Set the delay between reconnection attempts."]
        with_reconnect_interval_ms,
        reconnect_interval_ms,
        u64
    );
    option_setter!(
        #[doc = "Give up after this many consecutive failed attempts."]
        with_max_reconnect_attempts,
        max_reconnect_attempts,
        u32
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);

    /// Hold at most `capacity` records while disconnected.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self.unbounded_queue = false;
        self
    }

    /// Never drop records while disconnected.
    pub fn with_unbounded_queue(mut self) -> Self {
        self.queue_capacity = None;
        self.unbounded_queue = true;
        self
    }

    /// Check every configured value without building.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(port) = self.port {
            ensure_positive!(port, "port")?;
        }
        if let Some(interval) = self.reconnect_interval_ms {
            ensure_positive!(interval, "reconnect_interval_ms")?;
        }
        if let Some(capacity) = self.queue_capacity {
            ensure_positive!(capacity, "queue_capacity")?;
        }
        if let Some(attempts) = self.max_reconnect_attempts {
            ensure_positive!(attempts, "max_reconnect_attempts")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the settings and produce a configuration.
    pub fn build(&self) -> Result<RelayConfig, ConfigError> {
        self.validate()?;
        let mut config = RelayConfig::default();
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.unbounded_queue {
            config.queue_capacity = None;
        } else if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = Some(capacity);
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
        config.retry = RetryPolicy {
            interval: self
                .reconnect_interval_ms
                .map_or(config.retry.interval, Duration::from_millis),
            max_attempts: self.max_reconnect_attempts,
        };
        Ok(config)
    }

    /// Build the configuration and start relaying `console`.
    pub fn start(&self, console: &Arc<Console>) -> Result<StopHandle, ConfigError> {
        let config = self.build()?;
        Ok(init_logger(console, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{
        DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, DEFAULT_RECONNECT_INTERVAL,
    };
    use rstest::rstest;

    #[rstest]
    fn defaults_match_documented_values() {
        let config = RelayBuilder::new().build().expect("defaults are valid");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.port, 8099);
        assert_eq!(config.queue_capacity, Some(DEFAULT_QUEUE_CAPACITY));
        assert_eq!(config.retry.interval, DEFAULT_RECONNECT_INTERVAL);
        assert_eq!(config.retry.max_attempts, None);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[rstest]
    fn overrides_are_applied() {
        let config = RelayBuilder::new()
            .with_port(9876)
            .with_reconnect_interval_ms(250)
            .with_max_reconnect_attempts(5)
            .with_queue_capacity(10)
            .with_write_timeout_ms(100)
            .build()
            .expect("valid overrides");
        assert_eq!(config.port, 9876);
        assert_eq!(config.retry.interval, Duration::from_millis(250));
        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.queue_capacity, Some(10));
        assert_eq!(config.write_timeout, Duration::from_millis(100));
    }

    #[rstest]
    fn unbounded_queue_clears_capacity() {
        let config = RelayBuilder::new()
            .with_queue_capacity(5)
            .with_unbounded_queue()
            .build()
            .expect("valid");
        assert_eq!(config.queue_capacity, None);
    }

    #[rstest]
    #[case(RelayBuilder::new().with_port(0), "port")]
    #[case(RelayBuilder::new().with_reconnect_interval_ms(0), "reconnect_interval_ms")]
    #[case(RelayBuilder::new().with_queue_capacity(0), "queue_capacity")]
    #[case(RelayBuilder::new().with_max_reconnect_attempts(0), "max_reconnect_attempts")]
    #[case(RelayBuilder::new().with_connect_timeout_ms(0), "connect_timeout_ms")]
    #[case(RelayBuilder::new().with_write_timeout_ms(0), "write_timeout_ms")]
    fn rejects_zero_values(#[case] builder: RelayBuilder, #[case] field: &str) {
        let err = builder.build().expect_err("zero must be rejected");
        assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains(field)));
    }
}
