//! Relay a process's console output to a remote collector.
//!
//! A [`Console`] exposes four entry points (`info`, `warn`, `error` and
//! `debug`). Calling [`init_logger`] swaps those entry points for wrappers
//! that turn every call into a [`LogRecord`] and hand it to a background
//! relay. The relay keeps a TCP connection to `localhost:<port>` alive,
//! buffers records while the collector is unreachable and writes each record
//! as one line of JSON. Delivery is best-effort: the host process is never
//! blocked and records may be lost when the collector stays away.
//!
//! Invoking the returned [`StopHandle`] puts the original entry points back
//! and tears the connection down.

mod arg;
mod builder;
mod console;
mod level;
mod lifecycle;
pub mod log_compat;
mod log_record;
mod logging_macros;
mod queue;
pub mod relay;
mod shim;

#[cfg(test)]
mod test_utils;

pub use arg::{Arg, UNSERIALIZABLE_PLACEHOLDER, render_message};
pub use builder::{ConfigError, RelayBuilder};
pub use console::{Console, ConsoleSink, EntryPoints, SharedSink, StdioSink, global};
pub use level::ConsoleLevel;
pub use lifecycle::{StopHandle, init_global_logger, init_logger, init_logger_with_transport};
pub use log_record::LogRecord;
pub use queue::{Drain, OutboundQueue, QueueFull};
pub use relay::{
    ConnectionState, RelayConfig, RelayHandle, RelayStats, RetryPolicy, SubmitError,
};
pub use shim::RelaySink;
