//! Compatibility bridge for the Rust `log` crate.
//!
//! [`RelayLogAdapter`] implements `log::Log` and forwards each record into a
//! [`Console`], so libraries that log through the facade reach the same entry
//! points as direct console calls. While a relay session is active those
//! records travel to the collector like any other call.

use std::sync::{Arc, OnceLock};

use log::{Log, Metadata, Record};
use once_cell::sync::Lazy;

use crate::{arg::Arg, console::Console, level::ConsoleLevel};

const INTERNAL_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Adapter implementing the Rust `log::Log` trait over a [`Console`].
pub struct RelayLogAdapter {
    console: Arc<Console>,
}

impl RelayLogAdapter {
    pub fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

impl From<log::Level> for ConsoleLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => ConsoleLevel::Debug,
            log::Level::Info => ConsoleLevel::Info,
            log::Level::Warn => ConsoleLevel::Warn,
            log::Level::Error => ConsoleLevel::Error,
        }
    }
}

// The relay logs its own state through `log`; forwarding that would loop.
fn is_internal(target: &str) -> bool {
    target == INTERNAL_TARGET
        || target
            .strip_prefix(INTERNAL_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

fn is_enabled_by_global_max(level: log::Level) -> bool {
    log::max_level() >= level.to_level_filter()
}

impl Log for RelayLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        is_enabled_by_global_max(metadata.level()) && !is_internal(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.console
            .log(record.level().into(), &[Arg::display(record.args())]);
    }

    fn flush(&self) {}
}

static GLOBAL_ADAPTER: Lazy<RelayLogAdapter> =
    Lazy::new(|| RelayLogAdapter::new(Arc::clone(crate::console::global())));
static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

/// Install an adapter over the process-wide console as the global Rust
/// logger.
///
/// Returns `true` on success. When a different global logger is already set,
/// installation fails and `false` is returned. Subsequent calls return the
/// cached outcome.
pub fn install_global_logger() -> bool {
    *INSTALL_RESULT.get_or_init(|| {
        if log::set_logger(&*GLOBAL_ADAPTER).is_err() {
            return false;
        }
        log::set_max_level(log::LevelFilter::Trace);
        true
    })
}
