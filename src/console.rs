//! Injectable console service with swappable entry points.
//!
//! Each of the four entry points is an [`Arc`]ed [`ConsoleSink`]. Callers
//! route logging through a [`Console`] explicitly, either one they own or the
//! process-wide instance returned by [`global`]. The relay lifecycle swaps
//! the sinks out and later restores the exact same `Arc`s.

use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::{
    arg::{Arg, render_message},
    level::ConsoleLevel,
    lifecycle::StopHandle,
};

/// Destination for console calls.
///
/// Implementations must not panic and must not block for long: they run on
/// the caller's thread.
pub trait ConsoleSink: Send + Sync {
    fn write(&self, level: ConsoleLevel, args: &[Arg<'_>]);
}

pub type SharedSink = Arc<dyn ConsoleSink>;

/// Writes each call as one line: `info`/`debug` to stdout, `warn`/`error` to
/// stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl ConsoleSink for StdioSink {
    fn write(&self, level: ConsoleLevel, args: &[Arg<'_>]) {
        let line = render_message(args);
        let _ = match level {
            ConsoleLevel::Info | ConsoleLevel::Debug => writeln!(io::stdout().lock(), "{line}"),
            ConsoleLevel::Warn | ConsoleLevel::Error => writeln!(io::stderr().lock(), "{line}"),
        };
    }
}

/// The four sinks backing a console.
#[derive(Clone)]
pub struct EntryPoints {
    pub info: SharedSink,
    pub warn: SharedSink,
    pub error: SharedSink,
    pub debug: SharedSink,
}

impl EntryPoints {
    /// Use the same sink for every level.
    pub fn uniform(sink: SharedSink) -> Self {
        Self {
            info: Arc::clone(&sink),
            warn: Arc::clone(&sink),
            error: Arc::clone(&sink),
            debug: sink,
        }
    }

    pub fn get(&self, level: ConsoleLevel) -> &SharedSink {
        match level {
            ConsoleLevel::Info => &self.info,
            ConsoleLevel::Warn => &self.warn,
            ConsoleLevel::Error => &self.error,
            ConsoleLevel::Debug => &self.debug,
        }
    }

    fn get_mut(&mut self, level: ConsoleLevel) -> &mut SharedSink {
        match level {
            ConsoleLevel::Info => &mut self.info,
            ConsoleLevel::Warn => &mut self.warn,
            ConsoleLevel::Error => &mut self.error,
            ConsoleLevel::Debug => &mut self.debug,
        }
    }

    /// True when every entry point refers to the same sink allocation as in
    /// `other`.
    pub fn ptr_eq(&self, other: &EntryPoints) -> bool {
        ConsoleLevel::ALL
            .iter()
            .all(|&level| Arc::ptr_eq(self.get(level), other.get(level)))
    }
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self::uniform(Arc::new(StdioSink))
    }
}

impl fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoints").finish_non_exhaustive()
    }
}

pub struct Console {
    entries: RwLock<EntryPoints>,
    pub(crate) session: Mutex<Option<StopHandle>>,
}

impl Console {
    /// Create a console writing to stdout and stderr.
    pub fn new() -> Self {
        Self::with_entry_points(EntryPoints::default())
    }

    pub fn with_entry_points(entries: EntryPoints) -> Self {
        Self {
            entries: RwLock::new(entries),
            session: Mutex::new(None),
        }
    }

    pub fn info(&self, args: &[Arg<'_>]) {
        self.log(ConsoleLevel::Info, args);
    }

    pub fn warn(&self, args: &[Arg<'_>]) {
        self.log(ConsoleLevel::Warn, args);
    }

    pub fn error(&self, args: &[Arg<'_>]) {
        self.log(ConsoleLevel::Error, args);
    }

    pub fn debug(&self, args: &[Arg<'_>]) {
        self.log(ConsoleLevel::Debug, args);
    }

    /// Dispatch a call to the entry point for `level`.
    pub fn log(&self, level: ConsoleLevel, args: &[Arg<'_>]) {
        // Release the lock before writing so sinks may reconfigure the console.
        let sink = Arc::clone(self.entries.read().get(level));
        sink.write(level, args);
    }

    /// Snapshot of the current entry points.
    pub fn entry_points(&self) -> EntryPoints {
        self.entries.read().clone()
    }

    /// Install `entries`, returning the ones they replace.
    pub fn replace_entry_points(&self, entries: EntryPoints) -> EntryPoints {
        std::mem::replace(&mut *self.entries.write(), entries)
    }

    /// Install `sink` for one level, returning the previous sink.
    pub fn set_entry(&self, level: ConsoleLevel, sink: SharedSink) -> SharedSink {
        std::mem::replace(self.entries.write().get_mut(level), sink)
    }

    /// Whether a relay session is currently installed on this console.
    pub fn is_relaying(&self) -> bool {
        self.session.lock().is_some()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("relaying", &self.is_relaying())
            .finish()
    }
}

static GLOBAL: Lazy<Arc<Console>> = Lazy::new(|| Arc::new(Console::new()));

/// The process-wide console.
pub fn global() -> &'static Arc<Console> {
    &GLOBAL
}
