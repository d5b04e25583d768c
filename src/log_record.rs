//! Record representation shipped to the collector.
//!
//! A [`LogRecord`] is built once per console call and never mutated
//! afterwards; the relay either writes it to the wire or parks it in the
//! outbound queue.

use std::fmt;

use crate::level::ConsoleLevel;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    level: ConsoleLevel,
    message: String,
}

impl LogRecord {
    /// Construct a record from its level and fully rendered message.
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn level(&self) -> ConsoleLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
