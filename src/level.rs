//! Severity levels carried by console records.

use std::fmt;

use serde::Serialize;

/// One of the four console entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl ConsoleLevel {
    /// Every level in entry point order.
    pub const ALL: [ConsoleLevel; 4] = [
        ConsoleLevel::Info,
        ConsoleLevel::Warn,
        ConsoleLevel::Error,
        ConsoleLevel::Debug,
    ];

    /// Wire name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleLevel::Info => "info",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Error => "error",
            ConsoleLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
