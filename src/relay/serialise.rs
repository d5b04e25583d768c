//! Newline-delimited JSON encoding of records.

use std::io;

use serde::Serialize;

use crate::{level::ConsoleLevel, log_record::LogRecord};

#[derive(Serialize)]
struct WireRecord<'a> {
    level: ConsoleLevel,
    message: &'a str,
}

impl<'a> From<&'a LogRecord> for WireRecord<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            level: record.level(),
            message: record.message(),
        }
    }
}

/// Serialise a record into one JSON object followed by `\n`.
///
/// JSON string escaping keeps newlines inside the message from splitting the
/// line.
pub fn serialise_record(record: &LogRecord) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(record.message().len() + 32);
    serde_json::to_writer(&mut buf, &WireRecord::from(record)).map_err(io::Error::other)?;
    buf.push(b'\n');
    Ok(buf)
}
