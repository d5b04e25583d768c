//! A sink that accumulates console calls in memory for test assertions.

use crate::{
    arg::{Arg, render_message},
    console::ConsoleSink,
    level::ConsoleLevel,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Sink that stores every rendered call it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingSink {
    messages: Arc<Mutex<Vec<(ConsoleLevel, String)>>>,
}

impl CollectingSink {
    /// Return a snapshot of all calls received so far.
    pub fn messages(&self) -> Vec<(ConsoleLevel, String)> {
        self.messages.lock().clone()
    }
}

impl ConsoleSink for CollectingSink {
    fn write(&self, level: ConsoleLevel, args: &[Arg<'_>]) {
        self.messages.lock().push((level, render_message(args)));
    }
}
