//! Interception of console entry points.

use std::sync::Arc;

use crate::{
    arg::{Arg, render_message},
    console::{Console, ConsoleSink, EntryPoints},
    level::ConsoleLevel,
    log_record::LogRecord,
    relay::RelayHandle,
};

/// Entry point installed while relaying: renders the call into a
/// [`LogRecord`] and submits it.
pub struct RelaySink {
    relay: Arc<RelayHandle>,
}

impl RelaySink {
    pub fn new(relay: Arc<RelayHandle>) -> Self {
        Self { relay }
    }
}

impl ConsoleSink for RelaySink {
    fn write(&self, level: ConsoleLevel, args: &[Arg<'_>]) {
        let record = LogRecord::new(level, render_message(args));
        // A call racing with shutdown is dropped; callers never see an error.
        let _ = self.relay.submit(record);
    }
}

impl std::fmt::Debug for RelaySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySink")
            .field("relay", &self.relay)
            .finish()
    }
}

/// Route every entry point of `console` into `relay`, returning the entry
/// points that were active before.
pub(crate) fn intercept(console: &Console, relay: &Arc<RelayHandle>) -> EntryPoints {
    let wrapper = Arc::new(RelaySink::new(Arc::clone(relay)));
    console.replace_entry_points(EntryPoints::uniform(wrapper))
}

/// Reinstall the entry points captured by [`intercept`].
pub(crate) fn restore(console: &Console, originals: EntryPoints) {
    console.replace_entry_points(originals);
}
