//! Consoles, ports and configurations for relay integration tests.

use std::{net::TcpListener, sync::Arc, time::Duration};

use console_relay::{Arg, Console, ConsoleLevel, ConsoleSink, EntryPoints, RelayConfig};
use parking_lot::Mutex;
use rstest::fixture;

/// Console sink that keeps every rendered call.
#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<(ConsoleLevel, String)>>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(ConsoleLevel, String)> {
        self.calls.lock().clone()
    }
}

impl ConsoleSink for RecordingSink {
    fn write(&self, level: ConsoleLevel, args: &[Arg<'_>]) {
        self.calls
            .lock()
            .push((level, console_relay::render_message(args)));
    }
}

/// A port with no listener behind it at the time of the call.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Relay configuration with a short retry interval.
pub fn relay_config(port: u16, interval: Duration) -> RelayConfig {
    let mut config = RelayConfig::default().with_port(port);
    config.retry.interval = interval;
    config.connect_timeout = Duration::from_millis(500);
    config
}

/// A console whose original entry points record into the returned sink.
#[fixture]
pub fn recording_console() -> (Arc<Console>, RecordingSink) {
    let sink = RecordingSink::default();
    let console = Console::with_entry_points(EntryPoints::uniform(Arc::new(sink.clone())));
    (Arc::new(console), sink)
}
