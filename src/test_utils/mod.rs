//! Test-only helpers shared across crate unit tests.
//!
//! This module is only compiled for unit tests and provides small utilities
//! used by multiple test modules to keep individual test files focused.

mod collecting_sink;
mod fake_transport;

use std::{
    thread,
    time::{Duration, Instant},
};

pub use collecting_sink::CollectingSink;
pub use fake_transport::{FakeConnection, FakeController, FakeTransport};

/// Poll `condition` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}
