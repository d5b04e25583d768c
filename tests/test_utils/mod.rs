//! Helpers shared by the integration tests.
#![allow(dead_code)]

pub mod collector;

pub mod fixtures;

pub use collector::Collector;
pub use fixtures::{RecordingSink, free_port, recording_console, relay_config};
