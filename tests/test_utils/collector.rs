//! A loopback TCP collector that records every line it receives.
//!
//! The listener binds `127.0.0.1` only, which is one of the addresses the
//! relay's `localhost` lookup yields.

use std::{
    io::{BufRead, BufReader},
    net::{Shutdown, TcpListener, TcpStream},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

#[derive(Default)]
struct Received {
    lines: Vec<String>,
    streams: Vec<TcpStream>,
    connections: usize,
}

pub struct Collector {
    port: u16,
    received: Arc<Mutex<Received>>,
}

impl Collector {
    /// Start listening on `port` and accept connections in the background.
    pub fn start(port: u16) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", port)).expect("bind collector");
        let received = Arc::new(Mutex::new(Received::default()));
        let shared = Arc::clone(&received);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let reader = stream.try_clone().expect("clone collector stream");
                {
                    let mut guard = shared.lock();
                    guard.connections += 1;
                    guard.streams.push(stream);
                }
                let lines = Arc::clone(&shared);
                thread::spawn(move || {
                    for line in BufReader::new(reader).lines() {
                        let Ok(line) = line else { break };
                        lines.lock().lines.push(line);
                    }
                });
            }
        });
        Self { port, received }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn lines(&self) -> Vec<String> {
        self.received.lock().lines.clone()
    }

    pub fn connections(&self) -> usize {
        self.received.lock().connections
    }

    /// Wait until at least `count` lines have arrived and return them.
    pub fn wait_for_lines(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let lines = self.lines();
            if lines.len() >= count || Instant::now() >= deadline {
                return lines;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    pub fn wait_for_connections(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.connections() < count {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }

    /// Hang up on every accepted connection while continuing to listen.
    pub fn disconnect_all(&self) {
        for stream in self.received.lock().streams.drain(..) {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
