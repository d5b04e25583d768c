//! Worker thread driving the connection manager.

use std::{io, thread, time::Instant};

use crossbeam_channel::{Receiver, Sender, at, never, select, unbounded};

use crate::{console::SharedSink, log_record::LogRecord};

use super::{
    config::RelayConfig,
    manager::{ConnectionManager, RelayStats},
    transport::{Transport, TransportMessage},
};

/// Commands processed by the worker thread.
#[derive(Debug)]
pub enum RelayCommand {
    Record(LogRecord),
    Flush(Sender<bool>),
    Stats(Sender<RelayStats>),
    Shutdown(Sender<()>),
}

pub fn spawn_worker<T: Transport>(
    transport: T,
    config: RelayConfig,
    diagnostics: SharedSink,
) -> io::Result<(Sender<RelayCommand>, thread::JoinHandle<()>)> {
    let (tx, rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let manager = ConnectionManager::new(transport, &config, diagnostics, event_tx);
    let handle = thread::Builder::new()
        .name("console-relay".into())
        .spawn(move || worker_loop(manager, rx, event_rx))?;
    Ok((tx, handle))
}

fn worker_loop<T: Transport>(
    mut manager: ConnectionManager<T>,
    commands: Receiver<RelayCommand>,
    events: Receiver<TransportMessage<T::Connection>>,
) {
    manager.connect();
    loop {
        let timer = manager.retry_deadline().map_or_else(never, at);
        select! {
            recv(commands) -> cmd => match cmd {
                Ok(cmd) => {
                    if !handle_command(&mut manager, cmd) {
                        return;
                    }
                }
                Err(_) => break,
            },
            recv(events) -> msg => {
                if let Ok(msg) = msg {
                    manager.handle_event(msg, Instant::now());
                }
            },
            recv(timer) -> _ => manager.fire_retry_timer(Instant::now()),
        }
    }
    manager.stop();
}

/// Apply one command. Returns `false` once the worker should exit.
pub(crate) fn handle_command<T: Transport>(
    manager: &mut ConnectionManager<T>,
    cmd: RelayCommand,
) -> bool {
    match cmd {
        RelayCommand::Record(record) => manager.submit(record, Instant::now()),
        RelayCommand::Flush(ack) => {
            let _ = ack.send(manager.is_flushed());
        }
        RelayCommand::Stats(ack) => {
            let _ = ack.send(manager.stats());
        }
        RelayCommand::Shutdown(ack) => {
            manager.stop();
            let _ = ack.send(());
            return false;
        }
    }
    true
}
