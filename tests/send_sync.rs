//! Send/Sync guarantees for core types.

use console_relay::{
    Console, EntryPoints, LogRecord, RelayBuilder, RelayConfig, RelayHandle, RelaySink,
    StdioSink, StopHandle,
    log_compat::RelayLogAdapter,
    relay::{TcpConnection, TcpTransport},
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(RelayBuilder: Send, Sync);
    assert_impl_all!(RelayConfig: Send, Sync);
    assert_impl_all!(LogRecord: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(Console: Send, Sync);
    assert_impl_all!(EntryPoints: Send, Sync);
    assert_impl_all!(StdioSink: Send, Sync);
    assert_impl_all!(RelaySink: Send, Sync);
    assert_impl_all!(RelayHandle: Send, Sync);
    assert_impl_all!(StopHandle: Send, Sync);
    assert_impl_all!(RelayLogAdapter: Send, Sync);
}

#[rstest]
fn transport_is_send() {
    assert_impl_all!(TcpTransport: Send);
    assert_impl_all!(TcpConnection: Send);
}
