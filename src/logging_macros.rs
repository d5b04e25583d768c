//! Console calls with a variadic argument list.
//!
//! Each macro takes a console expression followed by any number of values
//! convertible into [`Arg`](crate::Arg), mirroring how console functions
//! accept a variable number of arguments.
//!
//! # Examples
//!
//! ```rust,ignore
//! use console_relay::{Console, console_info};
//!
//! let console = Console::new();
//! console_info!(console, "server started on port", 8080);
//! ```

/// Call the console's `info` entry point.
#[macro_export]
macro_rules! console_info {
    ($console:expr $(, $arg:expr)* $(,)?) => {
        $crate::__console_call!($console, $crate::ConsoleLevel::Info $(, $arg)*)
    };
}

/// Call the console's `warn` entry point.
#[macro_export]
macro_rules! console_warn {
    ($console:expr $(, $arg:expr)* $(,)?) => {
        $crate::__console_call!($console, $crate::ConsoleLevel::Warn $(, $arg)*)
    };
}

/// Call the console's `error` entry point.
#[macro_export]
macro_rules! console_error {
    ($console:expr $(, $arg:expr)* $(,)?) => {
        $crate::__console_call!($console, $crate::ConsoleLevel::Error $(, $arg)*)
    };
}

/// Call the console's `debug` entry point.
#[macro_export]
macro_rules! console_debug {
    ($console:expr $(, $arg:expr)* $(,)?) => {
        $crate::__console_call!($console, $crate::ConsoleLevel::Debug $(, $arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __console_call {
    ($console:expr, $level:expr $(, $arg:expr)*) => {
        $console.log($level, &[$($crate::Arg::from($arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        arg::Arg,
        console::{Console, EntryPoints},
        level::ConsoleLevel,
        test_utils::CollectingSink,
    };
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::Arc;

    #[fixture]
    fn console_with_sink() -> (Console, CollectingSink) {
        let sink = CollectingSink::default();
        let console = Console::with_entry_points(EntryPoints::uniform(Arc::new(sink.clone())));
        (console, sink)
    }

    #[rstest]
    fn each_macro_uses_its_level(console_with_sink: (Console, CollectingSink)) {
        let (console, sink) = console_with_sink;

        console_info!(console, "a");
        console_warn!(console, "b");
        console_error!(console, "c");
        console_debug!(console, "d");

        assert_eq!(
            sink.messages(),
            [
                (ConsoleLevel::Info, "a".to_owned()),
                (ConsoleLevel::Warn, "b".to_owned()),
                (ConsoleLevel::Error, "c".to_owned()),
                (ConsoleLevel::Debug, "d".to_owned()),
            ]
        );
    }

    #[rstest]
    fn mixed_arguments_are_joined(console_with_sink: (Console, CollectingSink)) {
        let (console, sink) = console_with_sink;
        let owned = String::from("owned");

        console_info!(console, "count", 3, true, owned, json!({"k": 1}),);

        assert_eq!(
            sink.messages(),
            [(ConsoleLevel::Info, r#"count 3 true owned {"k":1}"#.to_owned())]
        );
    }

    #[rstest]
    fn explicit_args_pass_through(console_with_sink: (Console, CollectingSink)) {
        let (console, sink) = console_with_sink;
        let value = 1.5_f64;

        console_debug!(console, Arg::display(&value));
        console_warn!(console);

        assert_eq!(
            sink.messages(),
            [
                (ConsoleLevel::Debug, "1.5".to_owned()),
                (ConsoleLevel::Warn, String::new()),
            ]
        );
    }
}
