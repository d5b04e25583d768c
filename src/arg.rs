//! Console call arguments and their rendering into a single message.
//!
//! Strings and other primitives render as plain text. Structured values
//! captured with [`Arg::json`] render as compact JSON. Rendering never fails:
//! a value that cannot be serialised or displayed is replaced by
//! [`UNSERIALIZABLE_PLACEHOLDER`].

use std::{
    borrow::Cow,
    fmt::{self, Write as _},
    panic::{self, AssertUnwindSafe},
};

use serde::Serialize;
use serde_json::Value;

/// Text substituted for an argument that cannot be rendered.
pub const UNSERIALIZABLE_PLACEHOLDER: &str = "[unserializable]";

/// A single argument of a console call.
pub enum Arg<'a> {
    /// Text rendered verbatim.
    Text(Cow<'a, str>),
    /// Any value rendered through its `Display` implementation.
    Display(&'a dyn fmt::Display),
    /// Text captured from a structured value: its JSON encoding, or the bare
    /// string when the value serialised to a JSON string.
    Json(String),
    /// A value whose serialisation failed when the argument was captured.
    Unserializable,
}

impl<'a> Arg<'a> {
    /// Capture a value through its `Display` implementation.
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Arg::Display(value)
    }

    /// Capture a structured value as JSON.
    ///
    /// Serialisation happens immediately and keeps the value's own field
    /// order. Errors and panics are remembered and rendered as the
    /// placeholder instead of reaching the caller.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        let encoded = panic::catch_unwind(AssertUnwindSafe(|| serde_json::to_string(value)));
        match encoded {
            Ok(Ok(text)) => Arg::Json(unquote(text)),
            _ => Arg::Unserializable,
        }
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Arg::Text(text) => out.push_str(text),
            Arg::Display(value) => render_display(*value, out),
            Arg::Json(text) => out.push_str(text),
            Arg::Unserializable => out.push_str(UNSERIALIZABLE_PLACEHOLDER),
        }
    }
}

// A top-level JSON string renders as its contents, without quotes.
fn unquote(text: String) -> String {
    if text.starts_with('"') {
        serde_json::from_str(&text).unwrap_or(text)
    } else {
        text
    }
}

fn render_display(value: &dyn fmt::Display, out: &mut String) {
    let start = out.len();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| write!(out, "{value}")));
    if !matches!(outcome, Ok(Ok(()))) {
        out.truncate(start);
        out.push_str(UNSERIALIZABLE_PLACEHOLDER);
    }
}

/// Join the rendered arguments with single spaces.
pub fn render_message(args: &[Arg<'_>]) -> String {
    let mut out = String::new();
    for (idx, arg) in args.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        arg.render_into(&mut out);
    }
    out
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Arg::Display(_) => f.write_str("Display(..)"),
            Arg::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Arg::Unserializable => f.write_str("Unserializable"),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(text: &'a str) -> Self {
        Arg::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(text: &'a String) -> Self {
        Arg::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Arg<'_> {
    fn from(text: String) -> Self {
        Arg::Text(Cow::Owned(text))
    }
}

impl From<Value> for Arg<'_> {
    fn from(value: Value) -> Self {
        Arg::json(&value)
    }
}

impl From<&Value> for Arg<'_> {
    fn from(value: &Value) -> Self {
        Arg::json(value)
    }
}

macro_rules! primitive_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg<'_> {
                fn from(value: $ty) -> Self {
                    Arg::Text(Cow::Owned(value.to_string()))
                }
            }
        )*
    };
}

primitive_args!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
