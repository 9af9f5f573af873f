//! Error values the evaluator can raise.
//!
//! ECMAScript throw targets are arbitrary values (`throw 1`, `throw {}`
//! are both legal), so [`JsError`] wraps either a well-formed native error
//! ([`JsNativeError`], the common case: `TypeError`, `ReferenceError`, ...)
//! or an arbitrary thrown [`JsValue`]. [`JsResult`] is the `Result` alias
//! every evaluator and intrinsic entry point returns.

use std::fmt;

use crate::value::JsValue;

/// The well-known error "kinds" `SPEC_FULL.md` §3 requires constructors
/// for. Each maps to a distinct native prototype at realm construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsNativeErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
    AggregateError,
}

impl JsNativeErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
            Self::ReferenceError => "ReferenceError",
            Self::SyntaxError => "SyntaxError",
            Self::AggregateError => "AggregateError",
        }
    }
}

/// A native error: a kind plus a message, before it has been reified into
/// a full `Error` object with a prototype chain and a `stack` property.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", kind.name())]
pub struct JsNativeError {
    pub kind: JsNativeErrorKind,
    pub message: String,
}

impl JsNativeError {
    pub fn new(kind: JsNativeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn typ(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::TypeError, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::RangeError, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::ReferenceError, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::SyntaxError, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::Error, message)
    }

    pub fn aggregate(message: impl Into<String>) -> Self {
        Self::new(JsNativeErrorKind::AggregateError, message)
    }
}

/// Whatever a `throw` statement (or an internal abstract operation) is
/// currently propagating. Most throws originate from [`JsNativeError`];
/// `Value` covers user code doing `throw "boom"` or `throw 42`.
#[derive(Debug, Clone)]
pub enum JsError {
    Native(JsNativeError),
    Value(JsValue),
}

impl JsError {
    pub fn message(&self) -> String {
        match self {
            Self::Native(native) => native.message.clone(),
            Self::Value(value) => value.to_display_string(),
        }
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => write!(f, "{native}"),
            Self::Value(value) => write!(f, "Uncaught {}", value.to_display_string()),
        }
    }
}

impl std::error::Error for JsError {}

impl From<JsNativeError> for JsError {
    fn from(native: JsNativeError) -> Self {
        Self::Native(native)
    }
}

impl From<JsValue> for JsError {
    fn from(value: JsValue) -> Self {
        Self::Value(value)
    }
}

/// The `Result` alias every abstract operation, intrinsic, and evaluator
/// entry point returns.
pub type JsResult<T> = Result<T, JsError>;
