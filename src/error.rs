//! Error types for the bridge.
//!
//! Two kinds of failure live here and they travel very different paths:
//!
//! - [`BridgeError`] — errors surfaced to the embedding application, e.g.
//!   a registration bundle missing a handler. Only configuration problems
//!   may ever reach the caller synchronously; everything that happens once
//!   the native side starts invoking callbacks terminates inside the
//!   adapters.
//! - [`HandlerFailure`] — the failure value produced by (or on behalf of)
//!   a host handler. It is never propagated as a Rust error across the
//!   boundary; it is flattened to a human-readable message and delivered
//!   through the native channel's `reject`.

use serde_json::Value;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fallback message used when a failure carries nothing describable.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors that can occur while configuring or registering the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A required handler is absent from the registration bundle.
    #[error("options.{name} must be a function")]
    MissingHandler { name: &'static str },

    /// The native side refused or failed the registration call.
    #[error("Native registration failed: {reason}")]
    Registration { reason: String },

    /// A native handle was gone before a terminal call could be delivered.
    #[error(transparent)]
    ChannelDropped(#[from] ChannelDropped),

    /// JSON encode/decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    /// Create a missing-handler configuration error.
    pub fn missing_handler(name: &'static str) -> Self {
        Self::MissingHandler { name }
    }

    /// Create a registration failure error.
    pub fn registration(reason: impl Into<String>) -> Self {
        Self::Registration {
            reason: reason.into(),
        }
    }
}

/// The native side dropped or already consumed a completion/writer handle.
///
/// Terminal calls on a handle return this instead of panicking so that a
/// double resolve/reject from a confused peer degrades to a swallowed,
/// optionally-logged event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("native channel is gone")]
pub struct ChannelDropped;

/// A failure raised by a host handler or manufactured on its behalf
/// (argument decode errors, missing streams, upstream row errors).
///
/// Handlers on the host side fail with arbitrary shapes: a structured
/// error object, a bare message, sometimes only a stack trace or a raw
/// value. [`HandlerFailure::describe`] flattens whatever is present into
/// the single message string the native channel expects.
#[derive(Debug, Clone, Default)]
pub struct HandlerFailure {
    /// Explicit error text, highest precedence.
    pub error: Option<String>,
    /// Conventional message field.
    pub message: Option<String>,
    /// Stack trace text.
    pub stack: Option<String>,
    /// The raw failure value, used as a last resort.
    pub value: Option<Value>,
}

impl HandlerFailure {
    /// Failure carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Build a failure from an arbitrary JSON value, lifting the
    /// conventional `error` / `message` / `stack` fields out of objects.
    pub fn from_value(value: Value) -> Self {
        let field = |v: &Value, name: &str| {
            v.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };

        Self {
            error: field(&value, "error"),
            message: field(&value, "message"),
            stack: field(&value, "stack"),
            value: Some(value),
        }
    }

    /// Flatten this failure to a message string.
    ///
    /// Precedence: explicit `error` text, then `message`, then `stack`,
    /// then the stringified raw value, then [`UNKNOWN_ERROR`]. Empty
    /// strings never win over a later candidate.
    pub fn describe(&self) -> String {
        let nonempty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());

        nonempty(&self.error)
            .or_else(|| nonempty(&self.message))
            .or_else(|| nonempty(&self.stack))
            .or_else(|| self.value.as_ref().map(stringify_value))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}

/// Bare strings render as-is, everything else as compact JSON.
fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl std::error::Error for HandlerFailure {}

impl From<serde_json::Error> for HandlerFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::message(err.to_string())
    }
}

impl From<anyhow::Error> for HandlerFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::message(format!("{err:#}"))
    }
}
