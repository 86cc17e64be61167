//! Result channel adapter.
//!
//! Wraps a single host async function so that its outcome — value or
//! failure — is delivered exactly once to the native completion channel
//! for that invocation:
//!
//! ```text
//! native ── (raw JSON, channel) ──► decode ──► handler ──► resolve(json)
//!                                      │           │
//!                                      └── failure ┴─────► reject(message)
//! ```
//!
//! Decode failures funnel through the same reject path as handler
//! failures; a failing `reject` itself is swallowed so nothing ever
//! escapes to crash the calling context.

use std::sync::Arc;

use serde_json::Value;

use crate::config::BridgeTuning;
use crate::error::HandlerFailure;
use crate::handle::{CompletionCallback, CompletionChannel, CompletionHandler};

/// Decode a raw serialized argument. Malformed input becomes a handler
/// failure, not a protocol error.
pub(crate) fn decode_argument(raw: &str) -> Result<Value, HandlerFailure> {
    serde_json::from_str(raw).map_err(HandlerFailure::from)
}

/// `true` for values that collapse to an empty resolve payload: null,
/// `false`, numeric zero, and empty strings/collections.
pub(crate) fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Encode a handler result for the resolve payload.
fn encode_result(value: &Value) -> String {
    if is_empty_payload(value) {
        String::new()
    } else {
        value.to_string()
    }
}

/// Wrap a result-style host handler into a native-invokable callback.
///
/// The returned callback upholds the invocation invariant: exactly one
/// of a single `resolve` or a single `reject` per call, and no error
/// propagation past the adapter boundary.
pub fn wrap_completion_handler(
    handler: CompletionHandler,
    tuning: &BridgeTuning,
) -> CompletionCallback {
    let trace = tuning.debug_trace;

    Arc::new(move |raw: String, mut channel: Box<dyn CompletionChannel>| {
        let handler = Arc::clone(&handler);

        Box::pin(async move {
            let outcome = match decode_argument(&raw) {
                Ok(argument) => handler(argument).await,
                Err(failure) => Err(failure),
            };

            match outcome {
                Ok(value) => {
                    let payload = encode_result(&value);
                    if trace {
                        tracing::debug!(payload = %payload, "channel.resolve");
                    }
                    if let Err(dropped) = channel.resolve(payload) {
                        // The channel went away under us; all that is left
                        // is a guarded best-effort reject.
                        guarded_reject(channel.as_mut(), dropped.to_string(), trace);
                    }
                }
                Err(failure) => {
                    let message = failure.describe();
                    if trace {
                        tracing::debug!(message = %message, "channel.reject");
                    }
                    guarded_reject(channel.as_mut(), message, trace);
                }
            }
        })
    })
}

/// Reject without letting a secondary sink failure escape.
fn guarded_reject(channel: &mut dyn CompletionChannel, message: String, trace: bool) {
    if let Err(dropped) = channel.reject(message) {
        if trace {
            tracing::debug!(error = %dropped, "channel.reject failed");
        }
    }
}
