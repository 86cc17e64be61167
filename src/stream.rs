//! Streaming channel adapter.
//!
//! Wraps a host async function whose result carries a live row stream,
//! adapting it into size-bounded batches delivered through the native
//! writer:
//!
//! ```text
//! handler ──► RowStream ── next_row() ──► pending batch ──► writer.chunk(batch)
//!                                             ▲                    │
//!                                             └──── await ack ─────┘
//! ```
//!
//! The writer acknowledgement is the backpressure gate: no further row
//! is pulled from the stream until the pending `chunk`/`end` call has
//! been acknowledged, so production above the sink's sustainable rate
//! stalls instead of buffering unboundedly.
//!
//! Failure from either direction — decode, handler, upstream row error,
//! or a failed acknowledgement — destroys the stream and terminates the
//! writer with a single `reject`. `end` and `reject` never both happen.

use std::sync::Arc;

use crate::channel::decode_argument;
use crate::config::BridgeTuning;
use crate::error::{ChannelDropped, HandlerFailure};
use crate::handle::{RowStream, StreamCallback, StreamHandler, StreamWriter};

/// Fixed message for a handler that resolved without a usable stream.
pub const NO_STREAM_MESSAGE: &str = "Expected stream but nothing returned";

/// Wrap a streaming host handler into a native-invokable callback.
///
/// The returned callback upholds the invocation invariant: `start()`
/// before any data, batches in production order, and exactly one of a
/// single `end` or a single `reject` per call.
pub fn wrap_stream_handler(handler: StreamHandler, tuning: &BridgeTuning) -> StreamCallback {
    let high_water_mark = tuning.high_water_mark;
    let trace = tuning.debug_trace;

    Arc::new(move |raw: String, mut writer: Box<dyn StreamWriter>| {
        let handler = Arc::clone(&handler);

        Box::pin(async move {
            let resolved = match decode_argument(&raw) {
                Ok(argument) => handler(argument).await,
                Err(failure) => Err(failure),
            };

            let mut stream = match resolved {
                Ok(Some(stream)) => stream,
                Ok(None) => {
                    // The invocation is already announced to the writer
                    // before the missing stream is reported.
                    writer.start();
                    guarded_reject(writer.as_mut(), NO_STREAM_MESSAGE.to_string(), trace);
                    return;
                }
                Err(failure) => {
                    guarded_reject(writer.as_mut(), failure.describe(), trace);
                    return;
                }
            };

            writer.start();
            if trace {
                tracing::debug!(high_water_mark, "writer.start");
            }

            if let Err(failure) =
                pump(stream.as_mut(), writer.as_mut(), high_water_mark, trace).await
            {
                stream.destroy();
                guarded_reject(writer.as_mut(), failure.describe(), trace);
            }
        })
    })
}

/// Drive one stream to completion: accumulate rows, flush full batches,
/// then flush the partial remainder and `end()`.
///
/// Returns `Err` for any condition that must terminate the writer with a
/// `reject` instead; the caller owns stream destruction.
async fn pump(
    stream: &mut dyn RowStream,
    writer: &mut dyn StreamWriter,
    high_water_mark: usize,
    trace: bool,
) -> Result<(), HandlerFailure> {
    let mut pending: Vec<crate::handle::Row> = Vec::with_capacity(high_water_mark);

    loop {
        match stream.next_row().await {
            Some(Ok(row)) => {
                pending.push(row);
                if pending.len() >= high_water_mark {
                    let batch =
                        std::mem::replace(&mut pending, Vec::with_capacity(high_water_mark));
                    if trace {
                        tracing::debug!(rows = batch.len(), "writer.chunk");
                    }
                    writer.chunk(batch).await.map_err(ack_failure)?;
                }
            }
            Some(Err(failure)) => return Err(failure),
            None => break,
        }
    }

    if !pending.is_empty() {
        if trace {
            tracing::debug!(rows = pending.len(), "writer.chunk (final)");
        }
        writer.chunk(pending).await.map_err(ack_failure)?;
    }

    if trace {
        tracing::debug!("writer.end");
    }
    writer.end().await.map_err(ack_failure)
}

/// A failed acknowledgement is treated identically to an upstream
/// stream error.
fn ack_failure(dropped: ChannelDropped) -> HandlerFailure {
    HandlerFailure::message(dropped.to_string())
}

/// Reject without letting a secondary sink failure escape.
fn guarded_reject(writer: &mut dyn StreamWriter, message: String, trace: bool) {
    if trace {
        tracing::debug!(message = %message, "writer.reject");
    }
    if let Err(dropped) = writer.reject(message) {
        if trace {
            tracing::debug!(error = %dropped, "writer.reject failed");
        }
    }
}
