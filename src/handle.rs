//! Handle traits at the native/host boundary.
//!
//! Everything the adapters touch on the far side of the boundary is
//! reached through one of these traits; the adapters depend only on the
//! interfaces, never on the concrete binding mechanism (FFI callback
//! structs, in-process test doubles, …).
//!
//! Ownership rules:
//!
//! - [`CompletionChannel`] and [`StreamWriter`] are created by the native
//!   side and lent to the adapter for exactly one invocation. The adapter
//!   makes exactly one terminal call and retains no reference afterwards.
//! - [`RowStream`] is produced by the host handler and owned exclusively
//!   by the adapter for the invocation; on any error path the adapter
//!   calls [`RowStream::destroy`] to halt upstream production.

use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ChannelDropped, HandlerFailure};

/// Type alias matching the pattern used throughout the crate (no
/// `async_trait` at the plain-function seams).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single result row as produced by the host stream.
pub type Row = serde_json::Value;

/// Outcome of a result-style host handler.
pub type HandlerResult = Result<serde_json::Value, HandlerFailure>;

/// A result-style host handler: decoded JSON argument in, value or
/// failure out.
pub type CompletionHandler =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A streaming host handler. Resolving to `None` means the handler
/// produced no usable stream, which the adapter reports as a failure.
pub type StreamHandler = Arc<
    dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<Option<Box<dyn RowStream>>, HandlerFailure>>
        + Send
        + Sync,
>;

/// A wrapped result-style handler, ready for native registration: raw
/// serialized argument plus the completion channel for this invocation.
pub type CompletionCallback =
    Arc<dyn Fn(String, Box<dyn CompletionChannel>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A wrapped streaming handler, ready for native registration.
pub type StreamCallback =
    Arc<dyn Fn(String, Box<dyn StreamWriter>) -> BoxFuture<'static, ()> + Send + Sync>;

/// One-shot resolve/reject sink for a single request/response invocation.
///
/// Exactly one of [`resolve`](Self::resolve) / [`reject`](Self::reject)
/// is legal per handle. A call after the handle was consumed (or after
/// the native peer went away) returns [`ChannelDropped`] rather than
/// panicking; the adapter swallows that secondary failure.
pub trait CompletionChannel: Send {
    /// Deliver a successful result. The payload is either the JSON
    /// encoding of the handler's value or the empty string for an empty
    /// payload.
    fn resolve(&mut self, payload: String) -> Result<(), ChannelDropped>;

    /// Deliver a failure message.
    fn reject(&mut self, message: String) -> Result<(), ChannelDropped>;
}

/// Multi-use, backpressure-aware sink for a streamed sequence of row
/// batches.
///
/// Lifecycle per invocation: `start()` exactly once before any data,
/// then zero or more `chunk()` calls, terminated by exactly one of
/// `end()` or `reject()`. The awaited results of [`chunk`](Self::chunk)
/// and [`end`](Self::end) are the native acknowledgements — the adapter
/// must not produce further rows until the pending acknowledgement
/// completes.
#[async_trait]
pub trait StreamWriter: Send {
    /// Announce that a stream of batches will follow.
    fn start(&mut self);

    /// Deliver one ordered batch of rows and await its acknowledgement.
    async fn chunk(&mut self, rows: Vec<Row>) -> Result<(), ChannelDropped>;

    /// Terminate the stream successfully and await the acknowledgement.
    async fn end(&mut self) -> Result<(), ChannelDropped>;

    /// Terminate the stream with a failure message.
    fn reject(&mut self, message: String) -> Result<(), ChannelDropped>;
}

/// The host-side row source backing one streaming invocation.
///
/// Pull-based: the adapter awaits one row at a time, which is what makes
/// the writer acknowledgement an effective backpressure gate — while an
/// acknowledgement is pending, nobody is pulling.
#[async_trait]
pub trait RowStream: Send {
    /// Next row, a terminal upstream error, or `None` at end-of-stream.
    async fn next_row(&mut self) -> Option<Result<Row, HandlerFailure>>;

    /// Halt upstream production. Called by the adapter on every error
    /// path; best-effort — a source that ignores it may keep running in
    /// the background.
    fn destroy(&mut self);
}

/// Opaque handle for a live interface registration, produced by the
/// native side and accepted back by
/// [`shutdown_interface`](crate::shutdown_interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlInterfaceInstance(u64);

impl SqlInterfaceInstance {
    /// Wrap a native-assigned instance id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The native-assigned instance id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SqlInterfaceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sqlinterface-{}", self.0)
    }
}
