//! SQLBridge — host-side async bridge for a native SQL engine
//!
//! This crate lets a native, non-garbage-collected SQL engine invoke
//! async callback handlers implemented on the managed host side, and
//! receive their results — or a backpressured stream of row batches —
//! back across the boundary, with correct error propagation and resource
//! cleanup on every exit path.
//!
//! ## Overview
//!
//! - **Result channel adapter** ([`channel`]): wraps a handler so its
//!   value or failure is delivered exactly once to the native completion
//!   channel, payloads JSON-encoded.
//! - **Streaming channel adapter** ([`stream`]): wraps a handler whose
//!   result is a live row stream, batching rows up to a high-water mark
//!   and awaiting each native acknowledgement before producing more.
//! - **Registration facade** ([`interface`]): validates the named
//!   handler bundle, wraps it, installs it through [`NativeRuntime`],
//!   and manages teardown with a settle-grace period.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlbridge::{register_interface, shutdown_interface, BridgeTuning, SqlInterfaceOptions};
//! use serde_json::json;
//!
//! let options = SqlInterfaceOptions::new()
//!     .pg_port(5433)
//!     .check_auth(|payload| async move { check_credentials(payload).await })
//!     .load(|payload| async move { run_query(payload).await })
//!     .meta(|payload| async move { describe_schema(payload).await })
//!     .stream(|payload| async move { open_row_stream(payload).await });
//!
//! let instance = register_interface(&native, options).await?;
//! // … serve traffic …
//! shutdown_interface(&native, instance, &BridgeTuning::from_env()).await?;
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod handle;
pub mod interface;
pub mod protocol;
pub mod stream;

// Re-export main types for convenience
pub use config::{
    BridgeTuning, DEFAULT_SHUTDOWN_GRACE, DEFAULT_STREAM_HIGH_WATER_MARK, INTERNAL_DEBUG_ENV,
    STREAM_HIGH_WATER_MARK_ENV,
};
pub use error::{BridgeError, BridgeResult, ChannelDropped, HandlerFailure, UNKNOWN_ERROR};
pub use handle::{
    BoxFuture, CompletionCallback, CompletionChannel, CompletionHandler, HandlerResult, Row,
    RowStream, SqlInterfaceInstance, StreamCallback, StreamHandler, StreamWriter,
};
pub use interface::{
    register_interface, setup_logger, shutdown_interface, InterfaceRegistration, NativeRuntime,
    SqlInterfaceOptions,
};
pub use protocol::{
    BaseMeta, CheckAuthPayload, CheckAuthResponse, LoadPayload, LoadRequestMeta, LogLevel,
    MetaPayload, RequestContext, SessionContext,
};
pub use stream::NO_STREAM_MESSAGE;
