//! Registration facade for the native SQL interface.
//!
//! [`SqlInterfaceOptions`] collects the four named handlers plus the
//! transport options the native side needs, validates the bundle, wraps
//! each handler into its channel adapter, and hands the wrapped
//! registration to the [`NativeRuntime`].
//!
//! # Lifecycle
//!
//! ```text
//! register_interface(native, options)
//!   ├─ read tuning (env) once
//!   ├─ validate: all four handlers present, else fail fast
//!   ├─ wrap: check_auth/load/meta → completion adapter, stream → stream adapter
//!   └─ NativeRuntime::register_interface(…) → SqlInterfaceInstance
//!
//! shutdown_interface(native, instance, tuning)
//!   ├─ NativeRuntime::shutdown_interface(instance)
//!   └─ sleep(shutdown_grace)   — lets in-flight terminal calls land
//! ```

use core::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::channel::wrap_completion_handler;
use crate::config::BridgeTuning;
use crate::error::{BridgeError, BridgeResult, HandlerFailure};
use crate::handle::{
    CompletionCallback, CompletionHandler, HandlerResult, RowStream, SqlInterfaceInstance,
    StreamCallback, StreamHandler,
};
use crate::protocol::LogLevel;
use crate::stream::wrap_stream_handler;

// ════════════════════════════════════════════════════════════════════
// NativeRuntime trait
// ════════════════════════════════════════════════════════════════════

/// The native registration surface the facade is exposed to.
///
/// Implemented over whatever foreign-call mechanism binds the compiled
/// engine; the facade depends only on this trait.
#[async_trait]
pub trait NativeRuntime: Send + Sync {
    /// Install a wrapped handler bundle and return the live-instance
    /// handle.
    async fn register_interface(
        &self,
        registration: InterfaceRegistration,
    ) -> BridgeResult<SqlInterfaceInstance>;

    /// Initiate native-side teardown of a live registration.
    async fn shutdown_interface(&self, instance: SqlInterfaceInstance) -> BridgeResult<()>;

    /// Install a host-side log sink at the given level.
    async fn setup_logger(&self, logger: CompletionCallback, level: LogLevel) -> BridgeResult<()>;
}

/// The wrapped handler bundle plus transport options handed to
/// [`NativeRuntime::register_interface`].
pub struct InterfaceRegistration {
    /// MySQL-protocol listen port, when enabled.
    pub port: Option<u16>,
    /// Postgres-protocol listen port, when enabled.
    pub pg_port: Option<u16>,
    /// Handshake nonce, opaque to the bridge.
    pub nonce: Option<String>,
    pub check_auth: CompletionCallback,
    pub load: CompletionCallback,
    pub meta: CompletionCallback,
    pub stream: StreamCallback,
}

impl std::fmt::Debug for InterfaceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceRegistration")
            .field("port", &self.port)
            .field("pg_port", &self.pg_port)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

// ════════════════════════════════════════════════════════════════════
// Options builder
// ════════════════════════════════════════════════════════════════════

/// Configuration bundle for one interface registration.
///
/// # Example
///
/// ```rust,ignore
/// use sqlbridge::{register_interface, SqlInterfaceOptions};
/// use serde_json::json;
///
/// let options = SqlInterfaceOptions::new()
///     .pg_port(5433)
///     .check_auth(|payload| async move { Ok(json!({ "password": null, "superuser": false })) })
///     .load(|payload| async move { run_query(payload).await })
///     .meta(|payload| async move { describe_schema(payload).await })
///     .stream(|payload| async move { open_row_stream(payload).await });
///
/// let instance = register_interface(&native, options).await?;
/// ```
#[derive(Default)]
pub struct SqlInterfaceOptions {
    port: Option<u16>,
    pg_port: Option<u16>,
    nonce: Option<String>,
    tuning: Option<BridgeTuning>,
    check_auth: Option<CompletionHandler>,
    load: Option<CompletionHandler>,
    meta: Option<CompletionHandler>,
    stream: Option<StreamHandler>,
}

impl SqlInterfaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// MySQL-protocol listen port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Postgres-protocol listen port.
    pub fn pg_port(mut self, port: u16) -> Self {
        self.pg_port = Some(port);
        self
    }

    /// Handshake nonce forwarded to the native side.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Use explicit tuning instead of reading the environment at
    /// registration time.
    pub fn with_tuning(mut self, tuning: BridgeTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    /// Handler for authentication checks (result-style).
    pub fn check_auth<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.check_auth = Some(completion_handler(handler));
        self
    }

    /// Handler for data-load requests (result-style).
    pub fn load<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.load = Some(completion_handler(handler));
        self
    }

    /// Handler for metadata requests (result-style).
    pub fn meta<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.meta = Some(completion_handler(handler));
        self
    }

    /// Handler for streamed data-load requests.
    pub fn stream<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Box<dyn RowStream>>, HandlerFailure>> + Send + 'static,
    {
        self.stream = Some(Arc::new(move |payload| Box::pin(handler(payload))));
        self
    }

    /// Validate the bundle and wrap every handler into its adapter.
    ///
    /// Fails before any native call when a handler is missing — there is
    /// no partial registration.
    pub(crate) fn into_registration(
        self,
        tuning: &BridgeTuning,
    ) -> BridgeResult<InterfaceRegistration> {
        let check_auth = self
            .check_auth
            .ok_or(BridgeError::missing_handler("check_auth"))?;
        let load = self.load.ok_or(BridgeError::missing_handler("load"))?;
        let meta = self.meta.ok_or(BridgeError::missing_handler("meta"))?;
        let stream = self.stream.ok_or(BridgeError::missing_handler("stream"))?;

        Ok(InterfaceRegistration {
            port: self.port,
            pg_port: self.pg_port,
            nonce: self.nonce,
            check_auth: wrap_completion_handler(check_auth, tuning),
            load: wrap_completion_handler(load, tuning),
            meta: wrap_completion_handler(meta, tuning),
            stream: wrap_stream_handler(stream, tuning),
        })
    }
}

fn completion_handler<F, Fut>(handler: F) -> CompletionHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(handler(payload)))
}

// ════════════════════════════════════════════════════════════════════
// Facade operations
// ════════════════════════════════════════════════════════════════════

/// Validate, wrap, and install a handler bundle into the native runtime.
///
/// Tuning is read from the environment once here (unless overridden via
/// [`SqlInterfaceOptions::with_tuning`]) and passed into every adapter.
pub async fn register_interface(
    native: &dyn NativeRuntime,
    options: SqlInterfaceOptions,
) -> BridgeResult<SqlInterfaceInstance> {
    let tuning = options
        .tuning
        .clone()
        .unwrap_or_else(BridgeTuning::from_env);

    let registration = options.into_registration(&tuning)?;

    tracing::debug!(
        port = ?registration.port,
        pg_port = ?registration.pg_port,
        high_water_mark = tuning.high_water_mark,
        "registering SQL interface"
    );

    native.register_interface(registration).await
}

/// Tear down a live registration.
///
/// Issues the native shutdown call, then waits the settle-grace period
/// so in-flight resolve/reject/end calls can land; after this returns,
/// no further callback invocations occur for the instance.
pub async fn shutdown_interface(
    native: &dyn NativeRuntime,
    instance: SqlInterfaceInstance,
    tuning: &BridgeTuning,
) -> BridgeResult<()> {
    tracing::debug!(%instance, "shutting down SQL interface");
    native.shutdown_interface(instance).await?;
    tokio::time::sleep(tuning.shutdown_grace).await;
    Ok(())
}

/// Install a host-side log sink into the native runtime.
///
/// The logger is an ordinary result-style handler: it receives one JSON
/// log record per invocation and its outcome travels through the same
/// completion adapter as any other handler.
pub async fn setup_logger<F, Fut>(
    native: &dyn NativeRuntime,
    logger: F,
    level: LogLevel,
    tuning: &BridgeTuning,
) -> BridgeResult<()>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let wrapped = wrap_completion_handler(completion_handler(logger), tuning);
    native.setup_logger(wrapped, level).await
}
