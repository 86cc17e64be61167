//! Typed payloads exchanged through the bridge.
//!
//! The adapters themselves move opaque JSON; these types are the shapes
//! that JSON takes for the four registered handlers, provided so typed
//! handler implementations can deserialize their argument in one step.
//! Field names follow the camelCase wire convention of the native side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to every inbound request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseMeta {
    /// Wire protocol the client connected with (e.g. `postgres`, `mysql`).
    pub protocol: String,
    /// Always `sql` for this interface.
    pub api_type: String,
    /// Client application name, when the client announced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

/// Request metadata for data-load requests; adds security-context
/// switching on top of [`BaseMeta`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequestMeta {
    #[serde(flatten)]
    pub base: BaseMeta,
    /// User to impersonate for this request, when permitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_user: Option<String>,
}

/// An inbound request envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext<M> {
    /// Native-assigned request id.
    pub id: String,
    /// Request metadata; `()` for requests that carry none.
    pub meta: M,
}

/// Authenticated session state threaded through load/meta requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user: Option<String>,
    pub superuser: bool,
}

/// Argument of the `check_auth` handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthPayload {
    pub request: RequestContext<Option<Value>>,
    pub user: Option<String>,
}

/// Result of the `check_auth` handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthResponse {
    pub password: Option<String>,
    pub superuser: bool,
}

/// Argument of the `load` and `stream` handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadPayload {
    pub request: RequestContext<LoadRequestMeta>,
    pub session: SessionContext,
    /// The query itself, opaque to the bridge.
    pub query: Value,
}

/// Argument of the `meta` handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaPayload {
    pub request: RequestContext<Option<Value>>,
    pub session: SessionContext,
}

/// Severity accepted by the native log sink installed via
/// [`setup_logger`](crate::setup_logger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_payload_uses_camel_case_wire_names() {
        let raw = json!({
            "request": {
                "id": "req-1",
                "meta": {
                    "protocol": "postgres",
                    "apiType": "sql",
                    "appName": "Metabase",
                    "changeUser": "analyst"
                }
            },
            "session": { "user": "admin", "superuser": true },
            "query": { "measures": ["Orders.count"] }
        });

        let payload: LoadPayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(payload.request.id, "req-1");
        assert_eq!(payload.request.meta.base.protocol, "postgres");
        assert_eq!(payload.request.meta.change_user.as_deref(), Some("analyst"));
        assert!(payload.session.superuser);

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn optional_meta_fields_are_omitted_when_absent() {
        let meta = BaseMeta {
            protocol: "mysql".into(),
            api_type: "sql".into(),
            app_name: None,
        };
        let encoded = serde_json::to_value(&meta).unwrap();
        assert_eq!(encoded, json!({ "protocol": "mysql", "apiType": "sql" }));
    }

    #[test]
    fn check_auth_roundtrip() {
        let payload = CheckAuthPayload {
            request: RequestContext {
                id: "req-9".into(),
                meta: None,
            },
            user: Some("alice".into()),
        };
        let encoded = serde_json::to_string(&payload).unwrap();
        let decoded: CheckAuthPayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn log_level_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_value(LogLevel::Warn).unwrap(), json!("warn"));
        let level: LogLevel = serde_json::from_value(json!("trace")).unwrap();
        assert_eq!(level, LogLevel::Trace);
    }
}
