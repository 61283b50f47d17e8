//! JSON-RPC protocol representations
//!
//! Inbound messages decode into [`Request`]; everything the server writes back
//! is a [`Response`] carrying either a result or an [`RpcError`], never both.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{value::RawValue, Value};

use crate::mcp::{registry::Capabilities, server::ServerIdentity};

pub const JSONRPC_VERSION: &str = "2.0";
pub const HANDSHAKE_PROTOCOL_VERSION: &str = "1.0";
pub const NOTIFICATION_PREFIX: &str = "notifications/";

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const SERVER_NOT_INITIALIZED: i64 = -32002;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Integer(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A decoded JSON-RPC message.
///
/// `jsonrpc` and `method` default to empty strings so that an envelope missing
/// them still reaches version validation instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    /// Notifications carry no `id` or use a `notifications/` method; they are never answered.
    pub fn is_notification(&self) -> bool {
        self.id.is_none() || self.method.starts_with(NOTIFICATION_PREFIX)
    }

    pub fn reply_id(&self) -> Option<&RequestId> {
        if self.is_notification() {
            None
        } else {
            self.id.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Results are kept pre-serialized so struct field order survives onto the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

impl Response {
    pub fn success<T: Serialize>(id: RequestId, result: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(serde_json::value::to_raw_value(result)?),
            error: None,
        })
    }

    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn result(&self) -> Option<&RawValue> {
        self.result.as_deref()
    }

    pub fn rpc_error(&self) -> Option<&RpcError> {
        self.error.as_ref()
    }
}

/// Payload of a successful `initialize` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResult<'a> {
    pub protocol_version: &'static str,
    pub server_info: &'a ServerIdentity,
    pub capabilities: &'a Capabilities,
}
