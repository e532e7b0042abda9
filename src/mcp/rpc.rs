//! JSON-RPC style envelopes shared by both transports
//!
//! `id` is opaque: it is echoed verbatim and omitted when the request had none.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::RpcError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Request {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl Request {
    /// Decodes exactly one JSON document. A bare `null` is an empty request, which
    /// routes to "Method not found".
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        Ok(serde_json::from_slice::<Option<Self>>(bytes)?.unwrap_or_default())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl Response {
    /// A `null` result serializes with no `result` field at all.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            result: (!result.is_null()).then_some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<Value>, err: RpcError) -> Self {
        Self {
            result: None,
            error: Some(err.into()),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
