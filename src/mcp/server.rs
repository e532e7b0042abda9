//! The central Model Context Protocol engine
//!
//! Routes a method-named request to its handler and folds the outcome into a
//! `Response`. The dispatcher holds no mutable state, so one instance is shared by
//! every transport and every concurrent HTTP request.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::domain::{
    resources::{build_resources_list, handle_resources_read},
    tools::ToolRegistry,
};
use crate::errors::RpcError;
use crate::mcp::{
    params::ToolCallParams,
    rpc::{Request, Response},
};
use crate::wolfram_client::QueryProvider;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "MCP Wolfram Server";
pub const SERVER_TYPE: &str = "wolfram";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    ResourcesList,
    ResourcesRead,
    ToolsList,
    ToolsCall,
    Ping,
    ServerInfo,
}

pub const ROUTES: [(&str, Method); 8] = [
    ("initialize", Method::Initialize),
    ("initialized", Method::Initialized),
    ("resources/list", Method::ResourcesList),
    ("resources/read", Method::ResourcesRead),
    ("tools/list", Method::ToolsList),
    ("tools/call", Method::ToolsCall),
    ("ping", Method::Ping),
    ("server_info", Method::ServerInfo),
];

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        ROUTES
            .iter()
            .find(|(route, _)| *route == name)
            .map(|(_, method)| *method)
    }
}

pub struct Dispatcher {
    tools: ToolRegistry,
}

impl Dispatcher {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    pub fn with_query_provider(provider: Option<Arc<dyn QueryProvider>>) -> Self {
        Self::new(ToolRegistry::builtin(provider))
    }

    /// Produces exactly one response per request, echoing its `id`.
    pub async fn handle(&self, request: Request) -> Response {
        debug!(method = %request.method, "handling MCP request");

        let Request { method, params, id } = request;
        let audit_params = redact_audit_params(params.as_ref());

        let response = match self.route(&method, params.as_ref()).await {
            Ok(result) => Response::success(id, result),
            Err(err) => Response::failure(id, err),
        };

        info!(
            method = %method,
            params = %audit_params,
            outcome = if response.is_error() { "failure" } else { "success" },
            "mcp action audited"
        );

        response
    }

    async fn route(
        &self,
        method: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<Value, RpcError> {
        let Some(method) = Method::from_name(method) else {
            return Err(RpcError::MethodNotFound);
        };

        match method {
            Method::Initialize => Ok(json!({
                "protocolVersion": SUPPORTED_PROTOCOL_VERSION,
                "capabilities": { "tools": true },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            Method::Initialized => Ok(Value::Null),
            Method::ResourcesList => Ok(build_resources_list()),
            Method::ResourcesRead => Ok(handle_resources_read(params)),
            Method::ToolsList => Ok(json!({
                "tools": serde_json::to_value(self.tools.descriptors())
                    .expect("tool descriptor serialization")
            })),
            Method::ToolsCall => self.call_tool(params).await,
            Method::Ping => Ok(json!({ "pong": true })),
            Method::ServerInfo => Ok(json!({
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "type": SERVER_TYPE
            })),
        }
    }

    async fn call_tool(&self, params: Option<&Map<String, Value>>) -> Result<Value, RpcError> {
        let call = ToolCallParams::parse(params)?;
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| RpcError::ToolNotFound(call.name.clone()))?;

        tool.validate(&call.arguments)?;
        let result = tool.invoke(&call.arguments).await?;

        Ok(serde_json::to_value(result).expect("tool result serialization"))
    }
}

pub fn redact_audit_params(params: Option<&Map<String, Value>>) -> Value {
    params
        .map(|map| redact_audit_value(&Value::Object(map.clone())))
        .unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "appid" | "authorization")
        || normalized.contains("api_key")
        || normalized.contains("apikey")
        || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
