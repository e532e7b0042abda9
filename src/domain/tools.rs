//! Tools exposed via Model Context Protocol
//!
//! Each tool is a `ToolHandler`: a static descriptor plus argument validation and
//! invocation. The dispatcher only ever talks to the `ToolRegistry`.

use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::{
    macros,
    schema::{CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::format::format_result_as_text, errors::RpcError, wolfram_client::QueryProvider,
};

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> Tool;

    fn validate(&self, arguments: &Map<String, Value>) -> Result<(), RpcError>;

    async fn invoke(&self, arguments: &Map<String, Value>) -> Result<CallToolResult, RpcError>;
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn ToolHandler>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `query_wolfram` tool. A `None` provider means no
    /// API key was configured; calls then fail with -32603.
    pub fn builtin(provider: Option<Arc<dyn QueryProvider>>) -> Self {
        Self::new().register(Arc::new(QueryWolfram::new(provider)))
    }

    pub fn register(mut self, tool: Arc<dyn ToolHandler>) -> Self {
        let name = tool.descriptor().name;
        self.tools.retain(|(existing, _)| *existing != name);
        self.tools.push((name, tool));
        self
    }

    pub fn descriptors(&self) -> Vec<Tool> {
        self.tools.iter().map(|(_, tool)| tool.descriptor()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.tools
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, tool)| tool)
    }
}

#[macros::mcp_tool(
    name = "query_wolfram",
    description = "Query Wolfram Alpha for mathematical, scientific, and computational answers. Supports math calculations, symbolic operations, scientific data, unit conversions, and natural language questions."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct QueryWolframArgs {
    /// The query to send to Wolfram Alpha
    pub query: String,
}

impl QueryWolframArgs {
    fn parse(arguments: &Map<String, Value>) -> Result<Self, RpcError> {
        serde_json::from_value(Value::Object(arguments.clone()))
            .map_err(|_| RpcError::InvalidArgument("query"))
    }
}

pub struct QueryWolfram {
    provider: Option<Arc<dyn QueryProvider>>,
}

impl QueryWolfram {
    pub fn new(provider: Option<Arc<dyn QueryProvider>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for QueryWolfram {
    fn descriptor(&self) -> Tool {
        QueryWolframArgs::tool()
    }

    fn validate(&self, arguments: &Map<String, Value>) -> Result<(), RpcError> {
        QueryWolframArgs::parse(arguments).map(|_| ())
    }

    async fn invoke(&self, arguments: &Map<String, Value>) -> Result<CallToolResult, RpcError> {
        let args = QueryWolframArgs::parse(arguments)?;
        let provider = self.provider.as_ref().ok_or(RpcError::NotConfigured)?;

        let result = provider
            .query(&args.query)
            .await
            .map_err(|err| RpcError::QueryFailed(err.to_string()))?;

        Ok(CallToolResult {
            content: vec![ContentBlock::from(TextContent::new(
                format_result_as_text(&result),
                None,
                None,
            ))],
            is_error: None,
            meta: None,
            structured_content: None,
        })
    }
}
