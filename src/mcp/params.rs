//! Typed views over the untyped `params` bag
//!
//! Validation happens here so the -32602 paths can be checked without a dispatcher.

use serde_json::{Map, Value};

use crate::errors::RpcError;

/// `tools/call` parameters: a tool name plus its argument object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCallParams {
    pub fn parse(params: Option<&Map<String, Value>>) -> Result<Self, RpcError> {
        let name = params
            .and_then(|params| params.get("name"))
            .and_then(Value::as_str)
            .ok_or(RpcError::InvalidParameter("name"))?;

        let arguments = params
            .and_then(|params| params.get("arguments"))
            .and_then(Value::as_object)
            .ok_or(RpcError::InvalidParameter("arguments"))?;

        Ok(Self {
            name: name.to_string(),
            arguments: arguments.clone(),
        })
    }
}
