use thiserror::Error;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Protocol-level failures. Each one is carried inside a `Response`, never raised
/// past the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("Parse error")]
    ParseError,
    #[error("Method not found")]
    MethodNotFound,
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
    #[error("Invalid parameters: {0} is required")]
    InvalidParameter(&'static str),
    #[error("Invalid arguments: {0} is required")]
    InvalidArgument(&'static str),
    #[error("Wolfram Alpha API key not configured")]
    NotConfigured,
    #[error("Wolfram query failed: {0}")]
    QueryFailed(String),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => PARSE_ERROR,
            Self::MethodNotFound | Self::ToolNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParameter(_) | Self::InvalidArgument(_) => INVALID_PARAMS,
            Self::NotConfigured | Self::QueryFailed(_) => INTERNAL_ERROR,
        }
    }
}
