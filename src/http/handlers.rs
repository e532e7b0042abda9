//! Axum HTTP handler for the MCP endpoint
//!
//! Protocol errors travel inside a 200 response. Only a body that cannot be
//! decoded into a request is reflected in the HTTP status.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::errors::RpcError;
use crate::mcp::{rpc, server::Dispatcher};

pub async fn mcp_endpoint(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> Response {
    let request = match rpc::Request::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "failed to parse request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc::Response::failure(None, RpcError::ParseError)),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(dispatcher.handle(request).await)).into_response()
}
