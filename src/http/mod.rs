//! HTTP transport for the Model Context Protocol
//!
//! One JSON request per POST body; each connection is served concurrently by axum.

use std::{io, net::SocketAddr, sync::Arc};

use tracing::info;

use crate::{build_app, mcp::server::Dispatcher};

pub mod handlers;

/// Blocks until the listener fails.
pub async fn serve(bind_socket: SocketAddr, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(bind_addr = %bind_socket, "MCP HTTP server listening");

    axum::serve(listener, build_app(dispatcher).into_make_service()).await
}
