//! Stdio transport: newline-delimited JSON requests in, one JSON response line out
//!
//! Requests are handled strictly one at a time. Lines that do not decode into a
//! request are logged and skipped without a response.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::mcp::{rpc::Request, server::Dispatcher};

/// Runs until end of input. A read failure ends the loop and is returned.
pub async fn serve<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("MCP Wolfram server ready. Listening on stdin/stdout...");

    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            debug!("EOF reached on stdio input");
            return Ok(());
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let request = match Request::from_slice(trimmed) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "failed to parse request");
                continue;
            }
        };

        let response = dispatcher.handle(request).await;
        if let Err(err) = write_response(&mut writer, &response).await {
            warn!(error = %err, "failed to write response");
        }
    }
}

async fn write_response<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let mut frame = serde_json::to_vec(message)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await
}
