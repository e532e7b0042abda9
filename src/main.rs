use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use wolfram_mcp::{
    config::Config,
    http, logging,
    mcp::server::Dispatcher,
    stdio,
    wolfram_client::{QueryProvider, WolframAlphaClient},
};

/// MCP server exposing Wolfram Alpha computational queries over stdio or HTTP.
///
/// HTTP is used when a port is configured (`--port`, `MCP_WOLFRAM_PORT` or
/// `MCP_PORT`); otherwise requests are read from stdin.
#[derive(Parser, Debug)]
#[command(name = "wolfram-mcp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port for the HTTP transport.
    #[arg(long)]
    port: Option<u16>,

    /// Listen address for the HTTP transport.
    #[arg(long)]
    bind_addr: Option<String>,

    /// Serve over stdin/stdout even when a port is configured.
    #[arg(long, conflicts_with = "port")]
    stdio: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging();

    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if cli.stdio {
        config.port = None;
    }

    if config.api_key.is_none() {
        warn!("WOLFRAM_API_KEY environment variable not set. Queries will fail.");
    }

    let provider = WolframAlphaClient::from_config(&config)?
        .map(|client| Arc::new(client) as Arc<dyn QueryProvider>);
    let dispatcher = Arc::new(Dispatcher::with_query_provider(provider));

    if config.port.is_some() {
        let bind_socket = config.bind_socket()?;
        info!(
            bind_addr = %config.bind_addr,
            bind_port = bind_socket.port(),
            timeout_secs = config.query_timeout.map(|timeout| timeout.as_secs()),
            "starting HTTP transport"
        );
        http::serve(bind_socket, dispatcher).await?;
    } else {
        info!(tools = "query_wolfram", "starting stdio transport");
        stdio::serve(
            &dispatcher,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
        .await?;
    }

    Ok(())
}
