//! `parlor-server`: runs the tic-tac-toe room server.

use clap::Parser;
use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

/// Real-time game-room server.
#[derive(Debug, Parser)]
#[command(name = "parlor-server", version, about)]
struct Cli {
    /// Interface both listeners bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port of the HTTP room API.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Port of the WebSocket event channel.
    #[arg(long, env = "WS_PORT", default_value_t = 3001)]
    ws_port: u16,
}

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let server = ParlorServerBuilder::new()
        .http_bind(&format!("{}:{}", cli.host, cli.port))
        .ws_bind(&format!("{}:{}", cli.host, cli.ws_port))
        .build::<TicTacToe>()
        .await?;

    server.run().await
}
