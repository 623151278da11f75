use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use element_hider::cli::Cli;
use element_hider::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet the WebSocket stack by default; RUST_LOG still overrides
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("tungstenite=warn".parse().unwrap())
            .add_directive("tokio_tungstenite=warn".parse().unwrap())
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
