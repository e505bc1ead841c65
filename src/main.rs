//! chatd - a minimal multi-client chat relay server.

use chatd::config::Config;
use chatd::console;
use chatd::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };

    let server = Server::bind(&config).await?;
    info!("Server is running, waiting for clients");

    // Operator-typed lines go out to every connected peer.
    tokio::spawn(console::run(server.registry()));

    server.run().await;
    Ok(())
}
