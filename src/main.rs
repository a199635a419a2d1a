//! linecache server
//!
//! Answers one command per connection:
//! - `PING`, `ECHO <text>`
//! - `SET <key> <value>`, `GET <key>`, `DEL <key>`
//!
//! Configuration via CLI arguments or TOML file.

use linecache::config::Config;
use linecache::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!(listen = %config.listen, "Starting linecache server");

    Server::new(config).run().await
}
