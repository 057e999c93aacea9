use anyhow::{Context, Result};
use turnstile_server::{config::ServerConfig, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from the config file and environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    telemetry::init_logging(&config).context("Failed to initialize logging")?;

    // Run the server using the library's run function
    turnstile_server::run(config).await.context("Server error")?;

    Ok(())
}
