//!
//! Turnstile Server - HTTP host for the Turnstile flow engine
//!
//! Loads graph definitions and applications, wires the stock executors and
//! serves the flow API.

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Server module
pub mod server;

/// Logging setup
pub mod telemetry;

// Re-export key types
pub use api::{build_router, AppState};
pub use config::{LogFormat, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::TurnstileServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let server = TurnstileServer::build(config).await?;
    server.run().await
}
