//! Project Rename Server - Entry Point
//!
//! Renames a project folder tree in shared storage and syncs the outcome to
//! the status ledger and the change notification channel.

use log::{error, info};

use project_rename_server::Server;
use project_rename_server::config::AppConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching project rename server...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
