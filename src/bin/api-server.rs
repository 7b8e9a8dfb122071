//! Macro Signals API Server
//!
//! Serves the indicator snapshot and the ranked signal table over HTTP.
//! Snapshots are cached for `CACHE_TTL_SECS` to bound upstream request rate.

use dotenvy::dotenv;
use macrosignals::config::Config;
use macrosignals::core::http::start_server;
use macrosignals::logging;
use std::env;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let env = macrosignals::config::get_environment();
    info!("Starting Macro Signals API Server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
