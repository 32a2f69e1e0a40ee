use anyhow::Context;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slotboard::config::AppConfig;
use slotboard::database;
use slotboard::services::session_service;
use slotboard::web::{build_router, AppState, BUILD_ID};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Config and database
    let config = AppConfig::from_env();
    info!("Connecting to database: {}", config.database_url);
    let pool = database::connect(&config.database_url)
        .await
        .context("could not open the database")?;

    session_service::prune_expired_sessions(&pool)
        .await
        .context("could not prune expired sessions")?;

    if config.admin_setup_token.is_none() {
        warn!("ADMIN_SETUP_TOKEN is not set; first admin setup is disabled");
    }

    let host = config.host.clone();
    let port = config.port;
    let app = build_router(AppState::new(pool, config));

    // 3. Start the server, one port up if the configured one is taken
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", host, port))?;

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = port.checked_add(1).context("no fallback port available")?;
            warn!(
                "Could not bind {}: {}. Trying fallback {}:{}",
                addr, e, host, fallback_port
            );
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port)
                .parse()
                .context("invalid fallback address")?;
            TcpListener::bind(fallback)
                .await
                .context("could not bind the fallback port")?
        }
    };

    let bound_addr = listener.local_addr()?;
    info!("Build {}", BUILD_ID);
    println!("🚀 Server running on http://{}", bound_addr);
    println!("📍 Players start at http://{}/", bound_addr);
    println!("📍 Admins log in at http://{}/admin", bound_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
