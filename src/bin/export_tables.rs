use dotenvy::dotenv;
use std::path::PathBuf;

use slotboard::config::AppConfig;
use slotboard::database;
use slotboard::services::export_service;

/// Writes one CSV per table into EXPORT_DIR (or the directory given as the first argument).
#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.export_dir.clone());

    let pool = match database::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("could not open {}: {}", config.database_url, e);
            std::process::exit(1);
        }
    };

    match export_service::export_all_to_dir(&pool, &out_dir).await {
        Ok(paths) => {
            for path in &paths {
                println!("wrote {}", path.display());
            }
            println!("export: tables={}, dir={}", paths.len(), out_dir.display());
        }
        Err(e) => {
            eprintln!("export failed: {}", e);
            std::process::exit(1);
        }
    }
}
