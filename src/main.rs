use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod server;
mod services;
mod utils;

use config::AppConfig;
use server::AppState;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("energy_price_notifier=info,tower_http=info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("⚡ Starting energy price notifier v{}", env!("CARGO_PKG_VERSION"));

    let addr = match AppConfig::bind_addr_from_env() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // The trigger stays reachable with a broken config and reports it per request
    let config = AppConfig::from_env();
    match &config {
        Ok(config) => info!(
            "Configuration loaded (login: {}, webdriver: {})",
            config.login_url, config.webdriver_url
        ),
        Err(e) => error!("{}; every trigger will fail until this is fixed", e),
    }

    if let Err(e) = server::serve(AppState::new(config), addr).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
