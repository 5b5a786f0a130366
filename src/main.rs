mod chat;
mod config;
mod conversations;
mod error;
mod handlers;
mod inference_service;
mod render;
mod routes;
mod state;
mod translate;
mod tts;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tiktranslate=debug,tower_http=debug")),
        )
        .init();

    let config_paths = Config::candidate_paths();
    let mut loaded = None;
    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                loaded = Some((cfg, path.clone()));
                break;
            }
            Err(e) => {
                debug!("Failed to load config from {}: {:#}", path.display(), e);
                continue;
            }
        }
    }

    let (config, loaded_path) = loaded.ok_or_else(|| {
        anyhow::anyhow!("Could not find config file. Tried: {:?}", config_paths)
    })?;
    info!("Loaded configuration from: {}", loaded_path.display());

    std::fs::create_dir_all(&config.system_config.static_dir)?;

    let app_state = AppState::new(config.clone()).await?;
    info!(
        "Translation model: {}, chat model: {}, speech: {}",
        app_state.translator.model_name(),
        app_state.chat_model.model_name(),
        if app_state.tts.is_some() { "on" } else { "off" }
    );
    app_state.spawn_housekeeping();

    let app = routes::build_app(app_state);

    let host: std::net::IpAddr = config.system_config.host.parse()?;
    let addr = SocketAddr::from((host, config.system_config.port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
