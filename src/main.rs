mod config;
mod handlers;
mod ollama;
mod render;
mod routes;
mod session;
mod state;
mod transcript;
mod websocket;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("llama_chat=debug,tower_http=debug")),
        )
        .init();

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.yml".to_string()),
        Some("conf.json".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (config, loaded_path) = Config::load_first(&config_paths)?;
    match loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No config file found (tried {:?}), using defaults", config_paths),
    }

    let app_state = AppState::new(config.clone())?;
    info!(
        "Chatting with model {} at {}",
        config.ollama_config.model, config.ollama_config.endpoint
    );

    let app = Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    let system_config = &config.system_config;
    let listener =
        tokio::net::TcpListener::bind((system_config.host.as_str(), system_config.port)).await?;
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
