use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use echo_tales::api::routes::{create_router, AppState};
use echo_tales::config::Config;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.listen_addr().expect("Invalid address");

    tracing::info!("Echo Tales v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Static directory: {}", config.static_dir);
    tracing::info!("Audio directory: {}", config.audio_dir);

    if config.openai_key().is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; story generation will fail");
    }
    if config.eleven_labs_key().is_none() {
        tracing::warn!("ELEVEN_LABS_API_KEY is not set; narration and voices will fail");
    }

    let state = Arc::new(AppState::from_config(&config).expect("Failed to build providers"));
    match config.audio_retention() {
        Some(retention) => {
            tracing::info!("Story audio retained for {}s", retention.as_secs());
            state.audio.clone().spawn_sweeper(retention);
        }
        None => tracing::warn!("AUDIO_RETENTION_SECS is 0; story audio is never deleted"),
    }
    let app = create_router(state, &config.static_dir());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
