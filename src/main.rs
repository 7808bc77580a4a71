use axum::http::{header, HeaderValue, Method};
use bpm_playlist_generator::{
    build_router,
    config::Config,
    services::{ClaudeClient, PromptInterpreter, SpotifyAuth, SpotifyClient},
    AppState,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bpm_playlist_generator=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize services
    let catalog = Arc::new(SpotifyClient::new(config.spotify_api_url.clone()));
    let auth = Arc::new(SpotifyAuth::new(&config));

    let interpreter = match &config.anthropic_api_key {
        Some(key) => {
            tracing::info!("Free-text prompts enabled with {}", config.anthropic_model);
            let model = Arc::new(ClaudeClient::new(
                key.clone(),
                config.anthropic_api_url.clone(),
                config.anthropic_model.clone(),
            ));
            Some(Arc::new(PromptInterpreter::new(model)))
        }
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set, free-text prompts disabled");
            None
        }
    };

    let app_state = Arc::new(AppState::new(catalog, interpreter, auth));

    let app = build_router(app_state)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config));

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
