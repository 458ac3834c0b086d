use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use voice_api::config::Config;
use voice_api::llm_client::images::{ImageClient, ImageModel, IMAGE_MODEL};
use voice_api::llm_client::{self, ChatModel, LlmClient};
use voice_api::routes::build_router;
use voice_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Voice Builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let chat_model: Arc<dyn ChatModel> = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize image client (optional)
    let image_model: Option<Arc<dyn ImageModel>> = match &config.openai_api_key {
        Some(key) => {
            info!("Image client initialized (model: {IMAGE_MODEL})");
            Some(Arc::new(ImageClient::new(key.clone())?))
        }
        None => {
            warn!("OPENAI_API_KEY not set; /api/generate-anime-image will fail");
            None
        }
    };

    // Build app state
    let state = AppState {
        chat_model,
        image_model,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the web client's origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
