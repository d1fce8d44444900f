mod models;
mod routes;
mod upload;
mod veo;

use axum::extract::DefaultBodyLimit;
use axum::{routing::{get, post}, Router};
use routes::{generate_video, get_media, revoke_media, upload_image, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use crate::veo::VeoClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY must be set"))?;
    tracing::info!("Using API key: {}...", &api_key[..std::cmp::min(10, api_key.len())]);

    let mut veo = VeoClient::new(api_key);
    if let Ok(base) = std::env::var("GEMINI_API_BASE") {
        veo = veo.with_base_url(base);
    }
    if let Some(secs) = std::env::var("VEO_POLL_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        // 0 disables the bound and polls until the service answers.
        veo = veo.with_poll_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }

    let state = AppState {
        store: Arc::default(),
        veo: Arc::new(veo),
    };

    let app = Router::new()
        .route("/api/upload", post(upload_image))
        .route("/api/generate", post(generate_video))
        .route("/api/media/:id", get(get_media).delete(revoke_media))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0,0,0,0], port));
    tracing::info!(%addr, "Starting server");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
