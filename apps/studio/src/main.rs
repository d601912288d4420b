mod ai;
mod config;
mod document;
mod errors;
mod export;
mod layout;
mod models;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::gemini::{self, GeminiClient};
use crate::config::Config;
use crate::document::Session;
use crate::export::fonts::FontRegistry;
use crate::layout::SurfaceRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume studio v{}", env!("CARGO_PKG_VERSION"));

    let content = GeminiClient::new(config.gemini_api_key.clone())?;
    info!("Content service client initialized (model: {})", gemini::MODEL);

    let fonts = FontRegistry::new(config.font_dir.clone());
    info!(font_dir = %config.font_dir.display(), "Font registry initialized");

    let session = Session::new(SurfaceRegistry::new(), config.preview_zoom);
    info!(
        zoom = config.preview_zoom,
        raster_scale = config.raster_scale,
        "Editing session ready"
    );

    let state = AppState {
        session: Arc::new(session),
        fonts: Arc::new(fonts),
        content: Arc::new(content),
        raster_scale: config.raster_scale,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
