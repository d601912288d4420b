use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::document::session::{valid_zoom, DEFAULT_ZOOM};
use crate::export::raster::MIN_RASTER_SCALE;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value is out of range.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub font_dir: PathBuf,
    pub raster_scale: f32,
    pub preview_zoom: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let raster_scale: f32 = optional_env("RASTER_SCALE", "2.0")
            .parse()
            .context("RASTER_SCALE must be a number")?;
        ensure!(
            raster_scale.is_finite() && raster_scale >= MIN_RASTER_SCALE,
            "RASTER_SCALE must be at least {MIN_RASTER_SCALE}"
        );

        let preview_zoom: f32 = optional_env("PREVIEW_ZOOM", &DEFAULT_ZOOM.to_string())
            .parse()
            .context("PREVIEW_ZOOM must be a number")?;
        ensure!(
            valid_zoom(preview_zoom),
            "PREVIEW_ZOOM must be greater than 0 and at most 4"
        );

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            font_dir: PathBuf::from(optional_env("FONT_DIR", "assets/fonts")),
            raster_scale,
            preview_zoom,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
