use std::sync::Arc;

use crate::ai::ContentService;
use crate::document::session::Session;
use crate::export::fonts::FontRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one editing session; memory-only.
    pub session: Arc<Session>,
    pub fonts: Arc<FontRegistry>,
    /// Pluggable content service. Production: `GeminiClient`.
    pub content: Arc<dyn ContentService>,
    /// Oversampling factor for PDF capture.
    pub raster_scale: f32,
}
