use axum::{extract::State, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::session::Preview;
use crate::document::{Action, EditorState};
use crate::errors::AppError;
use crate::models::style::{ColorPreset, FontChoice, StyleConfig, TemplateId, COLOR_PRESETS};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub template: TemplateId,
}

#[derive(Deserialize)]
pub struct ZoomRequest {
    pub zoom: f32,
}

#[derive(Serialize)]
pub struct OptionEntry {
    pub id: &'static str,
    pub name: &'static str,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<EditorState> {
    Json(state.session.snapshot().await)
}

/// POST /api/v1/resume/actions
///
/// Takes the raw body so that a malformed action, whatever its content type, is absorbed
/// like any other invalid one.
pub async fn handle_dispatch(State(state): State<AppState>, body: Bytes) -> Json<EditorState> {
    match serde_json::from_slice::<Action>(&body) {
        Ok(action) => Json(state.session.dispatch(&action).await),
        Err(e) => {
            warn!("Ignoring malformed action: {e}");
            Json(state.session.snapshot().await)
        }
    }
}

/// PUT /api/v1/resume/style
pub async fn handle_set_style(
    State(state): State<AppState>,
    Json(style): Json<StyleConfig>,
) -> Json<EditorState> {
    Json(state.session.set_style(style).await)
}

/// PUT /api/v1/resume/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Json(req): Json<TemplateRequest>,
) -> Json<EditorState> {
    Json(state.session.set_template(req.template).await)
}

/// PUT /api/v1/preview/zoom
pub async fn handle_set_zoom(
    State(state): State<AppState>,
    Json(req): Json<ZoomRequest>,
) -> Result<Json<EditorState>, AppError> {
    Ok(Json(state.session.set_zoom(req.zoom).await?))
}

/// GET /api/v1/preview
pub async fn handle_get_preview(State(state): State<AppState>) -> Json<Preview> {
    Json(state.session.preview().await)
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<OptionEntry>> {
    Json(
        TemplateId::ALL
            .iter()
            .map(|t| OptionEntry {
                id: t.id(),
                name: t.display_name(),
            })
            .collect(),
    )
}

/// GET /api/v1/fonts
pub async fn handle_list_fonts() -> Json<Vec<OptionEntry>> {
    Json(
        FontChoice::ALL
            .iter()
            .map(|f| OptionEntry {
                id: f.id(),
                name: f.display_name(),
            })
            .collect(),
    )
}

/// GET /api/v1/colors
pub async fn handle_list_colors() -> Json<Vec<ColorPreset>> {
    Json(COLOR_PRESETS.to_vec())
}
