use axum::extract::{Query, State};
use serde::Deserialize;

use crate::document::ExportKind;
use crate::errors::AppError;
use crate::export::docx::export_docx;
use crate::export::pdf::export_pdf;
use crate::export::{Artifact, DEFAULT_BASE_NAME};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExportQuery {
    pub name: Option<String>,
}

impl ExportQuery {
    fn base_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_BASE_NAME)
    }
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Artifact, AppError> {
    let _permit = state
        .session
        .try_begin_export(ExportKind::Pdf)
        .ok_or(AppError::Busy(ExportKind::Pdf.label()))?;

    let artifact = export_pdf(
        state.session.surfaces(),
        &state.fonts,
        state.raster_scale,
        query.base_name(),
    )
    .await?;
    Ok(artifact)
}

/// POST /api/v1/export/docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Artifact, AppError> {
    let _permit = state
        .session
        .try_begin_export(ExportKind::Docx)
        .ok_or(AppError::Busy(ExportKind::Docx.label()))?;

    let document = state.session.document().await;
    Ok(export_docx(document, query.base_name()).await?)
}
