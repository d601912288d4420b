use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::EditorState;
use crate::errors::AppError;
use crate::models::analysis::{AtsCheck, JobAnalysis};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    pub work_index: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
    pub state: EditorState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionRequest {
    #[serde(default)]
    pub job_description: String,
}

impl JobDescriptionRequest {
    fn checked(&self) -> Result<&str, AppError> {
        let text = self.job_description.trim();
        if text.is_empty() {
            return Err(AppError::Validation(
                "jobDescription must not be empty".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

/// POST /api/v1/ai/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EditorState>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let next = state
            .session
            .import(state.content.as_ref(), bytes, &mime_type)
            .await?;
        return Ok(Json(next));
    }
    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// POST /api/v1/ai/suggestions
///
/// Replaces the job's bullets with the generated ones. The entry is tracked by id across the
/// service call, so edits made meanwhile never redirect the write to another job.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let document = state.session.document().await;
    let job = document
        .work_experience
        .get(req.work_index)
        .ok_or_else(|| AppError::NotFound(format!("Work entry {} not found", req.work_index)))?;
    if job.job_title.trim().is_empty() || job.company.trim().is_empty() {
        return Err(AppError::Validation(
            "Job title and company are required to generate suggestions".to_string(),
        ));
    }

    let suggestions = state
        .content
        .generate_suggestions(job.job_title.trim(), job.company.trim())
        .await?;
    info!(
        work_id = %job.id,
        count = suggestions.len(),
        "Suggestions generated"
    );

    let next = state
        .session
        .set_work_description(&job.id, suggestions.clone())
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Work entry {} was removed during generation", job.id))
        })?;

    Ok(Json(SuggestionsResponse {
        suggestions,
        state: next,
    }))
}

/// POST /api/v1/ai/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    let job_description = req.checked()?;
    let document = state.session.document().await;
    let analysis = state
        .content
        .analyze_job_match(&document, job_description)
        .await?;
    Ok(Json(analysis))
}

/// POST /api/v1/ai/ats-check
pub async fn handle_ats_check(State(state): State<AppState>) -> Result<Json<AtsCheck>, AppError> {
    let document = state.session.document().await;
    Ok(Json(state.content.check_ats(&document).await?))
}

/// POST /api/v1/ai/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let job_description = req.checked()?;
    let document = state.session.document().await;
    let cover_letter = state
        .content
        .generate_cover_letter(&document, job_description)
        .await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}
