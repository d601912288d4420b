//! AI content service: the external collaborator that parses uploads and writes content.
//!
//! Everything behind [`ContentService`] is a black box. This module only fixes the contract,
//! guards inputs before they leave the process and normalises what comes back.

pub mod gemini;
pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::document::actions::{ensure_unique_ids, Section};
use crate::document::ids::new_item_id;
use crate::models::analysis::{AtsCheck, JobAnalysis};
use crate::models::resume::ResumeData;

/// Upload types the parser accepts.
pub const ACCEPTED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "image/png",
    "image/jpeg",
    "image/webp",
];

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("service returned empty content")]
    EmptyContent,

    #[error("unexpected response: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error("résumé could not be parsed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Extracts a complete document from an uploaded file. Every list item gets a fresh id.
    async fn parse_resume(&self, file: Bytes, mime_type: &str) -> Result<ResumeData, ParseError>;

    /// Three to five bullet points for the given role.
    async fn generate_suggestions(
        &self,
        job_title: &str,
        company: &str,
    ) -> Result<Vec<String>, ServiceError>;

    async fn analyze_job_match(
        &self,
        doc: &ResumeData,
        job_description: &str,
    ) -> Result<JobAnalysis, ServiceError>;

    async fn check_ats(&self, doc: &ResumeData) -> Result<AtsCheck, ServiceError>;

    async fn generate_cover_letter(
        &self,
        doc: &ResumeData,
        job_description: &str,
    ) -> Result<String, ServiceError>;
}

/// Rejects uploads that cannot be parsed before any network call is made.
pub fn check_upload(file: &[u8], mime_type: &str) -> Result<(), ParseError> {
    if file.is_empty() {
        return Err(ParseError::EmptyFile);
    }
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ACCEPTED_MIME_TYPES.contains(&essence.as_str()) {
        return Err(ParseError::UnsupportedType(mime_type.to_string()));
    }
    Ok(())
}

pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        0
    } else {
        raw.round().clamp(0.0, 100.0) as u8
    }
}

/// Trims, drops blanks and keeps at most [`MAX_SUGGESTIONS`]. An empty result is an error.
pub fn normalize_suggestions(raw: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let suggestions: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect();
    if suggestions.is_empty() {
        return Err(ServiceError::Invalid("no suggestions returned".to_string()));
    }
    Ok(suggestions)
}

/// Replaces whatever ids the service produced with fresh process-unique ones.
pub fn assign_fresh_ids(doc: &mut ResumeData) {
    for job in Arc::make_mut(&mut doc.work_experience) {
        job.id = new_item_id(Section::WorkExperience);
    }
    for edu in Arc::make_mut(&mut doc.education) {
        edu.id = new_item_id(Section::Education);
    }
    for skill in Arc::make_mut(&mut doc.skills) {
        skill.id = new_item_id(Section::Skills);
    }
    for project in Arc::make_mut(&mut doc.projects) {
        project.id = new_item_id(Section::Projects);
    }
    ensure_unique_ids(doc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_upload_rejects_empty_and_unknown_types() {
        assert!(matches!(
            check_upload(b"", "application/pdf"),
            Err(ParseError::EmptyFile)
        ));
        assert!(matches!(
            check_upload(b"zip", "application/zip"),
            Err(ParseError::UnsupportedType(_))
        ));
        assert!(check_upload(b"%PDF", "application/pdf").is_ok());
        assert!(check_upload(b"hello", "text/plain; charset=utf-8").is_ok());
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(73.4), 73);
        assert_eq!(clamp_score(180.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_normalize_suggestions() {
        let raw: Vec<String> = (1..=7).map(|i| format!(" Bullet {i} ")).collect();
        let out = normalize_suggestions(raw).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], "Bullet 1");

        assert!(normalize_suggestions(vec!["  ".to_string()]).is_err());
    }

    #[test]
    fn test_assign_fresh_ids_replaces_service_ids() {
        let mut doc = ResumeData::sample();
        assign_fresh_ids(&mut doc);
        assert!(doc.work_experience.iter().all(|w| w.id.starts_with("workExperience-")));
        assert!(doc.skills.iter().all(|s| s.id.starts_with("skills-")));
        assert_ne!(doc.skills[0].id, doc.skills[1].id);
    }
}
