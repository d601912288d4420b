// Export pipelines.
// PDF: detached preview surface -> bitmap -> sliced across letter pages (raster + pdf).
// DOCX: canonical document -> block tree -> OOXML package (docx). Independent of any surface.
// Rasterizing and packing are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod docx;
pub mod fonts;
pub mod handlers;
pub mod pdf;
pub mod raster;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DEFAULT_BASE_NAME: &str = "resume";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("render surface '{0}' is not mounted")]
    SurfaceMissing(String),

    #[error("surface of {width}x{height}px exceeds the raster limit")]
    TooLarge { width: u32, height: u32 },

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image encoding failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("rasterization task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("packaging task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A finished, downloadable export.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl Artifact {
    pub fn pdf(base_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.pdf", sanitize_base_name(base_name)),
            content_type: PDF_CONTENT_TYPE,
            bytes: Bytes::from(bytes),
        }
    }

    pub fn docx(base_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.docx", sanitize_base_name(base_name)),
            content_type: DOCX_CONTENT_TYPE,
            bytes: Bytes::from(bytes),
        }
    }
}

impl IntoResponse for Artifact {
    fn into_response(self) -> Response {
        let headers = [
            (header::CONTENT_TYPE, self.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", self.file_name),
            ),
        ];
        (headers, self.bytes).into_response()
    }
}

/// Strips path separators, quotes and control characters. Blank input becomes `resume`.
pub fn sanitize_base_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | '\'') && !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').trim();
    if cleaned.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
