//! The single in-memory editing session.
//!
//! Holds the current snapshot with its style, template and zoom, keeps the preview surface
//! mounted in step with it, and owns the per-kind export busy flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ai::{ContentService, ParseError};
use crate::document::actions::{
    apply, try_apply, Action, FieldUpdate, FieldValue, ItemField, Section, ValidationError,
};
use crate::layout::surface::MountedSurface;
use crate::layout::{layout, SurfaceRegistry, PREVIEW_SURFACE_ID};
use crate::models::resume::ResumeData;
use crate::models::style::{StyleConfig, TemplateId};
use crate::templates::{self, LayoutTree};

pub const DEFAULT_ZOOM: f32 = 0.8;
pub const MAX_ZOOM: f32 = 4.0;

pub fn valid_zoom(zoom: f32) -> bool {
    zoom.is_finite() && zoom > 0.0 && zoom <= MAX_ZOOM
}

/// Everything the host UI needs to redraw the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub document: ResumeData,
    pub style: StyleConfig,
    pub template: TemplateId,
    pub zoom: f32,
}

/// The rendered preview: presentation tree plus the laid-out page size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub tree: LayoutTree,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub displayed_width: f32,
    pub displayed_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Docx,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Docx => "docx",
        }
    }
}

/// Held for the duration of one export. Dropping it clears the busy flag.
pub struct ExportPermit<'a> {
    flag: &'a AtomicBool,
    kind: ExportKind,
}

impl Drop for ExportPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!(kind = self.kind.label(), "Export slot released");
    }
}

pub struct Session {
    state: RwLock<EditorState>,
    surfaces: SurfaceRegistry,
    pdf_busy: AtomicBool,
    docx_busy: AtomicBool,
}

impl Session {
    /// Starts from the sample résumé and mounts its preview.
    pub fn new(surfaces: SurfaceRegistry, zoom: f32) -> Self {
        let zoom = if valid_zoom(zoom) { zoom } else { DEFAULT_ZOOM };
        let state = EditorState {
            document: ResumeData::sample(),
            style: StyleConfig::default(),
            template: TemplateId::default(),
            zoom,
        };
        mount_preview(&surfaces, &state);
        Self {
            state: RwLock::new(state),
            surfaces,
            pdf_busy: AtomicBool::new(false),
            docx_busy: AtomicBool::new(false),
        }
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub async fn snapshot(&self) -> EditorState {
        self.state.read().await.clone()
    }

    pub async fn document(&self) -> ResumeData {
        self.state.read().await.document.clone()
    }

    /// Applies an action, absorbing invalid ones. The preview is remounted only when the
    /// document actually changed.
    pub async fn dispatch(&self, action: &Action) -> EditorState {
        let mut state = self.state.write().await;
        let next = apply(&state.document, action);
        if next != state.document {
            state.document = next;
            mount_preview(&self.surfaces, &state);
        }
        debug!(action = action.name(), "Action dispatched");
        state.clone()
    }

    /// Like [`Session::dispatch`], but reports why an invalid action was rejected.
    pub async fn try_dispatch(&self, action: &Action) -> Result<EditorState, ValidationError> {
        let mut state = self.state.write().await;
        state.document = try_apply(&state.document, action)?;
        mount_preview(&self.surfaces, &state);
        Ok(state.clone())
    }

    /// Replaces the description lines of the work entry with `id`, resolving its index under
    /// the write lock. `Ok(None)` when the entry no longer exists.
    pub async fn set_work_description(
        &self,
        id: &str,
        lines: Vec<String>,
    ) -> Result<Option<EditorState>, ValidationError> {
        let mut state = self.state.write().await;
        let Some(index) = state.document.work_experience.iter().position(|w| w.id == id) else {
            return Ok(None);
        };
        let action = Action::UpdateField {
            target: FieldUpdate::Item {
                section: Section::WorkExperience,
                index,
                field: ItemField::Description,
                value: FieldValue::Lines(lines),
            },
        };
        state.document = try_apply(&state.document, &action)?;
        mount_preview(&self.surfaces, &state);
        Ok(Some(state.clone()))
    }

    pub async fn set_style(&self, style: StyleConfig) -> EditorState {
        let mut state = self.state.write().await;
        state.style = style;
        mount_preview(&self.surfaces, &state);
        state.clone()
    }

    pub async fn set_template(&self, template: TemplateId) -> EditorState {
        let mut state = self.state.write().await;
        state.template = template;
        mount_preview(&self.surfaces, &state);
        info!(template = template.id(), "Template selected");
        state.clone()
    }

    /// Changes the live-display zoom only; captures are always unscaled.
    pub async fn set_zoom(&self, zoom: f32) -> Result<EditorState, ValidationError> {
        if !valid_zoom(zoom) {
            return Err(ValidationError::OutOfBounds {
                field: "zoom",
                reason: "must be greater than 0 and at most 4",
            });
        }
        let mut state = self.state.write().await;
        state.zoom = zoom;
        if !self.surfaces.set_zoom(PREVIEW_SURFACE_ID, zoom) {
            mount_preview(&self.surfaces, &state);
        }
        Ok(state.clone())
    }

    pub async fn preview(&self) -> Preview {
        let state = self.state.read().await;
        let tree = templates::render(state.template, &state.document, &state.style);
        let mounted = match self.surfaces.get(PREVIEW_SURFACE_ID) {
            Some(mounted) => mounted,
            None => MountedSurface {
                surface: Arc::new(layout(&tree)),
                zoom: state.zoom,
            },
        };
        let (displayed_width, displayed_height) = mounted.displayed_size();
        Preview {
            tree,
            width: mounted.surface.width,
            height: mounted.surface.height,
            zoom: mounted.zoom,
            displayed_width,
            displayed_height,
        }
    }

    /// Claims the export slot for `kind`, or `None` while one is already in flight.
    pub fn try_begin_export(&self, kind: ExportKind) -> Option<ExportPermit<'_>> {
        let flag = match kind {
            ExportKind::Pdf => &self.pdf_busy,
            ExportKind::Docx => &self.docx_busy,
        };
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportPermit { flag, kind })
    }

    /// Parses an upload and replaces the document with the result.
    /// On any failure the current document is left as it was.
    pub async fn import(
        &self,
        service: &dyn ContentService,
        file: Bytes,
        mime_type: &str,
    ) -> Result<EditorState, ParseError> {
        let parsed = match service.parse_resume(file, mime_type).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(mime_type, "Résumé import failed: {e}");
                return Err(e);
            }
        };
        let state = self
            .dispatch(&Action::ReplaceDocument { document: parsed })
            .await;
        info!(
            jobs = state.document.work_experience.len(),
            skills = state.document.skills.len(),
            "Résumé imported"
        );
        Ok(state)
    }
}

fn mount_preview(surfaces: &SurfaceRegistry, state: &EditorState) {
    let tree = templates::render(state.template, &state.document, &state.style);
    surfaces.mount(PREVIEW_SURFACE_ID, layout(&tree), state.zoom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::actions::PersonalField;

    fn session() -> Session {
        Session::new(SurfaceRegistry::new(), DEFAULT_ZOOM)
    }

    #[tokio::test]
    async fn test_new_session_mounts_sample_preview() {
        let s = session();
        let state = s.snapshot().await;
        assert_eq!(state.document.personal_info.name, "Jane Doe");
        let mounted = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        assert_eq!(mounted.zoom, DEFAULT_ZOOM);
        assert_eq!(mounted.surface.width, templates::node::PAGE_WIDTH_PX);
    }

    #[tokio::test]
    async fn test_dispatch_updates_document_and_preview() {
        let s = session();
        let before = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        let state = s
            .dispatch(&Action::UpdateField {
                target: FieldUpdate::Personal {
                    field: PersonalField::Name,
                    value: "Sam Roe".to_string(),
                },
            })
            .await;
        assert_eq!(state.document.personal_info.name, "Sam Roe");

        let after = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        assert!(!Arc::ptr_eq(&before.surface, &after.surface));
        assert!(after.surface.text_runs().any(|r| r.text.contains("Sam Roe")));
    }

    #[tokio::test]
    async fn test_invalid_dispatch_is_a_noop() {
        let s = session();
        let before = s.snapshot().await;
        let mounted = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        let after = s
            .dispatch(&Action::UpdateBullet {
                work_index: 9,
                bullet_index: 0,
                value: "x".to_string(),
            })
            .await;
        assert_eq!(before, after);
        let still = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        assert!(Arc::ptr_eq(&mounted.surface, &still.surface));
    }

    #[tokio::test]
    async fn test_try_dispatch_reports_validation_error() {
        let s = session();
        let err = s
            .try_dispatch(&Action::UpdateBullet {
                work_index: 9,
                bullet_index: 0,
                value: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::IndexOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_zoom_changes_display_only() {
        let s = session();
        let before = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        s.set_zoom(1.5).await.unwrap();
        let after = s.surfaces().get(PREVIEW_SURFACE_ID).unwrap();
        assert_eq!(after.zoom, 1.5);
        assert_eq!(before.surface.height, after.surface.height);

        assert!(s.set_zoom(0.0).await.is_err());
        assert!(s.set_zoom(f32::NAN).await.is_err());
        assert_eq!(s.snapshot().await.zoom, 1.5);
    }

    #[tokio::test]
    async fn test_template_switch_remounts_preview() {
        let s = session();
        s.set_template(TemplateId::Professional).await;
        let preview = s.preview().await;
        assert_eq!(preview.tree.template, TemplateId::Professional);
        assert!(preview.height >= templates::node::PAGE_MIN_HEIGHT_PX);
        assert_eq!(preview.displayed_width, preview.width * DEFAULT_ZOOM);
    }

    #[test]
    fn test_export_permit_is_exclusive_per_kind() {
        let s = session();
        let pdf = s.try_begin_export(ExportKind::Pdf).unwrap();
        assert!(s.try_begin_export(ExportKind::Pdf).is_none());
        // Other kind is independent.
        let docx = s.try_begin_export(ExportKind::Docx);
        assert!(docx.is_some());
        drop(pdf);
        assert!(s.try_begin_export(ExportKind::Pdf).is_some());
    }

    #[tokio::test]
    async fn test_work_description_follows_the_entry_id() {
        let s = session();
        s.dispatch(&Action::RemoveItem {
            section: Section::WorkExperience,
            id: "work1".to_string(),
        })
        .await;

        let state = s
            .set_work_description("work2", vec!["Led X".to_string()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.document.work_experience[0].id, "work2");
        assert_eq!(state.document.work_experience[0].description, vec!["Led X"]);

        let gone = s
            .set_work_description("work1", vec!["Stale".to_string()])
            .await
            .unwrap();
        assert!(gone.is_none());
        assert_eq!(s.document().await.work_experience[0].description, vec!["Led X"]);
    }

    #[tokio::test]
    async fn test_add_item_via_session_gets_unique_id() {
        let s = session();
        let a = s.dispatch(&Action::AddItem { section: Section::Skills }).await;
        let b = s.dispatch(&Action::AddItem { section: Section::Skills }).await;
        assert_eq!(b.document.skills.len(), a.document.skills.len() + 1);
        let ids: Vec<_> = b.document.skills.iter().map(|s| s.id.as_str()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }
}
