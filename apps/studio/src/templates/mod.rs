//! Template set: pure `(ResumeData, StyleConfig) -> LayoutTree` renderers.

pub mod creative;
pub mod modern;
pub mod node;
pub mod professional;

pub use node::{LayoutTree, SectionKind};

use crate::models::resume::ResumeData;
use crate::models::style::{StyleConfig, TemplateId};

pub type RenderFn = fn(&ResumeData, &StyleConfig) -> LayoutTree;

/// Maps a template id to its renderer. Total over `TemplateId`; unknown strings already
/// resolved to the first variant when the id was parsed.
pub fn select(template: TemplateId) -> RenderFn {
    match template {
        TemplateId::Modern => modern::render,
        TemplateId::Professional => professional::render,
        TemplateId::Creative => creative::render,
    }
}

pub fn render(template: TemplateId, doc: &ResumeData, style: &StyleConfig) -> LayoutTree {
    select(template)(doc, style)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
