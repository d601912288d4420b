//! Font faces for rasterization, loaded once per font choice from `FONT_DIR`.
//!
//! `ready` resolves when the faces a surface needs have finished loading, so a capture
//! never starts with half-loaded fonts. Concurrent callers for the same font share one load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ab_glyph::FontArc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::models::style::FontChoice;

/// Loaded faces for one font choice. A missing face renders as block glyphs.
#[derive(Clone, Default)]
pub struct FontFaces {
    pub regular: Option<FontArc>,
    pub bold: Option<FontArc>,
}

impl FontFaces {
    /// Bold face when requested and available, regular otherwise.
    pub fn face(&self, bold: bool) -> Option<&FontArc> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref()
        }
    }
}

pub struct FontRegistry {
    dir: PathBuf,
    cells: Mutex<HashMap<FontChoice, Arc<OnceCell<Arc<FontFaces>>>>>,
}

impl FontRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until the faces for `font` are loaded (or known to be missing).
    pub async fn ready(&self, font: FontChoice) -> Arc<FontFaces> {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(cells.entry(font).or_default())
        };
        cell.get_or_init(|| async {
            let regular = load_face(&self.dir.join(format!("{}.ttf", font.id()))).await;
            let bold = load_face(&self.dir.join(format!("{}-bold.ttf", font.id()))).await;
            if regular.is_none() {
                warn!(
                    font = font.id(),
                    dir = %self.dir.display(),
                    "Font file missing, text will render as placeholder blocks"
                );
            }
            Arc::new(FontFaces { regular, bold })
        })
        .await
        .clone()
    }
}

async fn load_face(path: &Path) -> Option<FontArc> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), "Font not loaded: {e}");
            return None;
        }
    };
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            debug!(path = %path.display(), "Loaded font face");
            Some(font)
        }
        Err(e) => {
            warn!(path = %path.display(), "Invalid font file: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_yields_empty_faces() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FontRegistry::new(dir.path().join("nope"));
        let faces = registry.ready(FontChoice::Inter).await;
        assert!(faces.regular.is_none());
        assert!(faces.face(true).is_none());
    }

    #[tokio::test]
    async fn test_corrupt_font_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("font-sans.ttf"), b"not a font").unwrap();
        let registry = FontRegistry::new(dir.path());
        let faces = registry.ready(FontChoice::Inter).await;
        assert!(faces.regular.is_none());
    }

    #[tokio::test]
    async fn test_ready_is_cached_per_font() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FontRegistry::new(dir.path());
        let a = registry.ready(FontChoice::Lora).await;
        let b = registry.ready(FontChoice::Lora).await;
        assert!(Arc::ptr_eq(&a, &b));
    }
}
