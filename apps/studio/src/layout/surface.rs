//! Registry of mounted render surfaces, the server-side stand-in for the display tree.
//!
//! The live preview is mounted under [`PREVIEW_SURFACE_ID`] together with its display zoom.
//! Capture never reads the mounted entry directly: it detaches an unscaled copy whose guard
//! removes the copy again when dropped, whatever path the export takes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::layout::flow::Surface;

pub const PREVIEW_SURFACE_ID: &str = "resume-preview-content";

#[derive(Debug, Clone)]
pub struct MountedSurface {
    pub surface: Arc<Surface>,
    /// Live-display scale. Never applied to captures.
    pub zoom: f32,
}

impl MountedSurface {
    /// On-screen size after zoom.
    pub fn displayed_size(&self) -> (f32, f32) {
        (self.surface.width * self.zoom, self.surface.height * self.zoom)
    }
}

#[derive(Default)]
struct Inner {
    mounted: Mutex<HashMap<String, MountedSurface>>,
    detached: Mutex<HashMap<u64, String>>,
    next_key: AtomicU64,
}

/// Shared handle; clones see the same registry.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    inner: Arc<Inner>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, id: &str, surface: Surface, zoom: f32) {
        let entry = MountedSurface {
            surface: Arc::new(surface),
            zoom,
        };
        lock(&self.inner.mounted).insert(id.to_string(), entry);
    }

    pub fn set_zoom(&self, id: &str, zoom: f32) -> bool {
        match lock(&self.inner.mounted).get_mut(id) {
            Some(entry) => {
                entry.zoom = zoom;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<MountedSurface> {
        lock(&self.inner.mounted).get(id).cloned()
    }

    /// Takes an unscaled copy of the surface mounted under `id`.
    ///
    /// Returns `None` when nothing is mounted there. The copy is tracked until its guard drops.
    pub fn detach(&self, id: &str) -> Option<DetachedSurface> {
        let mounted = self.get(id)?;
        let key = self.inner.next_key.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.detached).insert(key, id.to_string());
        debug!(id, key, "Detached surface for capture");
        Some(DetachedSurface {
            inner: Arc::clone(&self.inner),
            key,
            surface: mounted.surface,
        })
    }

    /// Number of detached copies still alive.
    #[cfg(test)]
    pub fn live_detached_count(&self) -> usize {
        lock(&self.inner.detached).len()
    }
}

/// Exclusive handle on a detached capture copy. Dropping it releases the copy.
pub struct DetachedSurface {
    inner: Arc<Inner>,
    key: u64,
    surface: Arc<Surface>,
}

impl DetachedSurface {
    /// The copy at true print size; the preview zoom is not part of it.
    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }
}

impl Drop for DetachedSurface {
    fn drop(&mut self) {
        lock(&self.inner.detached).remove(&self.key);
        debug!(key = self.key, "Released detached surface");
    }
}

/// A panic while holding the lock cannot leave the maps half-written, so poison is ignored.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
