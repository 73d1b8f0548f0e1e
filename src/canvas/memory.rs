//! In-process drawing surface.
//!
//! Keeps drawables in z-order and tracks selection, preview, repaint
//! requests and disposal. The `user_*` methods play the part of the native
//! interaction layer: they honor the lock flags the engine sets and return
//! the events a real surface would emit.

use std::cell::Cell;
use std::rc::Rc;

use super::{Drawable, PreviewRect, Size, Surface, SurfaceEvent};
use crate::model::AnnotationId;

#[derive(Debug, Default)]
pub struct MemoryCanvas {
    size: Size,
    objects: Vec<Drawable>,
    active: Vec<AnnotationId>,
    preview: Option<PreviewRect>,
    selection_enabled: bool,
    render_requests: usize,
    added: usize,
    removed: usize,
    disposals: Rc<Cell<usize>>,
    disposed: bool,
}

impl MemoryCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Shared counter bumped on every [`Surface::dispose`]. Stays readable
    /// after the canvas itself has been dropped.
    pub fn disposal_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.disposals)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    pub fn render_requests(&self) -> usize {
        self.render_requests
    }

    /// Total drawables ever added.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Total drawables ever removed.
    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn is_pickable(&self, id: &str) -> bool {
        self.get(id)
            .is_some_and(|d| d.props.selectable && d.props.evented)
    }

    /// User picks objects (click or shift-click). Locked objects are skipped.
    pub fn user_select(&mut self, ids: &[&str]) -> Option<SurfaceEvent> {
        let picked: Vec<AnnotationId> = ids
            .iter()
            .filter(|id| self.is_pickable(id))
            .map(|id| id.to_string())
            .collect();
        if picked == self.active {
            return None;
        }
        self.active = picked;
        Some(SurfaceEvent::SelectionChanged)
    }

    /// User clicks empty space.
    pub fn user_clear_selection(&mut self) -> Option<SurfaceEvent> {
        if self.active.is_empty() {
            return None;
        }
        self.active.clear();
        Some(SurfaceEvent::SelectionChanged)
    }

    /// One step of a native drag. `None` when the object is locked.
    pub fn user_drag(&mut self, id: &str, dx: f64, dy: f64) -> Option<SurfaceEvent> {
        if !self.is_pickable(id) {
            return None;
        }
        let drawable = self.get_mut(id)?;
        drawable.left += dx;
        drawable.top += dy;
        Some(SurfaceEvent::ObjectMoving(id.to_string()))
    }

    /// One step of a native corner-resize, multiplying the object's scale.
    pub fn user_scale(&mut self, id: &str, fx: f64, fy: f64) -> Option<SurfaceEvent> {
        if !self.is_pickable(id) {
            return None;
        }
        let drawable = self.get_mut(id)?;
        drawable.scale_x *= fx;
        drawable.scale_y *= fy;
        Some(SurfaceEvent::ObjectScaling(id.to_string()))
    }

    /// Release after a drag or resize.
    pub fn user_release(&mut self, id: &str) -> Option<SurfaceEvent> {
        self.is_pickable(id)
            .then(|| SurfaceEvent::ObjectModified(id.to_string()))
    }
}

impl Surface for MemoryCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
    }

    fn ids(&self) -> Vec<AnnotationId> {
        self.objects.iter().map(|d| d.id.clone()).collect()
    }

    fn get(&self, id: &str) -> Option<&Drawable> {
        self.objects.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Drawable> {
        self.objects.iter_mut().find(|d| d.id == id)
    }

    fn add(&mut self, drawable: Drawable) {
        self.objects.retain(|d| d.id != drawable.id);
        self.objects.push(drawable);
        self.added += 1;
    }

    fn remove(&mut self, id: &str) -> Option<Drawable> {
        let index = self.objects.iter().position(|d| d.id == id)?;
        self.active.retain(|a| a != id);
        self.removed += 1;
        Some(self.objects.remove(index))
    }

    fn active_ids(&self) -> Vec<AnnotationId> {
        self.active.clone()
    }

    fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = vec![id.to_string()];
        true
    }

    fn discard_active(&mut self) {
        self.active.clear();
    }

    fn preview(&self) -> Option<&PreviewRect> {
        self.preview.as_ref()
    }

    fn set_preview(&mut self, preview: Option<PreviewRect>) {
        self.preview = preview;
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.objects.clear();
        self.active.clear();
        self.preview = None;
        self.disposed = true;
        self.disposals.set(self.disposals.get() + 1);
        log::debug!("Canvas disposed");
    }
}
