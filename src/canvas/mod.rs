//! Interactive drawing surface abstraction.
//!
//! The surface is the live, natively interactive layer laid over a rendered
//! PDF page. It owns [`Drawable`] objects, the active selection and the
//! draw preview, and reports user gestures as [`SurfaceEvent`]s. The sync
//! engine is the only code that mutates a mounted surface.
//!
//! [`MemoryCanvas`] is a complete in-process implementation used by the
//! headless viewer and by tests.

mod memory;
mod object;
mod text;

pub use memory::MemoryCanvas;
pub use object::{
    Caption, CornerStyle, Cursor, Drawable, DrawableKind, ObjectProps, PreviewRect, RectShape,
};
pub use text::TextMetrics;

use crate::model::{AnnotationId, Point};

/// Surface size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn scaled(&self, scale: f64) -> Self {
        Self::new(self.width * scale, self.height * scale)
    }
}

/// Gesture and selection notifications emitted by a surface.
///
/// Pointer positions are scene points in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// A native drag of the object is in progress
    ObjectMoving(AnnotationId),
    /// A native corner-resize of the object is in progress
    ObjectScaling(AnnotationId),
    /// A move or resize finished; the object holds its final geometry
    ObjectModified(AnnotationId),
    /// The active selection was created, replaced or cleared by the user
    SelectionChanged,
}

/// Operations the sync engine needs from a drawing surface.
pub trait Surface {
    fn size(&self) -> Size;

    fn set_size(&mut self, size: Size);

    /// Enable or disable rubber-band/group selection on the surface itself.
    fn set_selection_enabled(&mut self, enabled: bool);

    /// Ids of all tagged drawables, in z-order.
    fn ids(&self) -> Vec<AnnotationId>;

    fn get(&self, id: &str) -> Option<&Drawable>;

    fn get_mut(&mut self, id: &str) -> Option<&mut Drawable>;

    /// Add a drawable on top. Replaces any drawable with the same id.
    fn add(&mut self, drawable: Drawable);

    /// Remove a drawable; it is also dropped from the active selection.
    fn remove(&mut self, id: &str) -> Option<Drawable>;

    /// Ids of the currently active (selected) objects.
    fn active_ids(&self) -> Vec<AnnotationId>;

    /// Programmatically make one object the active selection. Does not emit
    /// a [`SurfaceEvent::SelectionChanged`]. Returns false if `id` is unknown.
    fn set_active(&mut self, id: &str) -> bool;

    /// Programmatically clear the active selection.
    fn discard_active(&mut self);

    fn preview(&self) -> Option<&PreviewRect>;

    fn set_preview(&mut self, preview: Option<PreviewRect>);

    /// Ask for one repaint at the next frame.
    fn request_render(&mut self);

    /// Release native resources. The surface must not be used afterwards.
    fn dispose(&mut self);
}
