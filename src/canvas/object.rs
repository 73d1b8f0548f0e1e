//! Strongly typed drawable objects.
//!
//! A [`Drawable`] is the surface-side representation of one annotation.
//! Every property the engine touches is an explicit field, so there is no
//! option-bag passed to the surface.

use crate::color::Rgba;
use crate::model::{AnnotationId, Label};
use crate::projection::PixelRect;

/// Shape of the resize handles drawn on a selected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerStyle {
    #[default]
    Rect,
    Circle,
}

/// Cursor shown while hovering an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Move,
}

/// Interaction and chrome properties common to every drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProps {
    /// Can be picked as the active selection
    pub selectable: bool,
    /// Receives pointer events at all
    pub evented: bool,
    pub hover_cursor: Cursor,
    pub corner_color: Rgba,
    pub corner_stroke_color: Rgba,
    pub border_color: Rgba,
    pub corner_style: CornerStyle,
    pub transparent_corners: bool,
    pub object_caching: bool,
}

impl ObjectProps {
    /// Locked props tinted with `color`.
    pub fn tinted(color: Rgba) -> Self {
        Self {
            selectable: false,
            evented: false,
            hover_cursor: Cursor::Default,
            corner_color: color,
            corner_stroke_color: Rgba::WHITE,
            border_color: color,
            corner_style: CornerStyle::Circle,
            transparent_corners: false,
            object_caching: false,
        }
    }

    /// Toggle interactivity; returns true if anything changed.
    pub fn set_interactive(&mut self, interactive: bool) -> bool {
        let cursor = if interactive {
            Cursor::Move
        } else {
            Cursor::Default
        };
        let changed = self.selectable != interactive
            || self.evented != interactive
            || self.hover_cursor != cursor;
        self.selectable = interactive;
        self.evented = interactive;
        self.hover_cursor = cursor;
        changed
    }
}

/// Filled and stroked rectangle. Inside a group it is centered on the
/// group's center.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub width: f64,
    pub height: f64,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

/// Label caption inside a group, horizontally centered.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub font_family: &'static str,
    pub font_size: f64,
    pub fill: Rgba,
    /// Offset of the caption's top edge from the group center
    pub top: f64,
    /// Natural (unscaled) size
    pub width: f64,
    pub height: f64,
    /// Uniform fit-to-box scale; 0 hides the caption without removing it
    pub scale: f64,
}

impl Caption {
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale
    }
}

/// What a drawable is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableKind {
    /// A bare rectangle; its size is the drawable's own width/height.
    Rect(RectShape),
    /// Rectangle plus caption, moved and scaled as one unit.
    Group { frame: RectShape, caption: Caption },
}

/// A surface object tagged with the annotation it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub id: AnnotationId,
    /// Label the styling was built from
    pub label: Label,
    pub left: f64,
    pub top: f64,
    /// Unscaled size
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub props: ObjectProps,
    pub kind: DrawableKind,
}

impl Drawable {
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    /// Displayed bounds in canvas pixels.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.left, self.top, self.scaled_width(), self.scaled_height())
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, DrawableKind::Group { .. })
    }

    /// Caption, for groups.
    pub fn caption(&self) -> Option<&Caption> {
        match &self.kind {
            DrawableKind::Group { caption, .. } => Some(caption),
            DrawableKind::Rect(_) => None,
        }
    }

    /// The rectangle: the group frame or the bare rect.
    pub fn frame(&self) -> &RectShape {
        match &self.kind {
            DrawableKind::Group { frame, .. } => frame,
            DrawableKind::Rect(rect) => rect,
        }
    }

    /// Move/resize to `target`.
    ///
    /// Bare rects take the size directly and reset their scale. Groups keep
    /// their base size and get proportional scale factors, which rescales the
    /// children with them.
    pub fn fit_to(&mut self, target: &PixelRect) {
        self.left = target.left;
        self.top = target.top;
        match &mut self.kind {
            DrawableKind::Rect(rect) => {
                self.width = target.width;
                self.height = target.height;
                rect.width = target.width;
                rect.height = target.height;
                self.scale_x = 1.0;
                self.scale_y = 1.0;
            }
            DrawableKind::Group { .. } => {
                let base_width = if self.width > 0.0 { self.width } else { 1.0 };
                let base_height = if self.height > 0.0 { self.height } else { 1.0 };
                self.scale_x = target.width / base_width;
                self.scale_y = target.height / base_height;
            }
        }
    }
}

/// Transient rubber-band rectangle shown while drawing. Never tagged and
/// never interactive.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRect {
    pub rect: PixelRect,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}
