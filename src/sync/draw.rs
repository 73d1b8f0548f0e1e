//! Draw-tool gesture state.

use crate::canvas::PreviewRect;
use crate::constants::stroke;
use crate::model::{Label, Point};
use crate::projection::PixelRect;

/// Where the draw gesture is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    /// Pointer went down at `origin` (canvas pixels) and hasn't been released
    Drawing { origin: Point },
}

impl DrawState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawState::Drawing { .. })
    }
}

/// Rubber-band preview in the active label's color. The stroke is divided by
/// the scale so it keeps a constant visual weight at any zoom.
pub fn preview(rect: PixelRect, label: Label, scale: f64) -> PreviewRect {
    let color = label.color();
    PreviewRect {
        rect,
        fill: color.with_alpha(stroke::FILL_ALPHA),
        stroke: color,
        stroke_width: stroke::WIDTH / scale,
    }
}
