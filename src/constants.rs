//! Global constants for drawing, zoom and synchronization.

use crate::color::Rgba;

/// Annotation box styling on the drawing surface.
pub mod stroke {
    /// Stroke width of an annotation box, in canvas pixels
    pub const WIDTH: f64 = 2.0;
    /// Stroke width of a selected simple rectangle
    pub const SELECTED_WIDTH: f64 = 3.0;
    /// Alpha applied to the category color for box fills (20%)
    pub const FILL_ALPHA: u8 = 0x33;
}

/// Label caption inside an annotation box.
pub mod caption {
    /// Gap between the box edge and the caption, in canvas pixels
    pub const PADDING: f64 = 4.0;
    /// Natural font size before fit-to-box scaling
    pub const FONT_SIZE: f64 = 14.0;
    /// Font family requested from the surface
    pub const FONT_FAMILY: &str = "sans-serif";
}

/// Zoom limits and steps.
pub mod zoom {
    /// Smallest scale the viewer will apply
    pub const MIN_SCALE: f64 = 0.1;
    /// Increment used by zoom in/out
    pub const STEP: f64 = 0.1;
    /// Horizontal space reserved around the page when fitting to width
    pub const FIT_PADDING: f64 = 80.0;
    /// Auto-fit is skipped when it would change the scale by less than this
    pub const AUTO_FIT_THRESHOLD: f64 = 0.05;
}

/// Store/surface reconciliation.
pub mod sync {
    /// Pixel discrepancy below which a drawable's geometry is left alone
    pub const GEOMETRY_TOLERANCE: f64 = 1.0;
}

/// Highlight color for the selected annotation.
pub const SELECTION_COLOR: Rgba = Rgba::rgb(0x25, 0x63, 0xEB);

/// Corner handle outline color.
pub const CORNER_STROKE_COLOR: Rgba = Rgba::WHITE;

/// Default number of undoable steps kept in history.
pub const DEFAULT_UNDO_HISTORY: usize = 100;
