//! Text measurement for captions.
//!
//! The surface owns real font rendering; the factory only needs an estimate
//! of a caption's natural size to decide how far to shrink it.

/// Metrics for a specific font/size combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Font size in pixels
    pub size: f64,
    /// Average character width as a ratio of font size
    pub char_width_ratio: f64,
    /// Line height as a ratio of font size
    pub line_height_ratio: f64,
}

impl TextMetrics {
    /// Proportional sans-serif: average glyph is a bit over half the size,
    /// and lines use the 1.16 leading drawing surfaces default to.
    pub const SANS: TextMetrics = TextMetrics {
        size: 14.0,
        char_width_ratio: 0.55,
        line_height_ratio: 1.16,
    };

    /// Create metrics for a specific font size.
    pub fn new(size: f64) -> Self {
        Self {
            size,
            ..Self::SANS
        }
    }

    /// Estimate the width of a single line of text.
    pub fn line_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size * self.char_width_ratio
    }

    pub fn line_height(&self) -> f64 {
        self.size * self.line_height_ratio
    }

    /// Estimate `(width, height)` for possibly multi-line text.
    pub fn measure(&self, text: &str) -> (f64, f64) {
        let lines: Vec<&str> = text.lines().collect();
        let line_count = lines.len().max(1);
        let width = lines
            .iter()
            .map(|line| self.line_width(line))
            .fold(0.0f64, f64::max);
        (width, line_count as f64 * self.line_height())
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::SANS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_single_line() {
        let m = TextMetrics::new(10.0);
        let (w, h) = m.measure("abcd");
        assert!((w - 22.0).abs() < 1e-9);
        assert!((h - 11.6).abs() < 1e-9);
    }

    #[test]
    fn test_measure_empty_is_one_line() {
        let (w, h) = TextMetrics::SANS.measure("");
        assert_eq!(w, 0.0);
        assert!(h > 0.0);
    }

    #[test]
    fn test_measure_multi_line_uses_widest() {
        let m = TextMetrics::new(10.0);
        let (w, h) = m.measure("ab\nabcdef");
        assert!((w - m.line_width("abcdef")).abs() < 1e-9);
        assert!((h - 2.0 * m.line_height()).abs() < 1e-9);
    }
}
