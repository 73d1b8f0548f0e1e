//! Render-object factory.
//!
//! Builds the composite drawable (box + caption) for one annotation at a
//! given scale. Only used for drawables that don't exist yet; the sync engine
//! updates existing ones in place.

use crate::canvas::{Caption, Drawable, DrawableKind, ObjectProps, RectShape, TextMetrics};
use crate::constants::{caption, stroke};
use crate::model::Annotation;
use crate::projection::Projection;

/// Builds drawables for annotations.
#[derive(Debug, Clone, Default)]
pub struct RenderFactory {
    metrics: TextMetrics,
}

impl RenderFactory {
    pub fn new() -> Self {
        Self {
            metrics: TextMetrics::new(caption::FONT_SIZE),
        }
    }

    /// Build the composite drawable for `annotation` at `projection`'s scale.
    ///
    /// The rectangle is shrunk by the stroke width so that fill plus stroke
    /// covers exactly the projected box, and the group is given that box as
    /// its explicit size.
    pub fn create(&self, annotation: &Annotation, projection: &Projection) -> Drawable {
        let color = annotation.label.color();
        let target = projection.to_canvas(&annotation.bbox);

        let frame = RectShape {
            width: (target.width - stroke::WIDTH).max(0.0),
            height: (target.height - stroke::WIDTH).max(0.0),
            fill: color.with_alpha(stroke::FILL_ALPHA),
            stroke: color,
            stroke_width: stroke::WIDTH,
        };

        let text = annotation.label.display_name();
        let (natural_width, natural_height) = self.metrics.measure(&text);
        let caption = Caption {
            text,
            font_family: caption::FONT_FAMILY,
            font_size: self.metrics.size,
            fill: color,
            top: -target.height / 2.0 + caption::PADDING,
            width: natural_width,
            height: natural_height,
            scale: fit_caption_scale(natural_width, natural_height, target.width, target.height),
        };

        Drawable {
            id: annotation.id.clone(),
            label: annotation.label,
            left: target.left,
            top: target.top,
            width: target.width,
            height: target.height,
            scale_x: 1.0,
            scale_y: 1.0,
            props: ObjectProps::tinted(color),
            kind: DrawableKind::Group { frame, caption },
        }
    }
}

/// Uniform caption scale so the text fits inside the padded box interior.
///
/// Width is fitted first, then the height is checked against the already
/// width-fitted size. A non-positive interior gives 0 (hidden, not removed).
pub fn fit_caption_scale(text_width: f64, text_height: f64, box_width: f64, box_height: f64) -> f64 {
    let max_width = (box_width - caption::PADDING * 2.0).max(0.0);
    let max_height = (box_height - caption::PADDING * 2.0).max(0.0);

    if max_width <= 0.0 || max_height <= 0.0 {
        return 0.0;
    }

    let mut scale = 1.0;
    if text_width > max_width {
        scale = max_width / text_width;
    }
    if text_height * scale > max_height {
        scale = max_height / text_height;
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Label};

    fn annotation(label: Label, bbox: BoundingBox) -> Annotation {
        Annotation::new("123", 1, label, bbox)
    }

    #[test]
    fn test_group_geometry() {
        let factory = RenderFactory::new();
        let ann = annotation(Label::Downlight, BoundingBox::new(10.0, 20.0, 100.0, 50.0));
        let d = factory.create(&ann, &Projection::new(1.5));

        assert!(d.is_group());
        assert_eq!(d.id, "123");
        assert_eq!(d.left, 15.0);
        assert_eq!(d.top, 30.0);
        assert_eq!(d.width, 150.0);
        assert_eq!(d.height, 75.0);
        assert_eq!(d.scale_x, 1.0);

        // 150 - 2 stroke
        assert_eq!(d.frame().width, 148.0);
        assert_eq!(d.frame().height, 73.0);
        assert_eq!(d.frame().width + d.frame().stroke_width, d.width);
    }

    #[test]
    fn test_caption_text_and_colors() {
        let factory = RenderFactory::new();
        let ann = annotation(Label::SwitchSingle, BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        let d = factory.create(&ann, &Projection::new(1.0));

        let caption = d.caption().unwrap();
        assert_eq!(caption.text, "switch single");
        assert_eq!(caption.fill, Label::SwitchSingle.color());
        assert_eq!(d.frame().stroke, Label::SwitchSingle.color());
        assert_eq!(d.frame().fill.a, 0x33);
        assert_eq!(d.props.border_color, Label::SwitchSingle.color());
        // Top edge of the caption sits 4px inside the box top
        assert_eq!(caption.top, -25.0 + 4.0);
    }

    #[test]
    fn test_caption_shrinks_to_box_width() {
        let factory = RenderFactory::new();
        // "distribution board" is far wider than 40px
        let ann = annotation(Label::DistributionBoard, BoundingBox::new(0.0, 0.0, 40.0, 200.0));
        let d = factory.create(&ann, &Projection::new(1.0));
        let caption = d.caption().unwrap();
        assert!(caption.scale < 1.0);
        assert!((caption.scaled_width() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_caption_shrinks_to_box_height() {
        // Wide but very short box: height is the binding constraint
        let scale = fit_caption_scale(50.0, 16.24, 500.0, 12.0);
        assert!((16.24 * scale - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_caption_kept_at_natural_size_when_it_fits() {
        assert_eq!(fit_caption_scale(20.0, 10.0, 200.0, 200.0), 1.0);
    }

    #[test]
    fn test_tiny_box_hides_caption_but_keeps_it() {
        let factory = RenderFactory::new();
        let ann = annotation(Label::Gpo, BoundingBox::new(0.0, 0.0, 6.0, 6.0));
        let d = factory.create(&ann, &Projection::new(1.0));
        let caption = d.caption().unwrap();
        assert_eq!(caption.scale, 0.0);
        assert_eq!(caption.text, "gpo");
    }

    #[test]
    fn test_rect_never_negative() {
        let factory = RenderFactory::new();
        let ann = annotation(Label::Gpo, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let d = factory.create(&ann, &Projection::new(1.0));
        assert_eq!(d.frame().width, 0.0);
        assert_eq!(d.frame().height, 0.0);
        assert_eq!(d.width, 1.0);
    }
}
