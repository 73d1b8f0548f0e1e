//! Annotation entity and document-space geometry.
//!
//! All geometry stored here is in document space: PDF points at scale 1.0.
//! Canvas pixels only exist transiently inside the drawing surface, see
//! [`crate::projection`].

use serde::{Deserialize, Serialize};

use crate::model::Label;
use crate::timestamp;

/// Unique identifier for an annotation. Opaque; drawn annotations get a UUID.
pub type AnnotationId = String;

/// Generate a fresh annotation id.
pub fn new_annotation_id() -> AnnotationId {
    uuid::Uuid::new_v4().to_string()
}

/// A 2D point. Document space or canvas space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the box
    pub width: f64,
    /// Height of the box
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero (or negative) width or height. Such boxes are never persisted.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// All components finite and the size non-negative.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Interaction tool the user currently has active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationTool {
    /// Select, move and resize existing annotations
    #[default]
    Select,
    /// Draw new bounding boxes
    Draw,
    /// Pan the page; annotations are locked
    Pan,
}

impl AnnotationTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationTool::Select => "Select",
            AnnotationTool::Draw => "Draw",
            AnnotationTool::Pan => "Pan",
        }
    }

    /// Whether existing annotations can be picked and manipulated.
    pub fn allows_manipulation(&self) -> bool {
        matches!(self, AnnotationTool::Select)
    }
}

/// A labeled bounding box on one page of the current document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier, stable for the annotation's lifetime.
    pub id: AnnotationId,
    /// 1-indexed page number.
    pub page: u32,
    /// Assigned label.
    pub label: Label,
    /// Optional custom text/name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Geometry in document space.
    pub bbox: BoundingBox,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Optional author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Annotation {
    /// Create an annotation stamped with the current time.
    pub fn new(id: impl Into<AnnotationId>, page: u32, label: Label, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            page,
            label,
            text: None,
            bbox,
            created_at: timestamp::now_iso8601(),
            created_by: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.created_by = author;
        self
    }

    /// Describe why this record is unusable, if it is.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("empty id".to_string());
        }
        if self.page == 0 {
            return Err(format!("annotation {} has page 0 (pages are 1-indexed)", self.id));
        }
        if !self.bbox.is_valid() {
            return Err(format!("annotation {} has invalid bbox {:?}", self.id, self.bbox));
        }
        if self.bbox.is_degenerate() {
            return Err(format!("annotation {} has zero area", self.id));
        }
        Ok(())
    }
}

/// Partial update merged into an existing annotation.
///
/// `None` leaves a field untouched. For the optional string fields the inner
/// option is the new value, so `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub page: Option<u32>,
    pub label: Option<Label>,
    pub text: Option<Option<String>>,
    pub bbox: Option<BoundingBox>,
    pub created_by: Option<Option<String>>,
}

impl AnnotationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn text(mut self, text: Option<String>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `annotation`. Returns true if anything changed.
    pub fn apply(&self, annotation: &mut Annotation) -> bool {
        let before = annotation.clone();
        if let Some(page) = self.page {
            annotation.page = page;
        }
        if let Some(label) = self.label {
            annotation.label = label;
        }
        if let Some(text) = &self.text {
            annotation.text = text.clone();
        }
        if let Some(bbox) = self.bbox {
            annotation.bbox = bbox;
        }
        if let Some(created_by) = &self.created_by {
            annotation.created_by = created_by.clone();
        }
        *annotation != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_box() {
        assert!(BoundingBox::new(5.0, 5.0, 0.0, 10.0).is_degenerate());
        assert!(BoundingBox::new(5.0, 5.0, 10.0, 0.0).is_degenerate());
        assert!(!BoundingBox::new(5.0, 5.0, 0.5, 0.5).is_degenerate());
    }

    #[test]
    fn test_only_select_manipulates() {
        assert!(AnnotationTool::Select.allows_manipulation());
        assert!(!AnnotationTool::Draw.allows_manipulation());
        assert!(!AnnotationTool::Pan.allows_manipulation());
    }

    #[test]
    fn test_validate() {
        let good = Annotation::new("a", 1, Label::Gpo, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert!(good.validate().is_ok());

        let mut page_zero = good.clone();
        page_zero.page = 0;
        assert!(page_zero.validate().is_err());

        let mut negative = good.clone();
        negative.bbox.width = -1.0;
        assert!(negative.validate().is_err());

        let mut nan = good.clone();
        nan.bbox.x = f64::NAN;
        assert!(nan.validate().is_err());

        let mut flat = good;
        flat.bbox.height = 0.0;
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut ann = Annotation::new("1", 1, Label::Downlight, BoundingBox::new(1.0, 2.0, 3.0, 4.0))
            .with_text("kitchen");
        let changed = AnnotationPatch::new().label(Label::SwitchSingle).apply(&mut ann);
        assert!(changed);
        assert_eq!(ann.label, Label::SwitchSingle);
        assert_eq!(ann.id, "1");
        assert_eq!(ann.text.as_deref(), Some("kitchen"));
        assert_eq!(ann.bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));

        // Same value again is not a change
        assert!(!AnnotationPatch::new().label(Label::SwitchSingle).apply(&mut ann));

        assert!(AnnotationPatch::new().text(None).apply(&mut ann));
        assert!(ann.text.is_none());
    }

    #[test]
    fn test_annotation_json_shape() {
        let ann = Annotation::new("abc", 2, Label::SwitchSingle, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        let value = serde_json::to_value(&ann).unwrap();
        assert_eq!(value["label"], "switch_single");
        assert_eq!(value["page"], 2);
        assert_eq!(value["bbox"]["width"], 3.0);
        assert!(value.get("text").is_none());
        assert!(value.get("created_by").is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = new_annotation_id();
        let b = new_annotation_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
