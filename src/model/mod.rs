//! Data models: annotations, document-space geometry and the label taxonomy.

mod annotation;
mod label;

pub use annotation::{
    Annotation, AnnotationId, AnnotationPatch, AnnotationTool, BoundingBox, Point,
    new_annotation_id,
};
pub use label::{Label, LabelCategory, UnknownLabel};
