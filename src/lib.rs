//! Sonrai - PDF drawing annotation core
//!
//! Labeled bounding boxes over the pages of a PDF (electrical symbols on
//! architectural drawings and the like), kept consistent in both directions
//! with an interactive drawing surface across page changes, zoom, tool
//! switches and direct manipulation.
//!
//! - [`store`]: the single source of truth for annotations and view state
//! - [`factory`]: builds the drawable for one annotation at a given scale
//! - [`sync`]: the store/surface reconciliation engine
//! - [`viewer`]: page navigation, zoom and canvas mounting
//! - [`format`]: JSON import/export

pub mod canvas;
pub mod color;
pub mod config;
pub mod constants;
pub mod factory;
pub mod format;
pub mod model;
pub mod projection;
pub mod store;
pub mod sync;
pub mod timestamp;
pub mod viewer;

pub use model::{Annotation, AnnotationId, AnnotationTool, BoundingBox, Label, LabelCategory};
pub use store::{AnnotationStore, AppState, StoreEvent};
pub use sync::CanvasSync;
pub use viewer::{PageRenderer, Viewer, ViewerSettings};
