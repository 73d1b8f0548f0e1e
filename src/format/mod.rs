//! Annotation file import/export.
//!
//! One native format: a versioned JSON document holding every annotation of
//! a PDF plus derived metadata. See [`AnnotationFile`] for the layout and
//! the validation applied on import.

mod error;
mod file;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use file::{AnnotationFile, FileMetadata, FileSummary};
