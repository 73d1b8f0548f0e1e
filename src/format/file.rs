//! The JSON annotation file.
//!
//! # Layout
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "file": "plan.pdf",
//!   "annotations": [ { "id": "...", "page": 1, "label": "gpo", "bbox": {...}, "created_at": "..." } ],
//!   "metadata": { "total_pages": 4, "annotated_pages": [1, 3], "last_modified": "..." }
//! }
//! ```
//!
//! Exports always write every field. Imports only require an `annotations`
//! array of valid records; `version`, `file` and `metadata` are optional
//! because files written by older tools omit them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FormatError;
use crate::model::{Annotation, LabelCategory};
use crate::store::AppState;
use crate::timestamp;

/// File-level metadata, derived from the annotations at export time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    pub total_pages: u32,
    /// Sorted, unique
    pub annotated_pages: Vec<u32>,
    /// ISO 8601
    pub last_modified: String,
}

/// A complete annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFile {
    pub version: String,
    /// Name of the annotated document
    pub file: String,
    pub annotations: Vec<Annotation>,
    pub metadata: FileMetadata,
}

impl AnnotationFile {
    /// Format version written on export.
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    /// Major version this build can read.
    pub const VERSION_MAJOR: u32 = 1;

    /// Snapshot the store state for export.
    pub fn from_state(state: &AppState) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            file: state.current_file.clone().unwrap_or_default(),
            annotations: state.annotations.clone(),
            metadata: FileMetadata {
                total_pages: state.total_pages,
                annotated_pages: state.annotated_pages(),
                last_modified: timestamp::now_iso8601(),
            },
        }
    }

    /// Leading major number of a version such as `1.0.0`, `1.0` or `2`.
    pub fn parse_major(version: &str) -> Option<u32> {
        version.split('.').next()?.trim().parse().ok()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate an annotation file.
    ///
    /// Rejects anything that is not a JSON object with an `annotations`
    /// array, any record that fails to parse or validate, duplicate ids and
    /// versions from a newer major release. Unreadable versions are ignored
    /// and missing or malformed metadata is recomputed from the records.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(mut object) = root else {
            return Err(FormatError::invalid_format("top level is not a JSON object"));
        };

        let version = match object.remove("version") {
            Some(Value::String(v)) => v,
            Some(Value::Number(n)) => n.to_string(),
            _ => Self::CURRENT_VERSION.to_string(),
        };
        if Self::parse_major(&version).is_some_and(|major| major > Self::VERSION_MAJOR) {
            return Err(FormatError::VersionMismatch {
                expected: Self::CURRENT_VERSION.to_string(),
                found: version,
            });
        }

        let records = match object.remove("annotations") {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(FormatError::invalid_format("'annotations' is not an array"));
            }
            None => return Err(FormatError::missing_field("annotations")),
        };

        let mut annotations: Vec<Annotation> = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let annotation: Annotation = serde_json::from_value(record)
                .map_err(|e| FormatError::invalid_annotation(index, e.to_string()))?;
            annotation
                .validate()
                .map_err(|reason| FormatError::invalid_annotation(index, reason))?;
            if annotations.iter().any(|a| a.id == annotation.id) {
                return Err(FormatError::invalid_annotation(
                    index,
                    format!("duplicate id {}", annotation.id),
                ));
            }
            annotations.push(annotation);
        }

        let file = match object.remove("file") {
            Some(Value::String(file)) => file,
            _ => String::new(),
        };

        let mut annotated_pages: Vec<u32> = annotations.iter().map(|a| a.page).collect();
        annotated_pages.sort_unstable();
        annotated_pages.dedup();
        let metadata = match object
            .remove("metadata")
            .map(serde_json::from_value::<FileMetadata>)
        {
            Some(Ok(mut metadata)) => {
                metadata.annotated_pages = annotated_pages;
                metadata
            }
            parsed => {
                if let Some(Err(e)) = parsed {
                    log::warn!("Ignoring malformed metadata: {}", e);
                }
                FileMetadata {
                    total_pages: annotations.iter().map(|a| a.page).max().unwrap_or(0),
                    annotated_pages,
                    last_modified: String::new(),
                }
            }
        };

        log::debug!(
            "Parsed annotation file v{} with {} annotations",
            version,
            annotations.len()
        );
        Ok(Self {
            version,
            file,
            annotations,
            metadata,
        })
    }

    /// Write the file to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!(
            "Saved {} annotations to {}",
            self.annotations.len(),
            path.display()
        );
        Ok(())
    }

    /// Read and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let json = std::fs::read_to_string(path)?;
        let file = Self::from_json(&json)?;
        log::info!(
            "Loaded {} annotations from {}",
            file.annotations.len(),
            path.display()
        );
        Ok(file)
    }

    /// Default export name for a document: `annotations-<stem>.json`, where
    /// the stem is everything before the first `.pdf`.
    pub fn default_filename(document: &str) -> String {
        let stem = document.split(".pdf").next().unwrap_or(document);
        format!("annotations-{stem}.json")
    }

    /// Per-page and per-category counts.
    pub fn summary(&self) -> FileSummary {
        let mut per_page: Vec<(u32, usize)> = Vec::new();
        for page in &self.metadata.annotated_pages {
            let count = self.annotations.iter().filter(|a| a.page == *page).count();
            per_page.push((*page, count));
        }

        let per_category = LabelCategory::all()
            .iter()
            .map(|cat| {
                let count = self
                    .annotations
                    .iter()
                    .filter(|a| a.label.category() == *cat)
                    .count();
                (*cat, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        FileSummary {
            file: self.file.clone(),
            total: self.annotations.len(),
            total_pages: self.metadata.total_pages,
            per_page,
            per_category,
        }
    }
}

/// Counts shown by the command-line inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub file: String,
    pub total: usize,
    pub total_pages: u32,
    pub per_page: Vec<(u32, usize)>,
    /// Only categories with at least one annotation, in menu order
    pub per_category: Vec<(LabelCategory, usize)>,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.file.is_empty() {
            "(unnamed)"
        } else {
            self.file.as_str()
        };
        writeln!(
            f,
            "{}: {} annotations on {} of {} pages",
            name,
            self.total,
            self.per_page.len(),
            self.total_pages
        )?;
        for (page, count) in &self.per_page {
            writeln!(f, "  page {page}: {count}")?;
        }
        for (category, count) in &self.per_category {
            writeln!(f, "  {}: {}", category.name(), count)?;
        }
        Ok(())
    }
}
