//! Annotation store: the single source of truth for session state.
//!
//! Every mutation publishes a fresh immutable [`AppState`] snapshot (copy on
//! write through `Arc`), so a consumer holding an older snapshot never sees a
//! half-applied update. Changes are announced as [`StoreEvent`]s queued until
//! the observer drains them with [`AnnotationStore::take_events`]. Mutations
//! that change nothing emit nothing.
//!
//! The store does no I/O and never touches a drawing surface.

mod history;

pub use history::{Command, UndoConfig, UndoStack};

use std::sync::Arc;

use crate::constants::zoom;
use crate::model::{Annotation, AnnotationId, AnnotationPatch, AnnotationTool, Label};
use crate::projection::clamp_scale;

/// One session's worth of state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current_file: Option<String>,
    /// 1-indexed
    pub current_page: u32,
    pub total_pages: u32,
    pub scale: f64,
    /// Annotations on every page, in creation order
    pub annotations: Vec<Annotation>,
    pub selected_annotation_id: Option<AnnotationId>,
    pub active_tool: AnnotationTool,
    pub active_label: Label,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_file: None,
            current_page: 1,
            total_pages: 1,
            scale: 1.0,
            annotations: Vec::new(),
            selected_annotation_id: None,
            active_tool: AnnotationTool::default(),
            active_label: Label::default(),
        }
    }
}

impl AppState {
    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// The selected annotation, if the selection still resolves.
    pub fn selected(&self) -> Option<&Annotation> {
        self.selected_annotation_id
            .as_deref()
            .and_then(|id| self.annotation(id))
    }

    /// Annotations on the current page.
    pub fn page_annotations(&self) -> impl Iterator<Item = &Annotation> {
        let page = self.current_page;
        self.annotations.iter().filter(move |a| a.page == page)
    }

    /// Sorted, unique page numbers that carry at least one annotation.
    pub fn annotated_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.annotations.iter().map(|a| a.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    fn contains(&self, id: &str) -> bool {
        self.annotations.iter().any(|a| a.id == id)
    }
}

/// Change notifications published by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    AnnotationsChanged,
    PageChanged,
    ScaleChanged,
    ToolChanged,
    LabelChanged,
    SelectionChanged,
    FileChanged,
    TotalPagesChanged,
}

/// Owner of the current [`AppState`] snapshot, its change queue and the
/// undo history.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    state: Arc<AppState>,
    events: Vec<StoreEvent>,
    history: UndoStack,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a custom undo history depth.
    pub fn with_history(max_history: usize) -> Self {
        Self {
            history: UndoStack::with_config(UndoConfig { max_history }),
            ..Self::default()
        }
    }

    /// Current snapshot. Cheap; later mutations never affect it.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Borrow the current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Drain pending change events, oldest first.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn state_mut(&mut self) -> &mut AppState {
        Arc::make_mut(&mut self.state)
    }

    fn emit(&mut self, event: StoreEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// Drop the selection if it no longer resolves. Returns true if cleared.
    fn prune_selection(&mut self) -> bool {
        let dangling = match &self.state.selected_annotation_id {
            Some(id) => !self.state.contains(id),
            None => false,
        };
        if dangling {
            self.state_mut().selected_annotation_id = None;
            self.emit(StoreEvent::SelectionChanged);
        }
        dangling
    }

    // ========================================================================
    // Document and view
    // ========================================================================

    /// Open a new document: page goes back to 1 and annotations, selection
    /// and undo history are cleared. Always emits `FileChanged`, since
    /// reopening the same name is still a reload.
    pub fn set_file(&mut self, name: impl Into<String>) {
        let name = name.into();
        log::info!("Opening file '{}'", name);

        let previous = Arc::clone(&self.state);
        let state = self.state_mut();
        state.current_file = Some(name);
        state.current_page = 1;
        state.annotations.clear();
        state.selected_annotation_id = None;
        self.history.clear();

        self.emit(StoreEvent::FileChanged);
        if previous.current_page != 1 {
            self.emit(StoreEvent::PageChanged);
        }
        if !previous.annotations.is_empty() {
            self.emit(StoreEvent::AnnotationsChanged);
        }
        if previous.selected_annotation_id.is_some() {
            self.emit(StoreEvent::SelectionChanged);
        }
    }

    /// Assign the current page. Range checks against `total_pages` are the
    /// caller's job; only page 0 is lifted to 1.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if self.state.current_page == page {
            return;
        }
        log::debug!("Page {} -> {}", self.state.current_page, page);
        self.state_mut().current_page = page;
        self.emit(StoreEvent::PageChanged);
    }

    pub fn set_total_pages(&mut self, total: u32) {
        let total = total.max(1);
        if self.state.total_pages == total {
            return;
        }
        self.state_mut().total_pages = total;
        self.emit(StoreEvent::TotalPagesChanged);
    }

    /// Assign the scale. Non-finite or sub-minimum values are floored.
    pub fn set_scale(&mut self, scale: f64) {
        let scale = clamp_scale(scale, zoom::MIN_SCALE);
        if self.state.scale == scale {
            return;
        }
        log::debug!("Scale {:.2} -> {:.2}", self.state.scale, scale);
        self.state_mut().scale = scale;
        self.emit(StoreEvent::ScaleChanged);
    }

    pub fn set_tool(&mut self, tool: AnnotationTool) {
        if self.state.active_tool == tool {
            return;
        }
        log::debug!("Tool -> {}", tool.name());
        self.state_mut().active_tool = tool;
        self.emit(StoreEvent::ToolChanged);
    }

    pub fn set_label(&mut self, label: Label) {
        if self.state.active_label == label {
            return;
        }
        log::debug!("Active label -> {}", label);
        self.state_mut().active_label = label;
        self.emit(StoreEvent::LabelChanged);
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Append an annotation. Duplicate ids and unusable records (zero area,
    /// page 0, ...) are rejected with a warning and `false`.
    pub fn add_annotation(&mut self, annotation: Annotation) -> bool {
        if self.state.contains(&annotation.id) {
            log::warn!("Rejected annotation with duplicate id {}", annotation.id);
            return false;
        }
        if let Err(reason) = annotation.validate() {
            log::warn!("Rejected annotation: {}", reason);
            return false;
        }

        log::info!(
            "Added {} on page {} ({})",
            annotation.label,
            annotation.page,
            annotation.id
        );
        self.history.push(Command::AddAnnotation {
            annotation: annotation.clone(),
        });
        self.state_mut().annotations.push(annotation);
        self.emit(StoreEvent::AnnotationsChanged);
        true
    }

    /// Merge `patch` into the annotation with `id`. Returns true if anything
    /// changed; unknown ids and empty patches are silent no-ops.
    pub fn update_annotation(&mut self, id: &str, patch: &AnnotationPatch) -> bool {
        let Some(index) = self.state.annotations.iter().position(|a| a.id == id) else {
            log::debug!("Update ignored: no annotation {}", id);
            return false;
        };

        let before = self.state.annotations[index].clone();
        let mut after = before.clone();
        if !patch.apply(&mut after) {
            return false;
        }
        if let Err(reason) = after.validate() {
            log::warn!("Rejected update to {}: {}", id, reason);
            return false;
        }

        log::debug!("Updated annotation {}", id);
        self.state_mut().annotations[index] = after.clone();
        self.history.push(Command::ModifyAnnotation { before, after });
        self.emit(StoreEvent::AnnotationsChanged);
        true
    }

    /// Remove the annotation with `id`, clearing the selection if it was the
    /// selected one.
    pub fn delete_annotation(&mut self, id: &str) -> bool {
        let Some(index) = self.state.annotations.iter().position(|a| a.id == id) else {
            return false;
        };

        let annotation = self.state_mut().annotations.remove(index);
        log::info!("Deleted {} ({})", annotation.label, annotation.id);
        self.history.push(Command::RemoveAnnotation { index, annotation });
        self.emit(StoreEvent::AnnotationsChanged);
        self.prune_selection();
        true
    }

    /// Replace every annotation at once (import). Later duplicates of an id
    /// are dropped. The selection survives only if its id is still present.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        let mut unique: Vec<Annotation> = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            if unique.iter().any(|a| a.id == annotation.id) {
                log::warn!("Dropped duplicate annotation id {}", annotation.id);
                continue;
            }
            unique.push(annotation);
        }

        if unique == self.state.annotations {
            return;
        }

        log::info!("Replaced annotations ({} total)", unique.len());
        let before = std::mem::replace(&mut self.state_mut().annotations, unique.clone());
        self.history.push(Command::ReplaceAll {
            before,
            after: unique,
        });
        self.emit(StoreEvent::AnnotationsChanged);
        self.prune_selection();
    }

    /// Select an annotation by id, or clear with `None`. An id that doesn't
    /// resolve clears the selection.
    pub fn select_annotation(&mut self, id: Option<&str>) {
        let resolved = id.filter(|id| self.state.contains(id)).map(str::to_string);
        if resolved.is_none() && id.is_some() {
            log::debug!("Select ignored unknown id; clearing selection");
        }
        if self.state.selected_annotation_id == resolved {
            return;
        }
        self.state_mut().selected_annotation_id = resolved;
        self.emit(StoreEvent::SelectionChanged);
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Reverse the most recent annotation edit. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(cmd) = self.history.pop_undo() else {
            return false;
        };
        cmd.undo(&mut self.state_mut().annotations);
        self.emit(StoreEvent::AnnotationsChanged);
        self.prune_selection();
        true
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(cmd) = self.history.pop_redo() else {
            return false;
        };
        cmd.redo(&mut self.state_mut().annotations);
        self.emit(StoreEvent::AnnotationsChanged);
        self.prune_selection();
        true
    }
}
