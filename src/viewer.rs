//! Viewer shell.
//!
//! Ties a [`PageRenderer`] (the PDF backend), the [`AnnotationStore`] and a
//! mounted [`CanvasSync`] together: page navigation with clamping, zoom and
//! fit-to-width, auto-fit on every page visit, remounting the canvas when the page
//! dimensions change, and file import/export.
//!
//! Every user-facing operation ends by pumping the store's change events
//! into the engine, so the surface is consistent when the call returns.

use std::path::Path;

use crate::canvas::{Size, Surface, SurfaceEvent};
use crate::constants::{self, zoom};
use crate::format::{AnnotationFile, FormatError};
use crate::model::{AnnotationPatch, AnnotationTool, Label, Point};
use crate::projection::{self, clamp_scale, fit_width_scale};
use crate::store::{AnnotationStore, AppState, StoreEvent};
use crate::sync::{CanvasSync, SyncReport};

/// A PDF backend failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Errors surfaced by viewer operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The renderer could not open the document
    #[error("Failed to open document: {0}")]
    Render(#[from] RenderError),

    /// Reading or writing an annotation file failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The operation needs an open document
    #[error("No document is open")]
    NoDocument,
}

/// PDF rendering and pagination, provided by the host.
pub trait PageRenderer {
    /// Open a document and return its page count.
    fn load_document(&mut self, name: &str) -> Result<u32, RenderError>;

    /// Native pixel size of `page` at scale 1.0, or `None` if out of range.
    fn page_size(&self, page: u32) -> Option<Size>;

    /// Draw `page` at `scale` underneath the surface.
    fn render_page(&mut self, page: u32, scale: f64);
}

/// Tunables for zoom, fitting and sync.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub zoom_step: f64,
    pub min_scale: f64,
    pub fit_padding: f64,
    /// Auto-fit only applies when it moves the scale by more than this
    pub auto_fit_threshold: f64,
    pub sync_tolerance: f64,
    pub undo_history: usize,
    pub default_label: Label,
    pub author: Option<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            zoom_step: zoom::STEP,
            min_scale: zoom::MIN_SCALE,
            fit_padding: zoom::FIT_PADDING,
            auto_fit_threshold: zoom::AUTO_FIT_THRESHOLD,
            sync_tolerance: constants::sync::GEOMETRY_TOLERANCE,
            undo_history: constants::DEFAULT_UNDO_HISTORY,
            default_label: Label::default(),
            author: None,
        }
    }
}

/// Document viewer with an annotation canvas over the current page.
pub struct Viewer<R: PageRenderer, S: Surface> {
    renderer: R,
    store: AnnotationStore,
    engine: Option<CanvasSync<S>>,
    new_surface: Box<dyn FnMut() -> S>,
    settings: ViewerSettings,
    /// Visible viewport size
    container: Size,
    /// The current file/page has been fitted to the container
    auto_fitted: bool,
    scroll: Point,
}

impl<R: PageRenderer, S: Surface> Viewer<R, S> {
    /// `new_surface` creates a fresh drawing surface each time the canvas is
    /// (re)mounted.
    pub fn new(
        renderer: R,
        new_surface: impl FnMut() -> S + 'static,
        settings: ViewerSettings,
    ) -> Self {
        let mut store = AnnotationStore::with_history(settings.undo_history);
        store.set_label(settings.default_label);
        store.take_events();

        Self {
            renderer,
            store,
            engine: None,
            new_surface: Box::new(new_surface),
            settings,
            container: Size::default(),
            auto_fitted: false,
            scroll: Point::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn engine(&self) -> Option<&CanvasSync<S>> {
        self.engine.as_ref()
    }

    /// Mutable engine access for the host's input layer.
    pub fn engine_mut(&mut self) -> Option<&mut CanvasSync<S>> {
        self.engine.as_mut()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Scroll offsets from the last centering pass.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Update the viewport size. A page that could not be fitted yet is
    /// fitted now.
    pub fn set_container(&mut self, size: Size) {
        self.container = size;
        if !self.auto_fitted && self.state().current_file.is_some() {
            let page = self.state().current_page;
            if let Some(page_size) = self.renderer.page_size(page) {
                self.auto_fit(page, page_size);
                self.pump();
            }
        }
        self.center_scroll();
    }

    // ========================================================================
    // Document and pages
    // ========================================================================

    /// Open a document. On failure the current document stays open.
    pub fn open_file(&mut self, name: &str) -> Result<(), ViewerError> {
        let total_pages = self.renderer.load_document(name)?;
        self.store.set_file(name);
        self.store.set_total_pages(total_pages);
        self.auto_fitted = false;
        self.page_loaded();
        Ok(())
    }

    /// Go to `page`, clamped to the document.
    pub fn go_to_page(&mut self, page: u32) {
        let state = self.store.state();
        let page = page.clamp(1, state.total_pages.max(1));
        if page == state.current_page {
            return;
        }
        self.store.set_page(page);
        self.auto_fitted = false;
        self.page_loaded();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.state().current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.state().current_page.saturating_sub(1));
    }

    /// The renderer has the current page: auto-fit, (re)mount the canvas and
    /// sync.
    fn page_loaded(&mut self) {
        let page = self.store.state().current_page;
        let Some(size) = self.renderer.page_size(page) else {
            log::warn!("Renderer has no size for page {}", page);
            self.pump();
            return;
        };
        self.auto_fit(page, size);
        self.ensure_engine(size);
        self.pump();
    }

    fn auto_fit(&mut self, page: u32, size: Size) {
        if self.auto_fitted || self.container.width <= 0.0 {
            return;
        }
        let fit = fit_width_scale(
            size.width,
            self.container.width,
            self.settings.fit_padding,
            self.settings.min_scale,
        );
        let current = self.store.state().scale;
        if (fit - current).abs() > self.settings.auto_fit_threshold {
            log::debug!("Auto-fit page {}: scale {:.2} -> {:.2}", page, current, fit);
            self.store.set_scale(fit);
        }
        self.auto_fitted = true;
    }

    fn ensure_engine(&mut self, size: Size) {
        if self.engine.as_ref().is_some_and(|e| e.page_size() == size) {
            return;
        }
        // Old surface is disposed before the new one exists
        if self.engine.take().is_some() {
            log::debug!("Page dimensions changed; remounting canvas");
        }
        let surface = (self.new_surface)();
        let engine = CanvasSync::mount(surface, size, self.store.state())
            .with_author(self.settings.author.clone())
            .with_tolerance(self.settings.sync_tolerance);
        self.engine = Some(engine);
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    pub fn set_scale(&mut self, scale: f64) {
        self.store
            .set_scale(clamp_scale(scale, self.settings.min_scale));
        self.pump();
    }

    pub fn zoom_in(&mut self) {
        let scale = projection::zoom_in(self.state().scale, self.settings.zoom_step);
        self.set_scale(scale);
    }

    pub fn zoom_out(&mut self) {
        let scale = projection::zoom_out(
            self.state().scale,
            self.settings.zoom_step,
            self.settings.min_scale,
        );
        self.set_scale(scale);
    }

    /// Scale the current page to fill the viewport width.
    pub fn fit_width(&mut self) {
        let Some(size) = self.renderer.page_size(self.state().current_page) else {
            return;
        };
        let scale = fit_width_scale(
            size.width,
            self.container.width,
            self.settings.fit_padding,
            self.settings.min_scale,
        );
        self.set_scale(scale);
    }

    /// Scroll offsets that center the page in the viewport; zero on an axis
    /// where the page fits.
    pub fn center_scroll(&mut self) -> Point {
        let page = self.state().current_page;
        let content = self
            .engine
            .as_ref()
            .map(|e| e.page_size())
            .or_else(|| self.renderer.page_size(page))
            .unwrap_or_default()
            .scaled(self.state().scale);
        self.scroll = Point::new(
            ((content.width - self.container.width) / 2.0).max(0.0),
            ((content.height - self.container.height) / 2.0).max(0.0),
        );
        self.scroll
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn set_tool(&mut self, tool: AnnotationTool) {
        self.store.set_tool(tool);
        self.pump();
    }

    pub fn set_label(&mut self, label: Label) {
        self.store.set_label(label);
        self.pump();
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.store.select_annotation(id);
        self.pump();
    }

    /// Edit fields of an annotation (label, text, ...).
    pub fn update_annotation(&mut self, id: &str, patch: &AnnotationPatch) -> bool {
        let changed = self.store.update_annotation(id, patch);
        self.pump();
        changed
    }

    /// Delete the selected annotation, if any.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.state().selected_annotation_id.clone() else {
            return false;
        };
        let deleted = self.store.delete_annotation(&id);
        self.pump();
        deleted
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.store.undo();
        self.pump();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.store.redo();
        self.pump();
        redone
    }

    /// Feed a surface event through the engine.
    pub fn dispatch(&mut self, event: SurfaceEvent) -> Option<SyncReport> {
        if let Some(engine) = self.engine.as_mut() {
            engine.handle_event(event, &mut self.store);
        }
        self.pump()
    }

    /// Forward pending store events to the renderer and the engine.
    pub fn pump(&mut self) -> Option<SyncReport> {
        let events = self.store.take_events();
        if events.is_empty() {
            return None;
        }

        let rerender = events.iter().any(|e| {
            matches!(
                e,
                StoreEvent::PageChanged | StoreEvent::ScaleChanged | StoreEvent::FileChanged
            )
        });
        if rerender {
            let state = self.store.state();
            self.renderer.render_page(state.current_page, state.scale);
        }

        let report = match self.engine.as_mut() {
            Some(engine) => engine.on_store_events(&events, self.store.state()),
            None => None,
        };

        if rerender {
            self.center_scroll();
        }
        report
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Suggested export filename for the open document.
    pub fn export_filename(&self) -> Option<String> {
        self.state()
            .current_file
            .as_deref()
            .map(AnnotationFile::default_filename)
    }

    pub fn export_json(&self) -> Result<String, FormatError> {
        AnnotationFile::from_state(self.state()).to_json()
    }

    /// Write all annotations to `path`. Needs an open document.
    pub fn save(&self, path: &Path) -> Result<(), ViewerError> {
        if self.state().current_file.is_none() {
            return Err(ViewerError::NoDocument);
        }
        AnnotationFile::from_state(self.state()).save(path)?;
        Ok(())
    }

    /// Replace all annotations with those in `json`. A rejected file leaves
    /// the state untouched. Returns the number of annotations loaded.
    pub fn load_json(&mut self, json: &str) -> Result<usize, ViewerError> {
        let file = AnnotationFile::from_json(json)?;
        Ok(self.apply_import(file))
    }

    pub fn load(&mut self, path: &Path) -> Result<usize, ViewerError> {
        let file = AnnotationFile::load(path)?;
        Ok(self.apply_import(file))
    }

    fn apply_import(&mut self, file: AnnotationFile) -> usize {
        let count = file.annotations.len();
        if !file.file.is_empty() && self.state().current_file.as_deref() != Some(file.file.as_str()) {
            log::warn!(
                "Annotations were made for '{}', applying to the open document anyway",
                file.file
            );
        }
        self.store.set_annotations(file.annotations);
        self.pump();
        count
    }
}
