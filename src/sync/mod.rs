//! Canvas synchronization engine.
//!
//! Keeps the drawables on a mounted [`Surface`] consistent with the
//! [`AnnotationStore`] in both directions:
//!
//! - **Surface to store**: draw gestures become new annotations, finished
//!   move/resize gestures write their geometry back
//!   ([`CanvasSync::sync_drawable_to_store`]), and the surface's active
//!   selection is mirrored into the store.
//! - **Store to surface**: every relevant [`StoreEvent`] triggers a
//!   reconciliation pass ([`CanvasSync::sync_store_to_surface`]) that removes,
//!   creates, repositions and restyles drawables for the current page.
//!
//! While the user is dragging or resizing an object, passes are deferred so
//! the gesture isn't fought; the skipped pass runs once the gesture ends.
//!
//! All geometry crosses the boundary through one [`Projection`], so a box
//! drawn at any zoom reloads exactly where it was drawn.

mod draw;


pub use draw::DrawState;

use crate::canvas::{Drawable, DrawableKind, Size, Surface, SurfaceEvent};
use crate::constants::{self, stroke};
use crate::factory::RenderFactory;
use crate::model::{
    Annotation, AnnotationPatch, AnnotationTool, Label, Point, new_annotation_id,
};
use crate::projection::{PixelRect, Projection};
use crate::store::{AnnotationStore, AppState, StoreEvent};

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Drawables created for annotations that had none
    pub created: usize,
    /// Drawables removed (deleted annotations or other pages)
    pub removed: usize,
    /// Drawables moved or resized to match their stored bbox
    pub resized: usize,
    /// Drawables whose highlight or interactivity changed
    pub restyled: usize,
    /// Drawables rebuilt because their label changed
    pub rebuilt: usize,
    /// Whether the surface's active selection was changed
    pub selection_changed: bool,
}

impl SyncReport {
    /// True when the pass found the surface already consistent.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Two-way binding between the store and one mounted surface.
///
/// The engine owns its surface and disposes it when dropped. It is mounted
/// for one page size; the viewer drops and remounts it when the rendered
/// page's native dimensions change.
#[derive(Debug)]
pub struct CanvasSync<S: Surface> {
    surface: S,
    factory: RenderFactory,
    /// Native page size at scale 1.0
    page_size: Size,
    projection: Projection,
    draw: DrawState,
    /// A native move/resize is in progress
    dragging: bool,
    /// A pass was skipped during a drag and must run afterwards
    pending_sync: bool,
    tolerance: f64,
    author: Option<String>,
}

impl<S: Surface> CanvasSync<S> {
    /// Take ownership of `surface`, size it to the page and run an initial
    /// reconciliation pass against `state`.
    pub fn mount(surface: S, page_size: Size, state: &AppState) -> Self {
        log::debug!(
            "Mounting canvas for {}x{} page at scale {:.2}",
            page_size.width,
            page_size.height,
            state.scale
        );
        let mut engine = Self {
            surface,
            factory: RenderFactory::new(),
            page_size,
            projection: Projection::new(state.scale),
            draw: DrawState::Idle,
            dragging: false,
            pending_sync: false,
            tolerance: constants::sync::GEOMETRY_TOLERANCE,
            author: None,
        };
        engine.sync_store_to_surface(state);
        engine
    }

    /// Author written into `created_by` of drawn annotations.
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    /// Pixel discrepancy tolerated before a drawable is repositioned.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct surface access for the host's input layer.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw
    }

    /// Whether a deferred pass is waiting for the current drag to end.
    pub fn has_pending_sync(&self) -> bool {
        self.pending_sync
    }

    // ========================================================================
    // Surface -> store
    // ========================================================================

    /// Route one surface event into the store.
    pub fn handle_event(&mut self, event: SurfaceEvent, store: &mut AnnotationStore) {
        match event {
            SurfaceEvent::PointerDown(p) => {
                if store.state().active_tool == AnnotationTool::Draw {
                    self.begin_draw(p, store);
                }
            }
            SurfaceEvent::PointerMove(p) => self.update_draw(p),
            SurfaceEvent::PointerUp(p) => {
                if self.draw.is_drawing() {
                    self.update_draw(p);
                    self.finish_draw(store);
                }
            }
            SurfaceEvent::ObjectMoving(_) | SurfaceEvent::ObjectScaling(_) => {
                if !self.dragging {
                    log::debug!("Drag started; deferring reconciliation");
                }
                self.dragging = true;
            }
            SurfaceEvent::ObjectModified(id) => {
                let changed = self.sync_drawable_to_store(&id, store);
                self.dragging = false;
                // A rejected or unchanged write leaves no event behind, so
                // snap the drawable back (and run any deferred pass) here.
                if !changed || self.pending_sync {
                    self.sync_store_to_surface(store.state());
                }
            }
            SurfaceEvent::SelectionChanged => {
                let active = self.surface.active_ids();
                match active.as_slice() {
                    [id] => store.select_annotation(Some(id.as_str())),
                    _ => store.select_annotation(None),
                }
            }
        }
    }

    /// Write a drawable's displayed geometry back to its annotation.
    /// Returns true if the store changed.
    pub fn sync_drawable_to_store(&mut self, id: &str, store: &mut AnnotationStore) -> bool {
        let Some(drawable) = self.surface.get(id) else {
            log::debug!("Modified object {} is not on the surface", id);
            return false;
        };
        let projection = Projection::new(store.state().scale);
        let bbox = projection.to_document(&drawable.bounds());
        store.update_annotation(id, &AnnotationPatch::new().bbox(bbox))
    }

    fn begin_draw(&mut self, origin: Point, store: &mut AnnotationStore) {
        self.surface.discard_active();
        store.select_annotation(None);

        let state = store.state();
        let rect = PixelRect::from_corners(origin, origin);
        self.surface
            .set_preview(Some(draw::preview(rect, state.active_label, state.scale)));
        self.draw = DrawState::Drawing { origin };
        self.surface.request_render();
    }

    fn update_draw(&mut self, pointer: Point) {
        let DrawState::Drawing { origin } = self.draw else {
            return;
        };
        let rect = PixelRect::from_corners(origin, pointer);
        if let Some(mut preview) = self.surface.preview().cloned() {
            preview.rect = rect;
            self.surface.set_preview(Some(preview));
            self.surface.request_render();
        }
    }

    fn finish_draw(&mut self, store: &mut AnnotationStore) {
        self.draw = DrawState::Idle;
        let preview = self.surface.preview().cloned();
        self.surface.set_preview(None);
        self.surface.request_render();

        let Some(preview) = preview else {
            return;
        };
        if preview.rect.width <= 0.0 || preview.rect.height <= 0.0 {
            log::debug!("Discarded zero-size draw");
            return;
        }

        let state = store.state();
        let projection = Projection::new(state.scale);
        let annotation = Annotation::new(
            new_annotation_id(),
            state.current_page,
            state.active_label,
            projection.to_document(&preview.rect),
        )
        .with_author(self.author.clone());

        let id = annotation.id.clone();
        if store.add_annotation(annotation) {
            store.select_annotation(Some(&id));
        }
    }

    /// Abandon an in-progress draw, removing its preview.
    pub fn cancel_draw(&mut self) {
        if self.draw.is_drawing() {
            log::debug!("Draw cancelled");
            self.draw = DrawState::Idle;
            self.surface.set_preview(None);
            self.surface.request_render();
        }
    }

    // ========================================================================
    // Store -> surface
    // ========================================================================

    /// React to drained store events. Returns the pass report, or `None` if
    /// no pass was needed or it was deferred by a drag.
    pub fn on_store_events(&mut self, events: &[StoreEvent], state: &AppState) -> Option<SyncReport> {
        let mut needs_pass = false;
        for event in events {
            match event {
                StoreEvent::PageChanged | StoreEvent::FileChanged => {
                    self.cancel_draw();
                    needs_pass = true;
                }
                StoreEvent::ToolChanged => {
                    if state.active_tool != AnnotationTool::Draw {
                        self.cancel_draw();
                    }
                    needs_pass = true;
                }
                StoreEvent::AnnotationsChanged
                | StoreEvent::ScaleChanged
                | StoreEvent::SelectionChanged => needs_pass = true,
                StoreEvent::LabelChanged | StoreEvent::TotalPagesChanged => {}
            }
        }

        if !needs_pass {
            return None;
        }
        if self.dragging {
            self.pending_sync = true;
            return None;
        }
        Some(self.sync_store_to_surface(state))
    }

    /// Reconcile the surface with `state`: the surface ends up holding
    /// exactly one drawable per annotation on the current page, positioned,
    /// styled and selected to match. Running it twice in a row changes
    /// nothing the second time.
    pub fn sync_store_to_surface(&mut self, state: &AppState) -> SyncReport {
        let mut report = SyncReport::default();
        self.pending_sync = false;

        self.projection = Projection::new(state.scale);
        let size = self.page_size.scaled(self.projection.scale());
        if self.surface.size() != size {
            self.surface.set_size(size);
        }

        let interactive = state.active_tool.allows_manipulation();
        self.surface.set_selection_enabled(interactive);

        let working: Vec<&Annotation> = state.page_annotations().collect();

        for id in self.surface.ids() {
            if !working.iter().any(|a| a.id == id) {
                self.surface.remove(&id);
                report.removed += 1;
            }
        }

        let selected_id = state.selected_annotation_id.as_deref();
        for annotation in &working {
            let selected = selected_id == Some(annotation.id.as_str());
            self.upsert(annotation, selected, interactive, &mut report);
        }

        let wanted = selected_id.filter(|id| self.surface.get(id).is_some());
        let active = self.surface.active_ids();
        match wanted {
            Some(id) => {
                if active.len() != 1 || active[0] != id {
                    self.surface.set_active(id);
                    report.selection_changed = true;
                }
            }
            None => {
                if !active.is_empty() {
                    self.surface.discard_active();
                    report.selection_changed = true;
                }
            }
        }

        if !report.is_noop() {
            log::debug!("Sync pass: {:?}", report);
        }
        self.surface.request_render();
        report
    }

    fn upsert(
        &mut self,
        annotation: &Annotation,
        selected: bool,
        interactive: bool,
        report: &mut SyncReport,
    ) {
        match self.surface.get(&annotation.id).map(|d| d.label) {
            None => {
                let drawable = self.build(annotation, selected, interactive);
                self.surface.add(drawable);
                report.created += 1;
                return;
            }
            Some(label) if label != annotation.label => {
                // Caption and colors are baked in at build time. The new
                // drawable takes the old one's slot in the z-order.
                let drawable = self.build(annotation, selected, interactive);
                if let Some(slot) = self.surface.get_mut(&annotation.id) {
                    *slot = drawable;
                }
                report.rebuilt += 1;
                return;
            }
            Some(_) => {}
        }

        let target = self.projection.to_canvas(&annotation.bbox);
        let tolerance = self.tolerance;
        let Some(existing) = self.surface.get_mut(&annotation.id) else {
            return;
        };
        if existing.bounds().max_delta(&target) > tolerance {
            existing.fit_to(&target);
            report.resized += 1;
        }
        if apply_style(existing, annotation.label, selected, interactive) {
            report.restyled += 1;
        }
    }

    fn build(&self, annotation: &Annotation, selected: bool, interactive: bool) -> Drawable {
        let mut drawable = self.factory.create(annotation, &self.projection);
        apply_style(&mut drawable, annotation.label, selected, interactive);
        drawable
    }
}

impl<S: Surface> Drop for CanvasSync<S> {
    fn drop(&mut self) {
        self.surface.dispose();
    }
}

/// Selection highlight and interactivity. Returns true if anything changed.
fn apply_style(drawable: &mut Drawable, label: Label, selected: bool, interactive: bool) -> bool {
    let color = if selected {
        constants::SELECTION_COLOR
    } else {
        label.color()
    };

    let mut changed = false;
    let props = &mut drawable.props;
    if props.border_color != color || props.corner_color != color {
        props.border_color = color;
        props.corner_color = color;
        changed = true;
    }
    if props.corner_stroke_color != constants::CORNER_STROKE_COLOR {
        props.corner_stroke_color = constants::CORNER_STROKE_COLOR;
        changed = true;
    }
    changed |= props.set_interactive(interactive);

    if let DrawableKind::Rect(rect) = &mut drawable.kind {
        let width = if selected {
            stroke::SELECTED_WIDTH
        } else {
            stroke::WIDTH
        };
        if rect.stroke_width != width {
            rect.stroke_width = width;
            changed = true;
        }
    }
    changed
}
