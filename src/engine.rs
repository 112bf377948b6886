//! The editor instance: one per open card side.
//!
//! `EngineCore` owns the element mirror, the interaction session, the
//! coalescer and the clipboard. Host events come in through the `on_*`
//! handlers and command methods; each returns the [`Action`]s the host must
//! carry out (re-render, create/delete in the backing store, report selection
//! or canvas size). Element updates are the exception: they are written
//! through the [`Persistence`] collaborator by the coalescer.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clipboard::{Clipboard, duplicate};
use crate::coalescer::{Coalescer, Persistence};
use crate::config::EditorFlags;
use crate::constraints::{ConstraintKind, LayoutConstraint, resolve_canvas_resize, with_constraint, without_constraint};
use crate::element::{ElementId, ElementKind, ElementPatch, ElementRecord};
use crate::error::{FailedUpdate, FlushError};
use crate::geometry::{
    CanvasSize, clamp_into_canvas, dragged, normalize_rotation, resized, resized_canvas, sanitize_record,
};
use crate::hit::{Hit, HitPart, hit_test};
use crate::input::{Button, Cursor, InputState, Key, Modifiers, UiState};
use crate::keyboard::{Command, KeyContext, dispatch};
use crate::layers::{LayerOp, layer_patch};
use crate::store::ElementStore;
use crate::viewport::{Point, Viewport};

/// The host's undo/redo snapshot API.
///
/// The engine calls `save_state` with the element list as it was *before* a
/// discrete change (the first movement of a gesture, a delete, a paste, ...).
/// Undo and redo themselves stay in the host.
pub trait History {
    fn save_state(&mut self, elements: &[ElementRecord]);
}

/// History collaborator for hosts without undo.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl History for NoHistory {
    fn save_state(&mut self, _elements: &[ElementRecord]) {}
}

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A new element exists locally (paste, duplicate) and must be created in the backing store.
    ElementCreated { element: ElementRecord },
    /// The user asked for a new element of `kind`; the host creates it.
    AddElementRequested { kind: ElementKind },
    /// An element changed locally; re-render it. Persistence is handled by the coalescer.
    ElementUpdated { id: ElementId, fields: ElementPatch },
    /// An element was removed locally and must be deleted in the backing store.
    ElementDeleted { id: ElementId },
    /// The selection changed.
    ElementSelected { id: Option<ElementId> },
    /// The canvas size changed and must be stored on the card.
    CanvasSizeChanged { width: f64, height: f64 },
    /// Show the settings popover for an element.
    SettingsOpened { id: ElementId },
    /// Hide the settings popover.
    SettingsClosed,
    /// In-place text editing finished.
    TextEditEnded { id: ElementId, cancelled: bool },
    /// Pending updates were written.
    Flushed { count: usize },
    /// Some pending updates were rejected and dropped.
    PersistFailed { error: FlushError },
    /// Change the pointer cursor.
    SetCursor { cursor: Cursor },
    /// Redraw the canvas.
    RenderNeeded,
}

/// Core engine state: all logic that does not depend on the browser.
pub struct EngineCore<P: Persistence, H: History = NoHistory> {
    pub store: ElementStore,
    pub ui: UiState,
    pub input: InputState,
    pub viewport: Viewport,
    canvas: CanvasSize,
    flags: EditorFlags,
    coalescer: Coalescer,
    clipboard: Clipboard,
    cursor: Cursor,
    /// Whether the active gesture already recorded its undo snapshot.
    checkpointed: bool,
    persistence: P,
    history: H,
}

impl<P: Persistence> EngineCore<P, NoHistory> {
    /// Create an engine without undo support.
    #[must_use]
    pub fn new(persistence: P, canvas: CanvasSize) -> Self {
        Self::with_history(persistence, NoHistory, canvas)
    }
}

impl<P: Persistence, H: History> EngineCore<P, H> {
    /// Create an engine that reports undo snapshots to `history`.
    #[must_use]
    pub fn with_history(persistence: P, history: H, canvas: CanvasSize) -> Self {
        Self {
            store: ElementStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport: Viewport::default(),
            canvas: CanvasSize::clamped(canvas.width, canvas.height),
            flags: EditorFlags::default(),
            coalescer: Coalescer::new(),
            clipboard: Clipboard::new(),
            cursor: Cursor::Default,
            checkpointed: false,
            persistence,
            history,
        }
    }

    // --- Data inputs ---

    /// Replace the element mirror with a snapshot from the backing store.
    ///
    /// Pending local edits are discarded and any gesture in progress ends.
    pub fn load_elements(&mut self, elements: Vec<ElementRecord>) -> Vec<Action> {
        let canvas = self.canvas;
        let elements = elements.into_iter().map(|e| sanitize_record(e, canvas)).collect();
        self.store.replace(elements);
        self.coalescer.clear();
        self.input = InputState::Idle;
        self.checkpointed = false;
        info!(count = self.store.len(), "element snapshot loaded");

        let mut actions = Vec::new();
        if self.ui.selected_id.is_some_and(|id| !self.store.contains(&id)) {
            self.ui.selected_id = None;
            actions.push(Action::ElementSelected { id: None });
        }
        if self.ui.settings_open_for.is_some_and(|id| !self.store.contains(&id)) {
            self.ui.settings_open_for = None;
            actions.push(Action::SettingsClosed);
        }
        if self.ui.editing_id.is_some_and(|id| !self.store.contains(&id)) {
            self.ui.editing_id = None;
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply an element created by the host (e.g. after [`Action::AddElementRequested`]).
    pub fn apply_create(&mut self, element: ElementRecord) -> Vec<Action> {
        let element = sanitize_record(element, self.canvas);
        if self.store.contains(&element.id) {
            let id = element.id;
            self.store.mutate(&id, &full_patch(&element));
        } else {
            self.store.push(element);
        }
        vec![Action::RenderNeeded]
    }

    /// Apply an element deletion that happened outside the engine.
    ///
    /// A gesture on the deleted element stays open; its moves become no-ops.
    pub fn apply_delete(&mut self, id: &ElementId) -> Vec<Action> {
        if self.store.remove(id).is_none() {
            debug!(%id, "apply_delete: element not found");
            return Vec::new();
        }
        self.coalescer.discard(id);
        let mut actions = self.forget_ui_refs(id);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Set the canvas size of a freshly loaded card without running constraints.
    pub fn set_canvas(&mut self, width: f64, height: f64) {
        self.canvas = CanvasSize::clamped(width, height);
    }

    /// Replace the feature flags.
    pub fn set_flags(&mut self, flags: EditorFlags) {
        self.flags = flags.sanitized();
    }

    /// Update where the canvas sits on screen and its display scale.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // --- Selection ---

    /// Select an element, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> Vec<Action> {
        if let Some(id) = id {
            if !self.store.contains(&id) {
                debug!(%id, "select: element not found");
                return Vec::new();
            }
        }
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        let mut actions = vec![Action::ElementSelected { id }];
        if self.ui.settings_open_for.is_some() && self.ui.settings_open_for != id {
            self.ui.settings_open_for = None;
            actions.push(Action::SettingsClosed);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer input ---

    /// Start a drag, resize or canvas-resize session under `screen_pt`.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        if self.input.is_active() {
            debug!("pointer-down ignored: session already active");
            return Vec::new();
        }

        let pt = self.viewport.screen_to_canvas(screen_pt);
        let hit = hit_test(pt, &self.store, &self.viewport, self.canvas, self.ui.selected_id);
        let mut actions = Vec::new();

        if let Some(editing) = self.ui.editing_id {
            let inside = matches!(hit, Some(Hit::Element { id, part: HitPart::Body }) if id == editing);
            if !inside {
                actions.extend(self.end_text_edit());
            }
        }

        self.checkpointed = false;
        match hit {
            Some(Hit::Element { id, part: HitPart::ResizeHandle(anchor) }) => {
                let Some(element) = self.store.get(&id) else {
                    return actions;
                };
                self.input = InputState::Resizing {
                    id,
                    anchor,
                    start_pointer: pt,
                    start_geometry: element.geometry(),
                };
                actions.extend(self.set_cursor(anchor.cursor()));
            }
            Some(Hit::Element { id, part: HitPart::Body }) => {
                let Some(element) = self.store.get(&id) else {
                    return actions;
                };
                self.input = InputState::Dragging { id, start_pointer: pt, start_geometry: element.geometry() };
                actions.extend(self.select(Some(id)));
                actions.extend(self.set_cursor(Cursor::Move));
            }
            Some(Hit::CanvasGrip) => {
                self.input = InputState::CanvasResizing { start_pointer: pt, start_canvas: self.canvas };
                actions.extend(self.set_cursor(Cursor::ResizeNwse));
            }
            None => {
                actions.extend(self.select(None));
            }
        }
        actions
    }

    /// Advance the active session, or update the hover cursor when idle.
    pub fn on_pointer_move(&mut self, screen_pt: Point, now: Duration) -> Vec<Action> {
        let pt = self.viewport.screen_to_canvas(screen_pt);
        let mut actions = Vec::new();

        match self.input.clone() {
            InputState::Idle => {
                let cursor = match hit_test(pt, &self.store, &self.viewport, self.canvas, self.ui.selected_id) {
                    Some(Hit::Element { part: HitPart::ResizeHandle(anchor), .. }) => anchor.cursor(),
                    Some(Hit::Element { part: HitPart::Body, .. }) => Cursor::Move,
                    Some(Hit::CanvasGrip) => Cursor::ResizeNwse,
                    None => Cursor::Default,
                };
                actions.extend(self.set_cursor(cursor));
            }
            InputState::Dragging { id, start_pointer, start_geometry } => {
                let Some(element) = self.store.get(&id) else {
                    debug!(%id, "drag target vanished; ignoring move");
                    return actions;
                };
                let next = dragged(start_geometry, pt.delta_from(start_pointer), self.canvas, &self.flags);
                let patch = ElementPatch::geometry_diff(element.geometry(), next);
                self.commit(id, patch, now, &mut actions);
            }
            InputState::Resizing { id, anchor, start_pointer, start_geometry } => {
                let Some(element) = self.store.get(&id) else {
                    debug!(%id, "resize target vanished; ignoring move");
                    return actions;
                };
                // Handles sit on the rotated box; resize along its own axes.
                let delta = pt.delta_from(start_pointer).rotated(-element.rotation);
                let next = resized(start_geometry, anchor, delta, self.canvas, &self.flags);
                let patch = ElementPatch::geometry_diff(element.geometry(), next);
                self.commit(id, patch, now, &mut actions);
            }
            InputState::CanvasResizing { start_pointer, start_canvas } => {
                let next = resized_canvas(start_canvas, pt.delta_from(start_pointer), &self.flags);
                if next != self.canvas {
                    self.checkpoint();
                    self.apply_canvas_resize(next, now, &mut actions);
                }
            }
        }
        actions
    }

    /// Finish the active session at `screen_pt` and write its result immediately.
    pub fn on_pointer_up(&mut self, screen_pt: Point, now: Duration) -> Vec<Action> {
        if !self.input.is_active() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen_pt, now);
        actions.extend(self.end_session());
        actions
    }

    /// The pointer left the canvas: end the session as if it were released.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if !self.input.is_active() {
            return Vec::new();
        }
        self.end_session()
    }

    fn end_session(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.checkpointed = false;
        let mut actions = Vec::new();
        self.flush_into(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Keyboard ---

    /// Route a global key press to its command.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let ctx = KeyContext { typing: self.ui.typing() };
        let Some(command) = dispatch(key, modifiers, ctx) else {
            return Vec::new();
        };
        debug!(?command, "key command");
        match command {
            Command::DeleteSelected => self.delete_selected(),
            Command::CopySelected => {
                self.copy_selected();
                Vec::new()
            }
            Command::Paste => self.paste(),
            Command::ToggleSettings => self.toggle_settings(),
            Command::Escape => self.escape(),
            Command::Save => self.save(),
        }
    }

    fn escape(&mut self) -> Vec<Action> {
        if self.ui.settings_open_for.take().is_some() {
            return vec![Action::SettingsClosed];
        }
        if self.ui.editing_id.is_some() {
            return self.cancel_text_edit();
        }
        Vec::new()
    }

    // --- Element commands ---

    /// Ask the host to create a new element of `kind`. Closes the settings popover.
    pub fn request_add(&mut self, kind: ElementKind) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.settings_open_for.take().is_some() {
            actions.push(Action::SettingsClosed);
        }
        actions.push(Action::AddElementRequested { kind });
        actions
    }

    /// Apply an arbitrary edit from a content renderer (text, opacity, payload, ...).
    ///
    /// Geometry in the patch is clamped to the canvas and rotation wrapped.
    /// The write is debounced.
    pub fn edit_element(&mut self, id: &ElementId, mut patch: ElementPatch, now: Duration) -> Vec<Action> {
        let Some(element) = self.store.get(id) else {
            debug!(%id, "edit: element not found");
            return Vec::new();
        };
        if patch.layout_constraints.take().is_some() {
            debug!(%id, "edit: constraint changes go through add/remove_constraint; ignored");
        }
        let mut next = element.clone();
        next.apply(&patch);
        let clamped = clamp_into_canvas(next.geometry(), self.canvas);
        patch.merge(ElementPatch::geometry_diff(next.geometry(), clamped));
        if let Some(rotation) = patch.rotation {
            patch.rotation = Some(normalize_rotation(rotation));
        }
        if let Some(opacity) = patch.opacity {
            patch.opacity = Some(if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 });
        }

        let mut actions = Vec::new();
        self.begin_command();
        self.commit(*id, patch, now, &mut actions);
        actions
    }

    /// Rotate an element to `degrees` (wrapped into `[0, 360)`).
    pub fn rotate(&mut self, id: &ElementId, degrees: f64, now: Duration) -> Vec<Action> {
        self.edit_element(id, ElementPatch { rotation: Some(degrees), ..ElementPatch::default() }, now)
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        match self.ui.selected_id {
            Some(id) => self.delete_element(&id),
            None => Vec::new(),
        }
    }

    /// Delete an element locally and ask the host to delete it in the backing store.
    pub fn delete_element(&mut self, id: &ElementId) -> Vec<Action> {
        if !self.store.contains(id) {
            debug!(%id, "delete: element not found");
            return Vec::new();
        }
        self.history.save_state(self.store.elements());
        self.store.remove(id);
        self.coalescer.discard(id);

        let mut actions = vec![Action::ElementDeleted { id: *id }];
        actions.extend(self.forget_ui_refs(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Copy the selected element into the clipboard.
    pub fn copy_selected(&mut self) {
        if let Some(id) = self.ui.selected_id {
            self.copy(&id);
        }
    }

    /// Copy an element into the clipboard, replacing its previous contents.
    pub fn copy(&mut self, id: &ElementId) {
        match self.store.get(id) {
            Some(element) => self.clipboard.copy(element),
            None => debug!(%id, "copy: element not found"),
        }
    }

    /// Paste the clipboard as a new, selected element and flush.
    pub fn paste(&mut self) -> Vec<Action> {
        let Some(element) = self.clipboard.paste(self.store.elements(), self.canvas) else {
            return Vec::new();
        };
        self.insert_copy(element)
    }

    /// Add an offset copy of an element without touching the clipboard.
    pub fn duplicate(&mut self, id: &ElementId) -> Vec<Action> {
        let Some(source) = self.store.get(id) else {
            debug!(%id, "duplicate: element not found");
            return Vec::new();
        };
        let element = duplicate(source, self.store.elements(), self.canvas);
        self.insert_copy(element)
    }

    fn insert_copy(&mut self, element: ElementRecord) -> Vec<Action> {
        self.history.save_state(self.store.elements());
        let id = element.id;
        self.store.push(element.clone());

        let mut actions = vec![Action::ElementCreated { element }];
        actions.extend(self.select(Some(id)));
        self.flush_into(&mut actions);
        if !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Change an element's stacking order.
    pub fn layer(&mut self, id: &ElementId, op: LayerOp, now: Duration) -> Vec<Action> {
        let Some(patch) = layer_patch(op, id, self.store.elements()) else {
            debug!(%id, ?op, "layer: nothing to change");
            return Vec::new();
        };
        let mut actions = Vec::new();
        self.begin_command();
        self.commit(*id, patch, now, &mut actions);
        actions
    }

    // --- Constraints ---

    /// Attach a layout constraint, replacing any constraint it conflicts with.
    ///
    /// A scale rule is referenced to the canvas size at the moment it is set,
    /// whatever reference the caller supplied.
    pub fn add_constraint(&mut self, id: &ElementId, constraint: LayoutConstraint, now: Duration) -> Vec<Action> {
        let Some(element) = self.store.get(id) else {
            debug!(%id, "add_constraint: element not found");
            return Vec::new();
        };
        let constraint = match constraint {
            LayoutConstraint::ScaleWithCanvas { scale_x, scale_y, .. } => {
                LayoutConstraint::scale_with(self.canvas, scale_x, scale_y)
            }
            other => other,
        };
        let constraints = with_constraint(&element.layout_constraints, constraint);
        self.commit_constraints(*id, constraints, now)
    }

    /// Detach constraints of `kind`.
    pub fn remove_constraint(&mut self, id: &ElementId, kind: ConstraintKind, now: Duration) -> Vec<Action> {
        let Some(element) = self.store.get(id) else {
            debug!(%id, "remove_constraint: element not found");
            return Vec::new();
        };
        if !element.layout_constraints.iter().any(|c| c.kind() == kind) {
            return Vec::new();
        }
        let constraints = without_constraint(&element.layout_constraints, kind);
        self.commit_constraints(*id, constraints, now)
    }

    /// Detach every constraint from an element.
    pub fn clear_constraints(&mut self, id: &ElementId, now: Duration) -> Vec<Action> {
        match self.store.get(id) {
            Some(element) if !element.layout_constraints.is_empty() => self.commit_constraints(*id, Vec::new(), now),
            Some(_) => Vec::new(),
            None => {
                debug!(%id, "clear_constraints: element not found");
                Vec::new()
            }
        }
    }

    fn commit_constraints(&mut self, id: ElementId, constraints: Vec<LayoutConstraint>, now: Duration) -> Vec<Action> {
        let mut actions = Vec::new();
        self.begin_command();
        self.commit(id, ElementPatch::constraints(constraints), now, &mut actions);
        actions
    }

    // --- Canvas ---

    /// Resize the canvas to an explicit size (bounded to the allowed range).
    pub fn resize_canvas(&mut self, width: f64, height: f64, now: Duration) -> Vec<Action> {
        let next = CanvasSize::clamped(width, height);
        if next == self.canvas {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.begin_command();
        self.checkpoint();
        self.apply_canvas_resize(next, now, &mut actions);
        actions
    }

    fn apply_canvas_resize(&mut self, next: CanvasSize, now: Duration, actions: &mut Vec<Action>) {
        let old = self.canvas;
        self.canvas = next;
        for (id, patch) in resolve_canvas_resize(self.store.elements(), old, next) {
            self.store.mutate(&id, &patch);
            self.coalescer.update(id, patch.clone(), now);
            actions.push(Action::ElementUpdated { id, fields: patch });
        }
        debug!(width = next.width, height = next.height, "canvas resized");
        actions.push(Action::CanvasSizeChanged { width: next.width, height: next.height });
        actions.push(Action::RenderNeeded);
    }

    // --- Settings popover ---

    /// Open the settings popover for the selection, or close it if open.
    pub fn toggle_settings(&mut self) -> Vec<Action> {
        if self.ui.settings_open_for.take().is_some() {
            return vec![Action::SettingsClosed];
        }
        match self.ui.selected_id {
            Some(id) => {
                self.ui.settings_open_for = Some(id);
                vec![Action::SettingsOpened { id }]
            }
            None => Vec::new(),
        }
    }

    // --- Text editing ---

    /// Start in-place text editing of an element; selects it.
    pub fn begin_text_edit(&mut self, id: &ElementId) -> Vec<Action> {
        if !self.store.contains(id) {
            debug!(%id, "begin_text_edit: element not found");
            return Vec::new();
        }
        self.ui.editing_id = Some(*id);
        self.select(Some(*id))
    }

    /// Text editing lost focus: stop editing and write pending changes.
    pub fn end_text_edit(&mut self) -> Vec<Action> {
        self.finish_text_edit(false)
    }

    /// Escape from text editing: stop editing and write pending changes.
    pub fn cancel_text_edit(&mut self) -> Vec<Action> {
        self.finish_text_edit(true)
    }

    fn finish_text_edit(&mut self, cancelled: bool) -> Vec<Action> {
        let Some(id) = self.ui.editing_id.take() else {
            return Vec::new();
        };
        let mut actions = vec![Action::TextEditEnded { id, cancelled }];
        self.flush_into(&mut actions);
        actions
    }

    /// Tell the engine whether a host text field has keyboard focus.
    pub fn set_text_focus(&mut self, focused: bool) {
        self.ui.text_focus = focused;
    }

    // --- Persistence ---

    /// Fire the debounce timer if it has expired.
    pub fn tick(&mut self, now: Duration) -> Vec<Action> {
        match self.coalescer.poll(now, &mut self.persistence) {
            Some(Ok(count)) if count > 0 => vec![Action::Flushed { count }],
            Some(Err(error)) => vec![Action::PersistFailed { error }],
            Some(Ok(_)) | None => Vec::new(),
        }
    }

    /// Write pending updates now (save hotkey).
    pub fn save(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.flush_into(&mut actions);
        actions
    }

    /// Write pending updates now, returning the outcome directly.
    ///
    /// # Errors
    ///
    /// Returns [`FlushError`] listing rejected updates; they are not retried.
    pub fn force_flush(&mut self) -> Result<usize, FlushError> {
        self.coalescer.force_flush(&mut self.persistence)
    }

    /// Put rejected updates back in the queue (host retry policy).
    pub fn requeue(&mut self, failed: Vec<FailedUpdate>, now: Duration) {
        self.coalescer.requeue(failed, now);
    }

    /// End any gesture and write everything; call before discarding the editor.
    pub fn teardown(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.checkpointed = false;
        let mut actions = Vec::new();
        self.flush_into(&mut actions);
        actions
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&ElementRecord> {
        self.store.get(id)
    }

    /// All elements in list order.
    #[must_use]
    pub fn elements(&self) -> &[ElementRecord] {
        self.store.elements()
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn flags(&self) -> &EditorFlags {
        &self.flags
    }

    #[must_use]
    pub fn coalescer(&self) -> &Coalescer {
        &self.coalescer
    }

    #[must_use]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Whether local edits are waiting to be written.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.coalescer.has_pending()
    }

    #[must_use]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    // --- Internals ---

    /// Record an undo snapshot once per gesture or command.
    /// Start a discrete command's undo step, unless it lands inside a
    /// gesture that already owns one.
    fn begin_command(&mut self) {
        if !self.input.is_active() {
            self.checkpointed = false;
        }
    }

    fn checkpoint(&mut self) {
        if !self.checkpointed {
            self.history.save_state(self.store.elements());
            self.checkpointed = true;
        }
    }

    /// Apply a local change to the mirror and schedule its write.
    fn commit(&mut self, id: ElementId, patch: ElementPatch, now: Duration, actions: &mut Vec<Action>) {
        if patch.is_empty() {
            return;
        }
        self.checkpoint();
        if self.store.mutate(&id, &patch).is_none() {
            return;
        }
        self.coalescer.update(id, patch.clone(), now);
        actions.push(Action::ElementUpdated { id, fields: patch });
        actions.push(Action::RenderNeeded);
    }

    fn flush_into(&mut self, actions: &mut Vec<Action>) {
        match self.coalescer.force_flush(&mut self.persistence) {
            Ok(0) => {}
            Ok(count) => actions.push(Action::Flushed { count }),
            Err(error) => actions.push(Action::PersistFailed { error }),
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Option<Action> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor = cursor;
        Some(Action::SetCursor { cursor })
    }

    /// Drop selection, popover and editing references to a removed element.
    fn forget_ui_refs(&mut self, id: &ElementId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.selected_id == Some(*id) {
            self.ui.selected_id = None;
            actions.push(Action::ElementSelected { id: None });
        }
        if self.ui.settings_open_for == Some(*id) {
            self.ui.settings_open_for = None;
            actions.push(Action::SettingsClosed);
        }
        if self.ui.editing_id == Some(*id) {
            self.ui.editing_id = None;
        }
        actions
    }
}

impl<P: Persistence, H: History> Drop for EngineCore<P, H> {
    fn drop(&mut self) {
        if !self.coalescer.has_pending() {
            return;
        }
        if let Err(e) = self.coalescer.force_flush(&mut self.persistence) {
            warn!(error = %e, "pending updates lost at teardown");
        }
    }
}

/// Patch that overwrites every engine-owned field of `element`.
fn full_patch(element: &ElementRecord) -> ElementPatch {
    ElementPatch {
        rotation: Some(element.rotation),
        z_index: Some(element.z_index),
        opacity: Some(element.opacity),
        layout_constraints: Some(element.layout_constraints.clone()),
        payload: Some(element.payload.clone()),
        ..ElementPatch::geometry(element.geometry())
    }
}
