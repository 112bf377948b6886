//! WebAssembly entry points.
//!
//! The browser host owns one [`Engine`] per open card side. Data crosses the
//! boundary as JSON strings; every event method returns the resulting
//! [`Action`] list serialized as a JSON array. Timestamps are milliseconds
//! from the host's monotonic clock (`performance.now()`).
//!
//! Element updates are delivered through the `on_update(id, fieldsJson)`
//! callback passed to the constructor. Undo snapshots go to an optional
//! `on_save_state(elementsJson)` callback.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use js_sys::Function;
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use crate::coalescer::Persistence;
use crate::config::EditorFlags;
use crate::constraints::{ConstraintKind, LayoutConstraint};
use crate::element::{ElementId, ElementKind, ElementPatch, ElementRecord};
use crate::engine::{Action, EngineCore, History};
use crate::error::{BindingError, SinkError};
use crate::geometry::CanvasSize;
use crate::input::{Button, Key, Modifiers};
use crate::layers::LayerOp;
use crate::viewport::{Point, Viewport};

/// Forwards element writes to a JavaScript callback.
struct JsPersistence {
    on_update: Function,
}

impl Persistence for JsPersistence {
    fn update_element(&mut self, id: ElementId, fields: &ElementPatch) -> Result<(), SinkError> {
        let fields = serde_json::to_string(fields).map_err(|e| SinkError::new(e.to_string()))?;
        self.on_update
            .call2(&JsValue::NULL, &JsValue::from_str(&id.to_string()), &JsValue::from_str(&fields))
            .map(|_| ())
            .map_err(|e| SinkError::new(e.as_string().unwrap_or_else(|| "update callback threw".to_owned())))
    }
}

/// Forwards undo snapshots to an optional JavaScript callback.
#[derive(Default)]
struct JsHistory {
    on_save_state: Option<Function>,
}

impl History for JsHistory {
    fn save_state(&mut self, elements: &[ElementRecord]) {
        let Some(callback) = &self.on_save_state else {
            return;
        };
        match serde_json::to_string(elements) {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    warn!(error = ?e, "save_state callback threw");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize undo snapshot"),
        }
    }
}

/// Canvas editor handle exported to JavaScript.
#[wasm_bindgen]
pub struct Engine {
    core: EngineCore<JsPersistence, JsHistory>,
}

#[wasm_bindgen]
impl Engine {
    /// Create an editor for a canvas of `width` × `height` pixels.
    ///
    /// # Errors
    ///
    /// Fails if `flags_json` is not a valid flags object.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, flags_json: &str, on_update: Function) -> Result<Engine, JsValue> {
        let flags = EditorFlags::from_json(flags_json).map_err(|e| js_err(BindingError::from(e)))?;
        let mut core =
            EngineCore::with_history(JsPersistence { on_update }, JsHistory::default(), CanvasSize::clamped(width, height));
        core.set_flags(flags);
        Ok(Self { core })
    }

    /// Register the undo snapshot callback.
    pub fn set_history(&mut self, on_save_state: Function) {
        self.core.history_mut().on_save_state = Some(on_save_state);
    }

    // --- Data ---

    /// Replace all elements from a JSON array.
    ///
    /// # Errors
    ///
    /// Fails if `json` is not an array of element records.
    pub fn load_elements(&mut self, json: &str) -> Result<String, JsValue> {
        let elements: Vec<ElementRecord> =
            serde_json::from_str(json).map_err(|e| js_err(BindingError::Elements(e)))?;
        actions_json(&self.core.load_elements(elements))
    }

    /// Apply an element created by the host.
    ///
    /// # Errors
    ///
    /// Fails if `json` is not an element record.
    pub fn apply_create(&mut self, json: &str) -> Result<String, JsValue> {
        let element: ElementRecord = serde_json::from_str(json).map_err(|e| js_err(BindingError::Elements(e)))?;
        actions_json(&self.core.apply_create(element))
    }

    /// Apply a deletion made outside the editor.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn apply_delete(&mut self, id: &str) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.apply_delete(&id))
    }

    /// Replace the feature flags.
    ///
    /// # Errors
    ///
    /// Fails if `json` is not a valid flags object.
    pub fn set_flags(&mut self, json: &str) -> Result<(), JsValue> {
        let flags = EditorFlags::from_json(json).map_err(|e| js_err(BindingError::from(e)))?;
        self.core.set_flags(flags);
        Ok(())
    }

    pub fn set_viewport(&mut self, origin_x: f64, origin_y: f64, scale: f64) {
        self.core.set_viewport(Viewport::new(origin_x, origin_y, scale));
    }

    /// Set the canvas size of a freshly loaded card.
    pub fn set_canvas(&mut self, width: f64, height: f64) {
        self.core.set_canvas(width, height);
    }

    // --- Pointer and keyboard ---

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> Result<String, JsValue> {
        actions_json(&self.core.on_pointer_down(Point::new(x, y), Button::from_dom(button)))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> Result<String, JsValue> {
        actions_json(&self.core.on_pointer_move(Point::new(x, y), ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn pointer_up(&mut self, x: f64, y: f64, now_ms: f64) -> Result<String, JsValue> {
        actions_json(&self.core.on_pointer_up(Point::new(x, y), ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn pointer_leave(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.on_pointer_leave())
    }

    /// Handle a `keydown` event. `key` is `KeyboardEvent.key`.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> Result<String, JsValue> {
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        actions_json(&self.core.on_key_down(&Key::new(key), modifiers))
    }

    /// Drive the debounce timer; call from `requestAnimationFrame` or an interval.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn tick(&mut self, now_ms: f64) -> Result<String, JsValue> {
        actions_json(&self.core.tick(ms(now_ms)))
    }

    // --- Commands ---

    /// Select an element by id, or clear the selection with `undefined`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn select(&mut self, id: Option<String>) -> Result<String, JsValue> {
        let id = id.as_deref().map(parse_id).transpose()?;
        actions_json(&self.core.select(id))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn delete_selected(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.delete_selected())
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn delete_element(&mut self, id: &str) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.delete_element(&id))
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn copy(&mut self, id: &str) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        self.core.copy(&id);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn paste(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.paste())
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn duplicate(&mut self, id: &str) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.duplicate(&id))
    }

    /// Change stacking order. `op` is `raise`, `lower`, `bring-to-front` or `send-to-back`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a UUID or `op` is unknown.
    pub fn layer(&mut self, id: &str, op: &str, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let op: LayerOp = parse_keyword("layer operation", op)?;
        actions_json(&self.core.layer(&id, op, ms(now_ms)))
    }

    /// Ask the host to create an element of `kind` (e.g. `text`, `multiple-choice`).
    ///
    /// # Errors
    ///
    /// Fails if `kind` is unknown.
    pub fn request_add(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind: ElementKind = parse_keyword("element kind", kind)?;
        actions_json(&self.core.request_add(kind))
    }

    /// Apply a renderer edit given as a JSON patch.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a UUID or `patch_json` is not a patch object.
    pub fn edit_element(&mut self, id: &str, patch_json: &str, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| js_err(BindingError::Patch(e)))?;
        actions_json(&self.core.edit_element(&id, patch, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn rotate(&mut self, id: &str, degrees: f64, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.rotate(&id, degrees, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID or `constraint_json` is not a constraint.
    pub fn add_constraint(&mut self, id: &str, constraint_json: &str, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let constraint: LayoutConstraint =
            serde_json::from_str(constraint_json).map_err(|e| js_err(BindingError::Constraint(e)))?;
        actions_json(&self.core.add_constraint(&id, constraint, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID or `kind_json` is not a constraint kind.
    pub fn remove_constraint(&mut self, id: &str, kind_json: &str, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let kind: ConstraintKind =
            serde_json::from_str(kind_json).map_err(|e| js_err(BindingError::Constraint(e)))?;
        actions_json(&self.core.remove_constraint(&id, kind, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn clear_constraints(&mut self, id: &str, now_ms: f64) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.clear_constraints(&id, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn resize_canvas(&mut self, width: f64, height: f64, now_ms: f64) -> Result<String, JsValue> {
        actions_json(&self.core.resize_canvas(width, height, ms(now_ms)))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn toggle_settings(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.toggle_settings())
    }

    /// # Errors
    ///
    /// Fails if `id` is not a UUID.
    pub fn begin_text_edit(&mut self, id: &str) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        actions_json(&self.core.begin_text_edit(&id))
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn end_text_edit(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.end_text_edit())
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn cancel_text_edit(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.cancel_text_edit())
    }

    pub fn set_text_focus(&mut self, focused: bool) {
        self.core.set_text_focus(focused);
    }

    /// Write pending updates now.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn flush(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.save())
    }

    /// End any gesture and write pending updates; call before `free()`.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn teardown(&mut self) -> Result<String, JsValue> {
        actions_json(&self.core.teardown())
    }

    // --- Queries ---

    /// All elements as a JSON array.
    ///
    /// # Errors
    ///
    /// Fails only if the elements cannot be serialized.
    pub fn elements_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.core.elements()).map_err(js_err)
    }

    #[must_use]
    pub fn selection(&self) -> Option<String> {
        self.core.selection().map(|id| id.to_string())
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.core.has_pending_changes()
    }

    #[must_use]
    pub fn canvas_width(&self) -> f64 {
        self.core.canvas().width
    }

    #[must_use]
    pub fn canvas_height(&self) -> f64 {
        self.core.canvas().height
    }
}

fn ms(now_ms: f64) -> Duration {
    Duration::try_from_secs_f64(now_ms / 1000.0).unwrap_or_default()
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn actions_json(actions: &[Action]) -> Result<String, JsValue> {
    serde_json::to_string(actions).map_err(js_err)
}

fn parse_id(raw: &str) -> Result<ElementId, JsValue> {
    Uuid::from_str(raw).map_err(|e| js_err(BindingError::from(e)))
}

/// Parse a bare kebab-case keyword into one of the serde enums.
fn parse_keyword<T: DeserializeOwned>(what: &'static str, raw: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(raw.to_owned()))
        .map_err(|_| js_err(BindingError::Keyword { what, value: raw.to_owned() }))
}
