//! WASM bridge for FL: exposes the canvas engine to the browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards DOM events
//! to [`FlCanvas`], sends the requests it returns with [`send_request`], and
//! hands the answers back with `apply_response` / `fail_request`.

mod client;
mod logger;
mod render2d;

pub use client::send_request;

use fl_core::config::CanvasConfig;
use fl_core::error::ServiceError;
use fl_core::id::{DemandId, FacilityId};
use fl_core::model::{PointKind, PointRef};
use fl_core::protocol::{Mode, Params};
use fl_editor::engine::{EngineEvent, InteractionEngine, Outcome};
use fl_editor::input::InputEvent;
use fl_editor::sync::{PendingRequest, SyncEngine, SyncOutcome};
use fl_render::theme::Theme;
use kurbo::Rect;
use serde_json::json;
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// Holds the interaction engine (view, gesture, hover) and the sync engine
/// (points, solver state). All interaction from the page goes through it.
#[wasm_bindgen]
pub struct FlCanvas {
    view: InteractionEngine,
    sync: SyncEngine,
    /// Dark mode flag: `true` = dark (default), `false` = light.
    dark_mode: bool,
}

#[wasm_bindgen]
impl FlCanvas {
    /// Create a controller for a canvas element at the given page rectangle.
    #[wasm_bindgen(constructor)]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::build(left, top, width, height, CanvasConfig::default())
    }

    /// Like the constructor, with a `CanvasConfig` JSON object. Missing
    /// fields keep their defaults.
    pub fn with_config(left: f64, top: f64, width: f64, height: f64, config_json: &str) -> Result<FlCanvas, JsValue> {
        let config = CanvasConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::build(left, top, width, height, config))
    }

    /// The canvas element moved or was resized.
    pub fn set_canvas_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.view
            .set_canvas_rect(Rect::new(left, top, left + width, top + height));
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// `debug`, `info`, ... Returns `false` for an unknown level.
    pub fn set_log_level(&mut self, level: &str) -> bool {
        match log::LevelFilter::from_str(level) {
            Ok(filter) => {
                logger::init(filter);
                true
            }
            Err(_) => false,
        }
    }

    // ─── Settings ────────────────────────────────────────────────────────

    /// Select the kind of point placed by the next click: `demand` or `facility`.
    pub fn set_point_type(&mut self, name: &str) -> bool {
        match PointKind::from_name(name) {
            Some(kind) => {
                self.view.selected_kind = kind;
                true
            }
            None => false,
        }
    }

    pub fn get_point_type(&self) -> String {
        self.view.selected_kind.name().to_string()
    }

    /// `online` or `offline`.
    pub fn set_mode(&mut self, name: &str) -> bool {
        match Mode::from_name(name) {
            Some(mode) => {
                self.sync.set_mode(mode);
                true
            }
            None => false,
        }
    }

    pub fn get_mode(&self) -> String {
        self.sync.mode.name().to_string()
    }

    /// Replace solver parameters from JSON. Returns `{"ok":true}` or
    /// `{"ok":false,"error":"..."}`.
    pub fn set_params(&mut self, json: &str) -> String {
        let result = Params::from_json(json).and_then(|p| self.sync.set_params(p));
        match result {
            Ok(()) => json!({ "ok": true }).to_string(),
            Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
        }
    }

    pub fn get_params(&self) -> String {
        serde_json::to_string(self.sync.params()).unwrap_or_default()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `{"redraw", "preventDefault", "changed"}`.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64, button: i16) -> String {
        let outcome = self.input(InputEvent::from_pointer_down(x, y, button));
        let (changed, _) = self.dispatch(&outcome);
        outcome_json(&outcome, changed, None)
    }

    /// Returns `true` if the canvas needs a redraw.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.input(InputEvent::from_pointer_move(x, y)).redraw
    }

    /// Returns `{"redraw", "preventDefault", "changed", "request"}`, where
    /// `request` is `{"seq","endpoint","body"}` or `null`.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64, button: i16) -> String {
        let outcome = self.input(InputEvent::from_pointer_up(x, y, button));
        let (changed, request) = self.dispatch(&outcome);
        outcome_json(&outcome, changed, request.as_ref())
    }

    /// One wheel notification. Always call `preventDefault()` on the event.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.input(InputEvent::Wheel { x, y, delta_y }).redraw
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.input(InputEvent::PointerLeave).redraw
    }

    /// Returns `true`: the browser context menu is always suppressed.
    pub fn handle_context_menu(&mut self) -> bool {
        self.input(InputEvent::ContextMenu).prevent_default
    }

    // ─── Points ──────────────────────────────────────────────────────────

    /// Delete a point by kind and id (marker UI). Returns `true` if removed.
    pub fn remove_point(&mut self, kind: &str, id: u32) -> bool {
        let target = match PointKind::from_name(kind) {
            Some(PointKind::Demand) => PointRef::Demand(DemandId(u64::from(id))),
            Some(PointKind::Facility) => PointRef::Facility(FacilityId(u64::from(id))),
            None => return false,
        };
        let removed = self.sync.remove_point(target);
        self.view.forget_missing(&self.sync.points);
        removed
    }

    /// Current demands and facilities in wire format.
    pub fn get_points(&self) -> String {
        serde_json::to_string(&self.sync.points).unwrap_or_default()
    }

    // ─── Service responses ───────────────────────────────────────────────

    /// Deliver the body returned for request `seq`. Returns
    /// `{"outcome": "adopted"|"noop"|"stale"|"failed", "error"?}`.
    pub fn apply_response(&mut self, seq: u32, body: &str) -> String {
        let outcome = self.sync.receive_body(u64::from(seq), body);
        self.view.forget_missing(&self.sync.points);
        sync_outcome_json(&outcome)
    }

    /// Deliver a failure for request `seq`: a `ServiceError` JSON string as
    /// rejected by `send_request`, or any plain message.
    pub fn fail_request(&mut self, seq: u32, error: &str) -> String {
        let error = serde_json::from_str::<ServiceError>(error)
            .unwrap_or_else(|_| ServiceError::Transport(error.to_string()));
        let outcome = self.sync.receive(u64::from(seq), Err(error));
        sync_outcome_json(&outcome)
    }

    pub fn dismiss_error(&mut self) {
        self.sync.dismiss_error();
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let theme = if self.dark_mode {
            Theme::dark()
        } else {
            Theme::light()
        };
        let frame = self.view.frame(&self.sync.points, &theme);
        render2d::render_frame(ctx, &frame)
    }

    /// Page positions of every marker, for HTML labels.
    pub fn get_overlays(&self) -> String {
        serde_json::to_string(&self.view.overlays(&self.sync.points)).unwrap_or_default()
    }

    /// Zoom, offset, solver state and the pending error, as JSON.
    pub fn get_status(&self) -> String {
        let view = self.view.status();
        json!({
            "zoomPercent": view.zoom_percent,
            "offsetX": view.offset_x,
            "offsetY": view.offset_y,
            "pointType": self.view.selected_kind,
            "mode": self.sync.mode,
            "busy": self.sync.is_busy(),
            "error": self.sync.last_error().map(ToString::to_string),
            "costs": self.sync.costs,
            "coin": self.sync.coin,
            "coinHistory": self.sync.coin_history().collect::<Vec<_>>(),
        })
        .to_string()
    }

    pub fn reset_view(&mut self) {
        self.view.reset_view();
    }

    pub fn get_service_url(&self) -> String {
        self.view.config.service_url.clone()
    }

    pub fn get_request_timeout_ms(&self) -> u32 {
        self.view.config.request_timeout_ms
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl FlCanvas {
    fn build(left: f64, top: f64, width: f64, height: f64, config: CanvasConfig) -> Self {
        console_error_panic_hook_setup();
        logger::init(log::LevelFilter::Info);

        let sync = SyncEngine::new(&config);
        let view = InteractionEngine::new(Rect::new(left, top, left + width, top + height), config);
        Self {
            view,
            sync,
            dark_mode: true,
        }
    }

    fn input(&mut self, event: InputEvent) -> Outcome {
        self.view.handle(&event, &self.sync.points)
    }

    /// Apply engine events to the point sets. Returns (points changed,
    /// request to send).
    fn dispatch(&mut self, outcome: &Outcome) -> (bool, Option<PendingRequest>) {
        let mut changed = false;
        let mut request = None;
        for event in &outcome.events {
            match *event {
                EngineEvent::AddPoint { kind, at } => {
                    changed = true;
                    if let Some(r) = self.sync.add_point(kind, at) {
                        request = Some(r);
                    }
                }
                EngineEvent::RemovePoint(target) => {
                    changed |= self.sync.remove_point(target);
                }
            }
        }
        if changed {
            self.view.forget_missing(&self.sync.points);
        }
        (changed, request)
    }
}

fn outcome_json(outcome: &Outcome, changed: bool, request: Option<&PendingRequest>) -> String {
    let request = request.map(|r| {
        json!({
            "seq": r.seq,
            "endpoint": r.endpoint.path(),
            "body": r.body.to_string(),
        })
    });
    json!({
        "redraw": outcome.redraw || changed,
        "preventDefault": outcome.prevent_default,
        "changed": changed,
        "request": request,
    })
    .to_string()
}

fn sync_outcome_json(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Adopted => json!({ "outcome": "adopted" }),
        SyncOutcome::NoOp => json!({ "outcome": "noop" }),
        SyncOutcome::Stale => json!({ "outcome": "stale" }),
        SyncOutcome::Failed(e) => json!({ "outcome": "failed", "error": e.to_string() }),
    }
    .to_string()
}

pub(crate) fn error_json(error: &ServiceError) -> String {
    serde_json::to_string(error).unwrap_or_else(|_| error.to_string())
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}
