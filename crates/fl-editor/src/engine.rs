//! Interaction engine: one canvas session's viewport, gesture and hover.
//!
//! The engine turns normalized input into viewport mutations and domain
//! events. It never touches point data; add/remove requests are handed back
//! to the caller (usually the [`SyncEngine`](crate::sync::SyncEngine)).

use crate::gesture::{GestureAction, GestureMachine};
use crate::input::{InputEvent, PointerButton};
use fl_core::config::CanvasConfig;
use fl_core::model::{Location, PointKind, PointRef, PointSet};
use fl_core::viewport::Viewport;
use fl_render::hit::{DemandShift, hit_test};
use fl_render::overlay::{MarkerOverlay, marker_overlays};
use fl_render::scene::{Frame, SceneInput, build_frame};
use fl_render::theme::Theme;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// A request for the application layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Place a point of `kind` at `at` (world units, already rounded).
    AddPoint { kind: PointKind, at: Location },
    RemovePoint(PointRef),
}

/// Result of handling one input event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub events: SmallVec<[EngineEvent; 1]>,
    /// Viewport or hover changed; the canvas should be redrawn.
    pub redraw: bool,
    /// The host should call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
}

/// Readout for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStatus {
    pub zoom_percent: i64,
    pub offset_x: i64,
    pub offset_y: i64,
}

pub struct InteractionEngine {
    /// Pan/zoom of this canvas.
    pub viewport: Viewport,

    /// Kind placed by the next primary click on empty space.
    pub selected_kind: PointKind,

    pub config: CanvasConfig,

    /// Canvas element rectangle in page pixels.
    canvas: Rect,

    gesture: GestureMachine,

    hovered: Option<PointRef>,
}

impl InteractionEngine {
    pub fn new(canvas: Rect, config: CanvasConfig) -> Self {
        Self {
            viewport: Viewport::default(),
            selected_kind: PointKind::default(),
            config,
            canvas,
            gesture: GestureMachine::new(),
            hovered: None,
        }
    }

    /// Update after the canvas element moved or was resized.
    pub fn set_canvas_rect(&mut self, canvas: Rect) {
        self.canvas = canvas;
    }

    pub fn hovered(&self) -> Option<PointRef> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    // ─── Event handling ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, points: &PointSet) -> Outcome {
        let mut out = Outcome::default();
        match *event {
            InputEvent::PointerDown { x, y, button } => {
                let at = self.world_at(Point::new(x, y));
                let tol = self.config.click_tolerance(self.viewport.zoom());
                let hit = hit_test(points, at, tol, self.demand_shift());
                if button == PointerButton::Secondary {
                    out.prevent_default = true;
                }
                if let Some(GestureAction::Remove(target)) = self.gesture.handle(event, hit) {
                    log::debug!("remove requested: {target:?}");
                    out.events.push(EngineEvent::RemovePoint(target));
                }
            }

            InputEvent::PointerMove { x, y } => {
                // Hover first, against the viewport the user is looking at.
                out.redraw |= self.update_hover(Point::new(x, y), points);
                if let Some(GestureAction::Pan(delta)) = self.gesture.handle(event, None) {
                    self.viewport.apply_pan(delta);
                    log::trace!("pan {delta:?} -> offset {:?}", self.viewport.offset);
                    out.redraw = true;
                }
            }

            InputEvent::PointerUp { .. } => {
                if let Some(GestureAction::Place(screen)) = self.gesture.handle(event, None) {
                    if self.is_valid_drop(screen) {
                        let at = Location::from(self.to_world(screen)).rounded();
                        log::debug!("place {} at ({}, {})", self.selected_kind.name(), at.x, at.y);
                        out.events.push(EngineEvent::AddPoint {
                            kind: self.selected_kind,
                            at,
                        });
                    } else {
                        log::debug!("drop outside canvas at {screen:?} ignored");
                    }
                }
            }

            InputEvent::Wheel { x, y, delta_y } => {
                out.prevent_default = true;
                let screen = Point::new(x, y);
                let cursor = screen - self.canvas.origin().to_vec2();
                if self.viewport.apply_wheel(delta_y, cursor) {
                    log::trace!("zoom {} at {cursor:?}", self.viewport.zoom());
                    out.redraw = true;
                }
                out.redraw |= self.update_hover(screen, points);
            }

            InputEvent::PointerLeave => {
                self.gesture.handle(event, None);
                if self.hovered.take().is_some() {
                    out.redraw = true;
                }
            }

            InputEvent::ContextMenu => out.prevent_default = true,
        }
        out
    }

    // ─── View operations ─────────────────────────────────────────────────

    /// Back to offset (0, 0) and zoom 1.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Drop hover state that points at something no longer in `points`.
    pub fn forget_missing(&mut self, points: &PointSet) {
        if let Some(h) = self.hovered
            && !points.contains(h)
        {
            self.hovered = None;
        }
    }

    pub fn status(&self) -> ViewStatus {
        ViewStatus {
            zoom_percent: self.viewport.zoom_percent(),
            offset_x: self.viewport.offset.x.round() as i64,
            offset_y: self.viewport.offset.y.round() as i64,
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn frame(&self, points: &PointSet, theme: &Theme) -> Frame {
        build_frame(&SceneInput {
            viewport: &self.viewport,
            size: self.canvas.size(),
            points,
            hovered: self.hovered,
            selected_kind: self.selected_kind,
            config: &self.config,
            theme,
        })
    }

    pub fn overlays(&self, points: &PointSet) -> Vec<MarkerOverlay> {
        marker_overlays(&self.viewport, self.canvas.origin(), points, &self.config)
    }
}

impl InteractionEngine {
    fn to_world(&self, screen: Point) -> Point {
        self.viewport.to_world(screen, self.canvas.origin())
    }

    fn world_at(&self, screen: Point) -> Location {
        Location::from(self.to_world(screen))
    }

    fn demand_shift(&self) -> DemandShift {
        DemandShift::new(&self.config, self.viewport.zoom())
    }

    fn is_valid_drop(&self, screen: Point) -> bool {
        screen.x >= self.canvas.x0
            && screen.x <= self.canvas.x1
            && screen.y >= self.canvas.y0
            && screen.y <= self.canvas.y1
    }

    /// Returns `true` if the hovered point changed.
    fn update_hover(&mut self, screen: Point, points: &PointSet) -> bool {
        let tol = self.config.hover_tolerance(self.viewport.zoom());
        let next = hit_test(points, self.world_at(screen), tol, self.demand_shift());
        if next == self.hovered {
            return false;
        }
        log::trace!("hover {:?} -> {next:?}", self.hovered);
        self.hovered = next;
        true
    }
}
