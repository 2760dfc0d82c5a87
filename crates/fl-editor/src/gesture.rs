//! Pointer gesture state machine.
//!
//! ```text
//! Idle ──down(primary, hit)──▶ Dragging(Pan)   ──move──▶ Pan(delta)
//! Idle ──down(primary, miss)─▶ Dragging(Place) ──up────▶ Place(at)
//! Idle ──down(secondary)─────▶ Idle, Remove(hit) if anything was hit
//! Dragging ──up / leave──────▶ Idle
//! ```
//!
//! Pan deltas are incremental: each move reports the distance from the
//! previous sample, and the anchor moves along with the pointer.

use crate::input::{InputEvent, PointerButton};
use fl_core::model::PointRef;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Pressed on an existing marker: drag moves the view.
    Pan,
    /// Pressed on empty space: release places a point.
    Place,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        /// Screen position of the last sample.
        anchor: Point,
    },
}

/// What a handled event asks the engine to do. At most one per event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Move the view by a screen-space delta.
    Pan(Vec2),
    /// Place a point at this screen position.
    Place(Point),
    /// Delete the point that was under the secondary button.
    Remove(PointRef),
}

#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Feed one event. `hit` is the point under the pointer at the tight
    /// click radius; it is only consulted on pointer-down.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<PointRef>) -> Option<GestureAction> {
        match (*event, self.state) {
            (InputEvent::PointerDown { x, y, button }, GestureState::Idle) => match button {
                PointerButton::Primary => {
                    let kind = if hit.is_some() { DragKind::Pan } else { DragKind::Place };
                    log::debug!("gesture start: {kind:?} at ({x}, {y})");
                    self.state = GestureState::Dragging {
                        kind,
                        anchor: Point::new(x, y),
                    };
                    None
                }
                PointerButton::Secondary => hit.map(GestureAction::Remove),
                PointerButton::Other => None,
            },
            // A second press mid-drag does not restart the gesture.
            (InputEvent::PointerDown { .. }, GestureState::Dragging { .. }) => None,

            (InputEvent::PointerMove { x, y }, GestureState::Dragging { kind, anchor }) => {
                if kind != DragKind::Pan {
                    return None;
                }
                let current = Point::new(x, y);
                let delta = current - anchor;
                self.state = GestureState::Dragging {
                    kind,
                    anchor: current,
                };
                (delta != Vec2::ZERO).then_some(GestureAction::Pan(delta))
            }

            (InputEvent::PointerUp { x, y, .. }, GestureState::Dragging { kind, .. }) => {
                self.state = GestureState::Idle;
                log::debug!("gesture end: {kind:?} at ({x}, {y})");
                match kind {
                    DragKind::Place => Some(GestureAction::Place(Point::new(x, y))),
                    DragKind::Pan => None,
                }
            }

            (InputEvent::PointerLeave, GestureState::Dragging { kind, .. }) => {
                log::debug!("gesture cancelled: {kind:?}");
                self.state = GestureState::Idle;
                None
            }

            _ => None,
        }
    }
}
