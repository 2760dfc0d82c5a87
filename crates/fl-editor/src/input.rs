//! Input abstraction layer.
//!
//! Normalizes DOM mouse/pointer/wheel notifications into a single
//! `InputEvent` enum consumed by the interaction engine. Coordinates are
//! page (screen) pixels.

/// Which button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, button: PointerButton },

    PointerMove { x: f64, y: f64 },

    PointerUp { x: f64, y: f64, button: PointerButton },

    /// One wheel notification. Only the sign of `delta_y` matters.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// Pointer left the canvas or the gesture was cancelled by the platform.
    PointerLeave,

    /// Secondary-button context menu request.
    ContextMenu,
}

impl InputEvent {
    pub fn from_pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
        }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64, button: i16) -> Self {
        Self::PointerUp {
            x,
            y,
            button: PointerButton::from_dom(button),
        }
    }

    /// Extract position if this is a positional event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some((*x, *y)),
            Self::PointerLeave | Self::ContextMenu => None,
        }
    }
}
