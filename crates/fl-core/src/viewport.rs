//! Pan/zoom state and the screen ↔ world coordinate transform.
//!
//! Screen coordinates are page pixels; the canvas element's top-left corner
//! sits at `origin` in that space. World coordinates are where points live.
//! Nothing here is cached: every conversion reads the current offset/zoom.

use kurbo::{Affine, Point, Rect, Size, Vec2};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom multiplier for one wheel tick towards the user (`delta_y < 0`).
pub const ZOOM_IN_STEP: f64 = 1.1;
/// Zoom multiplier for one wheel tick away from the user (`delta_y > 0`).
pub const ZOOM_OUT_STEP: f64 = 0.9;

/// The live world → screen mapping of one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas-local pixel position of the world origin.
    pub offset: Vec2,
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(offset: Vec2, zoom: f64) -> Self {
        Self {
            offset,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Screen point → world point.
    pub fn to_world(&self, screen: Point, origin: Point) -> Point {
        Point::new(
            (screen.x - origin.x - self.offset.x) / self.zoom,
            (screen.y - origin.y - self.offset.y) / self.zoom,
        )
    }

    /// World point → screen point. Exact inverse of [`Viewport::to_world`].
    pub fn to_screen(&self, world: Point, origin: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.offset.x + origin.x,
            world.y * self.zoom + self.offset.y + origin.y,
        )
    }

    /// Canvas-local world → pixel affine (no origin term).
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Zoom one wheel tick around `cursor` (canvas-local pixels).
    ///
    /// The world point under the cursor stays under the cursor. Returns
    /// `true` if the viewport changed.
    pub fn apply_wheel(&mut self, delta_y: f64, cursor: Point) -> bool {
        let step = if delta_y > 0.0 {
            ZOOM_OUT_STEP
        } else if delta_y < 0.0 {
            ZOOM_IN_STEP
        } else {
            return false;
        };
        let new_zoom = (self.zoom * step).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return false;
        }
        let ratio = new_zoom / self.zoom;
        let c = cursor.to_vec2();
        self.offset = c - (c - self.offset) * ratio;
        self.zoom = new_zoom;
        true
    }

    /// Pan by a screen-space delta. Panning is unbounded.
    pub fn apply_pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// World rectangle covered by a canvas of `size` pixels.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        let x0 = -self.offset.x / self.zoom;
        let y0 = -self.offset.y / self.zoom;
        Rect::new(
            x0,
            y0,
            x0 + size.width / self.zoom,
            y0 + size.height / self.zoom,
        )
    }

    /// Zoom as a whole percentage, for status readouts.
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }
}
