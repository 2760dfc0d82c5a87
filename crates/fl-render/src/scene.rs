//! Render pipeline: canvas state → backend-neutral display list.
//!
//! [`build_frame`] is a pure function. It is rebuilt from scratch on every
//! state change; there is no diffing. Ops come out in back-to-front order:
//!
//! 1. background (carried on the [`Frame`], not as an op)
//! 2. grid lines covering the visible world rectangle
//! 3. connection edges, facility → demand
//! 4. markers: facility circles, then demand crosses, hovered marker last
//!
//! Geometry is in world units under [`Frame::transform`]. Every stroke width
//! is already divided by the zoom factor so lines keep their on-screen
//! thickness once the backend applies the transform.

use crate::hit::{DemandShift, near_demand};
use crate::theme::Theme;
use fl_core::config::CanvasConfig;
use fl_core::model::{Color, Demand, Facility, PointKind, PointRef, PointSet};
use fl_core::viewport::Viewport;
use kurbo::{Affine, Circle, Line, Point, Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Grid,
    Connections,
    Markers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Line(Line),
    Circle(Circle),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// World units (screen width / zoom).
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOp {
    pub layer: Layer,
    pub shape: Shape,
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
    /// The point this op belongs to, for marker ops.
    pub point: Option<PointRef>,
}

/// One fully built frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Canvas size in pixels.
    pub size: Size,
    pub background: Color,
    /// World → canvas-pixel transform.
    pub transform: Affine,
    pub zoom: f64,
    /// Point type the next placement will create.
    pub selected_kind: PointKind,
    pub ops: Vec<DrawOp>,
}

impl Frame {
    pub fn ops_in(&self, layer: Layer) -> impl Iterator<Item = &DrawOp> + '_ {
        self.ops.iter().filter(move |op| op.layer == layer)
    }
}

/// Everything the pipeline reads.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub viewport: &'a Viewport,
    pub size: Size,
    pub points: &'a PointSet,
    pub hovered: Option<PointRef>,
    pub selected_kind: PointKind,
    pub config: &'a CanvasConfig,
    pub theme: &'a Theme,
}

/// Hovered markers are drawn this much larger.
const HOVER_SCALE: f64 = 1.5;
/// Highlight ring radius relative to the (enlarged) marker radius.
const RING_SCALE: f64 = 1.6;
const FACILITY_FILL_ALPHA: f32 = 0.25;

pub fn build_frame(input: &SceneInput<'_>) -> Frame {
    let zoom = input.viewport.zoom();
    let mut ops = Vec::new();

    push_grid(&mut ops, input);
    push_connections(&mut ops, input);

    let mut hovered_ops = Vec::new();
    for facility in &input.points.facilities {
        let target = if input.hovered == Some(PointRef::Facility(facility.id)) {
            &mut hovered_ops
        } else {
            &mut ops
        };
        push_facility(target, input, facility);
    }
    for demand in &input.points.demands {
        let target = if input.hovered == Some(PointRef::Demand(demand.id)) {
            &mut hovered_ops
        } else {
            &mut ops
        };
        push_demand(target, input, demand);
    }
    ops.append(&mut hovered_ops);

    log::trace!(
        "frame: {} ops, zoom {zoom:.3}, {} demands, {} facilities",
        ops.len(),
        input.points.demands.len(),
        input.points.facilities.len()
    );

    Frame {
        size: input.size,
        background: input.theme.background,
        transform: input.viewport.affine(),
        zoom,
        selected_kind: input.selected_kind,
        ops,
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// Grid lines that intersect the visible world rectangle, snapped to the
/// cell size. Never iterates beyond the window.
fn push_grid(ops: &mut Vec<DrawOp>, input: &SceneInput<'_>) {
    let zoom = input.viewport.zoom();
    let cell = input.config.grid_size;
    let visible = input.viewport.visible_world_rect(input.size);

    let start_x = (visible.x0 / cell).floor() * cell;
    let end_x = start_x + visible.width() + cell;
    let start_y = (visible.y0 / cell).floor() * cell;
    let end_y = start_y + visible.height() + cell;

    let stroke = Some(StrokeStyle {
        color: input.theme.grid,
        width: input.theme.grid_width / zoom,
    });
    let mut grid_line = |line: Line| {
        ops.push(DrawOp {
            layer: Layer::Grid,
            shape: Shape::Line(line),
            fill: None,
            stroke,
            point: None,
        })
    };

    let mut x = start_x;
    while x < end_x {
        grid_line(Line::new((x, start_y), (x, end_y)));
        x += cell;
    }
    let mut y = start_y;
    while y < end_y {
        grid_line(Line::new((start_x, y), (end_x, y)));
        y += cell;
    }
}

fn push_connections(ops: &mut Vec<DrawOp>, input: &SceneInput<'_>) {
    let stroke = Some(StrokeStyle {
        color: input.theme.connection,
        width: input.theme.connection_width / input.viewport.zoom(),
    });
    // `connections()` already drops ids of deleted demands.
    for (facility, demand) in input.points.connections() {
        ops.push(DrawOp {
            layer: Layer::Connections,
            shape: Shape::Line(Line::new(facility.location.to_point(), demand.location.to_point())),
            fill: None,
            stroke,
            point: None,
        });
    }
}

fn push_facility(ops: &mut Vec<DrawOp>, input: &SceneInput<'_>, facility: &Facility) {
    let point = PointRef::Facility(facility.id);
    let hovered = input.hovered == Some(point);
    let colocated = near_demand(input.points, facility.location, input.config.collision_tolerance);
    let color = if colocated {
        input.theme.colocated
    } else {
        input.theme.facility
    };
    let radius = marker_radius(input, hovered);
    let center = facility.location.to_point();

    ops.push(DrawOp {
        layer: Layer::Markers,
        shape: Shape::Circle(Circle::new(center, radius)),
        fill: Some(color.with_alpha(FACILITY_FILL_ALPHA)),
        stroke: Some(marker_stroke(input, color)),
        point: Some(point),
    });
    if hovered {
        push_ring(ops, input, center, radius, point);
    }
}

fn push_demand(ops: &mut Vec<DrawOp>, input: &SceneInput<'_>, demand: &Demand) {
    let point = PointRef::Demand(demand.id);
    let hovered = input.hovered == Some(point);
    // Sidestep the facility marker that would otherwise cover the cross.
    let center = DemandShift::new(input.config, input.viewport.zoom())
        .apply(input.points, demand.location)
        .to_point();
    let arm = marker_radius(input, hovered);
    let stroke = Some(marker_stroke(input, input.theme.demand));

    for (from, to) in [
        (Vec2::new(-arm, -arm), Vec2::new(arm, arm)),
        (Vec2::new(-arm, arm), Vec2::new(arm, -arm)),
    ] {
        ops.push(DrawOp {
            layer: Layer::Markers,
            shape: Shape::Line(Line::new(center + from, center + to)),
            fill: None,
            stroke,
            point: Some(point),
        });
    }
    if hovered {
        push_ring(ops, input, center, arm, point);
    }
}

fn push_ring(ops: &mut Vec<DrawOp>, input: &SceneInput<'_>, center: Point, radius: f64, point: PointRef) {
    ops.push(DrawOp {
        layer: Layer::Markers,
        shape: Shape::Circle(Circle::new(center, radius * RING_SCALE)),
        fill: None,
        stroke: Some(marker_stroke(input, input.theme.highlight)),
        point: Some(point),
    });
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Marker radius in world units; constant on screen.
fn marker_radius(input: &SceneInput<'_>, hovered: bool) -> f64 {
    let base = input.config.point_radius / input.viewport.zoom();
    if hovered { base * HOVER_SCALE } else { base }
}

fn marker_stroke(input: &SceneInput<'_>, color: Color) -> StrokeStyle {
    StrokeStyle {
        color,
        width: input.theme.marker_width / input.viewport.zoom(),
    }
}
