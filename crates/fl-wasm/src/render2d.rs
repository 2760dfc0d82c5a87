//! Canvas2D software renderer.
//!
//! Replays a display list on an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. The frame's world transform is installed once,
//! so geometry and line widths are given in world units.

use fl_render::scene::{DrawOp, Frame, Shape};
use std::f64::consts::TAU;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Paint one frame, replacing whatever the canvas showed before.
pub fn render_frame(ctx: &CanvasRenderingContext2d, frame: &Frame) -> Result<(), JsValue> {
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.set_fill_style_str(&frame.background.to_css());
    ctx.fill_rect(0.0, 0.0, frame.size.width, frame.size.height);

    let [a, b, c, d, e, f] = frame.transform.as_coeffs();
    ctx.set_transform(a, b, c, d, e, f)?;
    ctx.set_line_cap("round");
    for op in &frame.ops {
        draw_op(ctx, op)?;
    }
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
}

fn draw_op(ctx: &CanvasRenderingContext2d, op: &DrawOp) -> Result<(), JsValue> {
    ctx.begin_path();
    match op.shape {
        Shape::Line(line) => {
            ctx.move_to(line.p0.x, line.p0.y);
            ctx.line_to(line.p1.x, line.p1.y);
        }
        Shape::Circle(circle) => {
            ctx.arc(circle.center.x, circle.center.y, circle.radius, 0.0, TAU)?;
        }
    }
    if let Some(fill) = op.fill {
        ctx.set_fill_style_str(&fill.to_css());
        ctx.fill();
    }
    if let Some(stroke) = op.stroke {
        ctx.set_stroke_style_str(&stroke.color.to_css());
        ctx.set_line_width(stroke.width);
        ctx.stroke();
    }
    Ok(())
}
