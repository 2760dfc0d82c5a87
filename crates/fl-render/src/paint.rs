//! Display list → Vello drawing commands.
//!
//! Call once per frame with a freshly-cleared `Scene`; the caller presents
//! it via wgpu. Geometry is painted under the frame's world transform, which
//! also scales stroke widths back up to their on-screen size.

use crate::scene::{DrawOp, Frame, Shape};
use fl_core::model::Color;
use kurbo::{Affine, Cap, Point, Rect, Stroke};
use peniko::{Color as PenikoColor, Fill};
use vello::Scene;

pub fn paint_frame(scene: &mut Scene, frame: &Frame) {
    let background = Rect::from_origin_size(Point::ORIGIN, frame.size);
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_peniko(frame.background),
        None,
        &background,
    );

    for op in &frame.ops {
        match op.shape {
            Shape::Line(line) => paint_shape(scene, frame.transform, &line, op),
            Shape::Circle(circle) => paint_shape(scene, frame.transform, &circle, op),
        }
    }
}

// ─── Fill and stroke ─────────────────────────────────────────────────────

fn paint_shape<S: kurbo::Shape>(scene: &mut Scene, transform: Affine, shape: &S, op: &DrawOp) {
    if let Some(fill) = op.fill {
        scene.fill(Fill::NonZero, transform, to_peniko(fill), None, shape);
    }
    if let Some(stroke) = op.stroke {
        let style = Stroke::new(stroke.width).with_caps(Cap::Round);
        scene.stroke(&style, transform, to_peniko(stroke.color), None, shape);
    }
}

fn to_peniko(c: Color) -> PenikoColor {
    let [r, g, b, a] = c.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneInput, build_frame};
    use crate::theme::Theme;
    use fl_core::config::CanvasConfig;
    use fl_core::id::{DemandId, FacilityId};
    use fl_core::model::{Demand, Facility, Location, PointKind, PointSet};
    use fl_core::viewport::Viewport;
    use kurbo::Size;

    fn frame(points: &PointSet) -> Frame {
        let config = CanvasConfig::default();
        let theme = Theme::light();
        build_frame(&SceneInput {
            viewport: &Viewport::default(),
            size: Size::new(400.0, 300.0),
            points,
            hovered: None,
            selected_kind: PointKind::Facility,
            config: &config,
            theme: &theme,
        })
    }

    #[test]
    fn markers_add_paths_to_the_scene() {
        let mut empty = Scene::new();
        paint_frame(&mut empty, &frame(&PointSet::new()));

        let points = PointSet {
            demands: vec![Demand::new(DemandId(0), Location::new(50.0, 50.0))],
            facilities: vec![Facility::new(FacilityId(0), Location::new(200.0, 100.0), 1.0)],
        };
        let mut full = Scene::new();
        paint_frame(&mut full, &frame(&points));

        assert!(empty.encoding().n_paths > 0);
        assert!(full.encoding().n_paths > empty.encoding().n_paths);
    }
}
