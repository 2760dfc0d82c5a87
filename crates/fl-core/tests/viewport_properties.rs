//! Property tests: coordinate transform round-trip, cursor-anchored zoom,
//! and zoom clamping.

use fl_core::viewport::{MAX_ZOOM, MIN_ZOOM, Viewport};
use fl_core::{Point, Vec2};
use proptest::prelude::*;

fn close(a: Point, b: Point) -> bool {
    let scale = a.x.abs().max(a.y.abs()).max(1.0);
    (a - b).hypot() <= 1e-9 * scale
}

fn viewport() -> impl Strategy<Value = Viewport> {
    (-5_000.0..5_000.0f64, -5_000.0..5_000.0f64, MIN_ZOOM..=MAX_ZOOM)
        .prop_map(|(x, y, zoom)| Viewport::new(Vec2::new(x, y), zoom))
}

fn screen_point() -> impl Strategy<Value = Point> {
    (-4_000.0..4_000.0f64, -4_000.0..4_000.0f64).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn to_screen_inverts_to_world(vp in viewport(), p in screen_point(), origin in screen_point()) {
        let back = vp.to_screen(vp.to_world(p, origin), origin);
        prop_assert!(close(back, p), "{p:?} -> {back:?}");
    }

    #[test]
    fn wheel_keeps_cursor_anchored(
        vp in viewport(),
        cursor in screen_point(),
        origin in screen_point(),
        delta in prop_oneof![Just(-100.0f64), Just(100.0f64), -3.0..3.0f64],
    ) {
        let before = vp.to_world(cursor, origin);
        let mut after_vp = vp;
        after_vp.apply_wheel(delta, cursor - origin.to_vec2());
        let after = after_vp.to_world(cursor, origin);
        prop_assert!(close(before, after), "{before:?} jumped to {after:?}");
    }

    #[test]
    fn wheel_never_leaves_zoom_range(vp in viewport(), ticks in proptest::collection::vec(-1.0..1.0f64, 1..200)) {
        let mut vp = vp;
        for delta in ticks {
            vp.apply_wheel(delta, Point::new(320.0, 240.0));
            prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&vp.zoom()));
        }
    }
}

#[test]
fn repeated_zoom_in_stops_at_max() {
    let mut vp = Viewport::default();
    for _ in 0..100 {
        vp.apply_wheel(-1.0, Point::new(100.0, 100.0));
    }
    assert_eq!(vp.zoom(), MAX_ZOOM);
}

#[test]
fn repeated_zoom_out_stops_at_min() {
    let mut vp = Viewport::default();
    for _ in 0..100 {
        vp.apply_wheel(1.0, Point::new(100.0, 100.0));
    }
    assert_eq!(vp.zoom(), MIN_ZOOM);
}
