pub mod hit;
pub mod overlay;
pub mod paint;
pub mod scene;
pub mod theme;

pub use hit::{Colliding, DemandShift, find_colliding, find_nearest, hit_test};
pub use overlay::{MarkerOverlay, marker_overlays};
pub use scene::{DrawOp, Frame, Layer, SceneInput, Shape, StrokeStyle, build_frame};
pub use theme::Theme;
