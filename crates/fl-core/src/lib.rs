pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod protocol;
pub mod viewport;

pub use config::CanvasConfig;
pub use error::{ConfigError, ServiceError};
pub use id::{DemandId, FacilityId, IdAllocator};
pub use model::*;
pub use protocol::{Mode, Params, ServiceRequest, Solution, parse_response};
pub use viewport::Viewport;

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Affine, Circle, Line, Point, Rect, Size, Vec2};
