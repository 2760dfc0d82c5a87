//! Hit testing: world point → demand/facility lookup.
//!
//! Two distinct queries live here and must not be merged:
//!
//! - [`hit_test`] is radial and zoom-scaled (callers pass a tolerance already
//!   divided by zoom). It answers "which point is under the pointer".
//! - [`find_colliding`] is a fixed square box in world units, used only to
//!   decide how co-located markers are drawn. [`near_facility`] and
//!   [`near_demand`] are its non-allocating yes/no forms.
//!
//! A demand inside a facility's box is drawn shifted to the right
//! ([`DemandShift`]); [`hit_test`] looks for it where it is drawn.
//!
//! Both are linear scans over the live point sets. Manual placement keeps
//! those sets small; nothing here allocates on the hover path.

use fl_core::config::CanvasConfig;
use fl_core::id::{DemandId, FacilityId};
use fl_core::model::{Located, Location, PointRef, PointSet};

/// First candidate whose location lies within `tolerance` (inclusive) of
/// `at`, by Euclidean distance.
pub fn find_nearest<'a, P: Located>(at: Location, candidates: &'a [P], tolerance: f64) -> Option<&'a P> {
    candidates.iter().find(|c| within(c.location(), at, tolerance))
}

/// The point under `at`. Demands are tested first, at their drawn
/// position, and win ties.
pub fn hit_test(
    points: &PointSet,
    at: Location,
    tolerance: f64,
    shift: DemandShift,
) -> Option<PointRef> {
    if let Some(d) = points
        .demands
        .iter()
        .find(|d| within(shift.apply(points, d.location), at, tolerance))
    {
        return Some(PointRef::Demand(d.id));
    }
    find_nearest(at, &points.facilities, tolerance).map(|f| PointRef::Facility(f.id))
}

fn within(l: Location, at: Location, tolerance: f64) -> bool {
    (l.x - at.x).hypot(l.y - at.y) <= tolerance
}

/// Sideways offset of demand markers that share a facility's collision box.
///
/// The default moves nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DemandShift {
    /// Half-width of the collision box, world units.
    pub collision_tolerance: f64,
    /// How far a colliding demand moves right, world units.
    pub dx: f64,
}

impl DemandShift {
    /// The screen-space shift of `config` at `zoom`.
    pub fn new(config: &CanvasConfig, zoom: f64) -> Self {
        Self {
            collision_tolerance: config.collision_tolerance,
            dx: config.collision_shift_px / zoom,
        }
    }

    /// Where a demand at `location` is drawn.
    pub fn apply(self, points: &PointSet, location: Location) -> Location {
        if self.dx != 0.0 && near_facility(points, location, self.collision_tolerance) {
            Location::new(location.x + self.dx, location.y)
        } else {
            location
        }
    }
}

/// Points sharing the square `|dx| < tolerance && |dy| < tolerance` around
/// a location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Colliding {
    pub facilities: Vec<FacilityId>,
    pub demands: Vec<DemandId>,
}

pub fn find_colliding(points: &PointSet, location: Location, tolerance: f64) -> Colliding {
    Colliding {
        facilities: points
            .facilities
            .iter()
            .filter(|f| in_box(f.location, location, tolerance))
            .map(|f| f.id)
            .collect(),
        demands: points
            .demands
            .iter()
            .filter(|d| in_box(d.location, location, tolerance))
            .map(|d| d.id)
            .collect(),
    }
}

/// Whether any facility shares the collision box of `location`.
pub fn near_facility(points: &PointSet, location: Location, tolerance: f64) -> bool {
    points.facilities.iter().any(|f| in_box(f.location, location, tolerance))
}

/// Whether any demand shares the collision box of `location`.
pub fn near_demand(points: &PointSet, location: Location, tolerance: f64) -> bool {
    points.demands.iter().any(|d| in_box(d.location, location, tolerance))
}

fn in_box(l: Location, center: Location, tolerance: f64) -> bool {
    (l.x - center.x).abs() < tolerance && (l.y - center.y).abs() < tolerance
}
