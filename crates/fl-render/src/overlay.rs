//! Screen positions of point markers, for HTML labels placed by the host page.

use crate::hit::{DemandShift, find_colliding, near_facility};
use fl_core::config::CanvasConfig;
use fl_core::model::{PointKind, PointSet};
use fl_core::viewport::Viewport;
use kurbo::Point;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOverlay {
    pub kind: PointKind,
    pub id: u64,
    /// Page-pixel position of the marker center.
    pub x: f64,
    pub y: f64,
    /// Shares its collision box with a point of the other kind.
    pub colliding: bool,
    /// Demand: attributed distance. Facility: total facility costs.
    pub value: f64,
    /// Number of demands served (facilities only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_costs: Option<f64>,
}

pub fn marker_overlays(
    viewport: &Viewport,
    origin: Point,
    points: &PointSet,
    config: &CanvasConfig,
) -> Vec<MarkerOverlay> {
    let tol = config.collision_tolerance;
    let mut out = Vec::with_capacity(points.demands.len() + points.facilities.len());

    for f in &points.facilities {
        let s = viewport.to_screen(f.location.to_point(), origin);
        let colliding = find_colliding(points, f.location, tol);
        out.push(MarkerOverlay {
            kind: PointKind::Facility,
            id: f.id.0,
            x: s.x,
            y: s.y,
            colliding: !colliding.demands.is_empty(),
            value: f.facility_costs.unwrap_or(0.0),
            connections: Some(f.connection.iter().filter(|id| points.demand(**id).is_some()).count()),
            opening_costs: Some(f.opening_costs),
        });
    }
    let shift = DemandShift::new(config, viewport.zoom());
    for d in &points.demands {
        let s = viewport.to_screen(shift.apply(points, d.location).to_point(), origin);
        out.push(MarkerOverlay {
            kind: PointKind::Demand,
            id: d.id.0,
            x: s.x,
            y: s.y,
            colliding: near_facility(points, d.location, tol),
            value: d.distance.unwrap_or(0.0),
            connections: None,
            opening_costs: None,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::id::{DemandId, FacilityId};
    use fl_core::model::{Demand, Facility, Location};
    use kurbo::Vec2;

    #[test]
    fn overlays_follow_the_viewport() {
        let mut f = Facility::new(FacilityId(1), Location::new(10.0, 20.0), 1000.0);
        f.connection = [DemandId(0), DemandId(5)].into_iter().collect();
        f.facility_costs = Some(1012.5);
        let mut d = Demand::new(DemandId(0), Location::new(200.0, 20.0));
        d.distance = Some(12.5);
        let points = PointSet {
            demands: vec![d],
            facilities: vec![f],
        };
        let vp = Viewport::new(Vec2::new(5.0, 5.0), 2.0);
        let overlays = marker_overlays(&vp, Point::new(100.0, 0.0), &points, &CanvasConfig::default());

        assert_eq!(overlays.len(), 2);
        let facility = &overlays[0];
        assert_eq!((facility.x, facility.y), (125.0, 45.0));
        assert_eq!(facility.connections, Some(1));
        assert_eq!(facility.value, 1012.5);
        assert!(!facility.colliding);

        let demand = &overlays[1];
        assert_eq!((demand.x, demand.y), (505.0, 45.0));
        assert_eq!(demand.value, 12.5);
    }

    #[test]
    fn colliding_demand_is_shifted_right() {
        let points = PointSet {
            demands: vec![Demand::new(DemandId(0), Location::new(3.0, 3.0))],
            facilities: vec![Facility::new(FacilityId(0), Location::new(0.0, 0.0), 1.0)],
        };
        let overlays = marker_overlays(&Viewport::default(), Point::ORIGIN, &points, &CanvasConfig::default());
        assert!(overlays.iter().all(|o| o.colliding));
        assert_eq!(overlays[1].x, 23.0);
    }

    #[test]
    fn serializes_camel_case() {
        let points = PointSet {
            demands: vec![],
            facilities: vec![Facility::new(FacilityId(0), Location::new(0.0, 0.0), 1.0)],
        };
        let overlays = marker_overlays(&Viewport::default(), Point::ORIGIN, &points, &CanvasConfig::default());
        let json = serde_json::to_value(&overlays).unwrap();
        assert_eq!(json[0]["kind"], "facility");
        assert_eq!(json[0]["openingCosts"], 1.0);
    }
}
