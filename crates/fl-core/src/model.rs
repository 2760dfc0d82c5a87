//! Point data model for the facility-location canvas.
//!
//! Demands and facilities live in world coordinates. A facility's
//! `connection` lists the demands it currently serves; that list may hold ids
//! of demands that were deleted since the last optimization, and every
//! consumer treats those as absent.

use crate::id::{DemandId, FacilityId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channels as 0–255 integers (alpha included).
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS color string, e.g. `rgba(0, 221, 255, 1)`.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A world-space location. Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snap to whole world units, as user placements are submitted.
    pub fn rounded(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<[f64; 2]> for Location {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Location> for [f64; 2] {
    fn from(l: Location) -> Self {
        [l.x, l.y]
    }
}

impl From<Point> for Location {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Distance function used to attribute costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    pub fn distance(self, a: Location, b: Location) -> f64 {
        let (dx, dy) = (a.x - b.x, a.y - b.y);
        match self {
            Metric::Euclidean => dx.hypot(dy),
            Metric::Manhattan => dx.abs() + dy.abs(),
        }
    }
}

// ─── Points ──────────────────────────────────────────────────────────────

/// A demand (customer) location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    #[serde(rename = "demandID")]
    pub id: DemandId,
    pub location: Location,
    /// Cost attributed to this demand after optimization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(
        rename = "assignedFacility",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_facility: Option<FacilityId>,
}

impl Demand {
    pub fn new(id: DemandId, location: Location) -> Self {
        Self {
            id,
            location,
            distance: None,
            assigned_facility: None,
        }
    }
}

/// Demand ids served by one facility, in service order.
pub type Connection = SmallVec<[DemandId; 8]>;

/// A facility (candidate or opened service location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "facilityID")]
    pub id: FacilityId,
    pub location: Location,
    #[serde(default)]
    pub connection: Connection,
    #[serde(rename = "openingCosts", default)]
    pub opening_costs: f64,
    #[serde(
        rename = "facilityCosts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub facility_costs: Option<f64>,
}

impl Facility {
    pub fn new(id: FacilityId, location: Location, opening_costs: f64) -> Self {
        Self {
            id,
            location,
            connection: Connection::new(),
            opening_costs,
            facility_costs: None,
        }
    }
}

/// Which of the two point collections a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    #[default]
    Demand,
    Facility,
}

impl PointKind {
    pub fn name(self) -> &'static str {
        match self {
            PointKind::Demand => "demand",
            PointKind::Facility => "facility",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "demand" => Some(PointKind::Demand),
            "facility" => Some(PointKind::Facility),
            _ => None,
        }
    }
}

/// A reference to one existing point, e.g. the hovered or clicked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PointRef {
    Demand(DemandId),
    Facility(FacilityId),
}

impl PointRef {
    pub fn kind(self) -> PointKind {
        match self {
            PointRef::Demand(_) => PointKind::Demand,
            PointRef::Facility(_) => PointKind::Facility,
        }
    }
}

/// Anything with a world-space location; lets hit-testing scan either kind.
pub trait Located {
    fn location(&self) -> Location;
}

impl Located for Demand {
    fn location(&self) -> Location {
        self.location
    }
}

impl Located for Facility {
    fn location(&self) -> Location {
        self.location
    }
}

// ─── Point set ───────────────────────────────────────────────────────────

/// The live demand and facility collections of one canvas session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub demands: Vec<Demand>,
    pub facilities: Vec<Facility>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demand(&self, id: DemandId) -> Option<&Demand> {
        self.demands.iter().find(|d| d.id == id)
    }

    pub fn facility(&self, id: FacilityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, point: PointRef) -> bool {
        match point {
            PointRef::Demand(id) => self.demand(id).is_some(),
            PointRef::Facility(id) => self.facility(id).is_some(),
        }
    }

    /// Remove a point. Connections that named a removed demand are left as
    /// they are; they resolve to nothing from now on.
    pub fn remove(&mut self, point: PointRef) -> bool {
        let before = self.demands.len() + self.facilities.len();
        match point {
            PointRef::Demand(id) => self.demands.retain(|d| d.id != id),
            PointRef::Facility(id) => self.facilities.retain(|f| f.id != id),
        }
        before != self.demands.len() + self.facilities.len()
    }

    /// Facility → demand pairs for every connection that still resolves.
    pub fn connections(&self) -> impl Iterator<Item = (&Facility, &Demand)> + '_ {
        self.facilities.iter().flat_map(move |f| {
            f.connection
                .iter()
                .filter_map(move |id| self.demand(*id).map(|d| (f, d)))
        })
    }

    /// Derive per-point costs from the facilities' connection lists.
    ///
    /// Sets `assigned_facility` on every demand (first serving facility
    /// wins), fills in `distance` where the server did not supply one, and
    /// recomputes `facility_costs` as opening costs plus served distances.
    /// Unserved demands carry no distance.
    pub fn attribute_costs(&mut self, metric: Metric) {
        for demand in &mut self.demands {
            demand.assigned_facility = None;
        }
        for facility in &mut self.facilities {
            let mut total = facility.opening_costs;
            for id in &facility.connection {
                let Some(demand) = self.demands.iter_mut().find(|d| d.id == *id) else {
                    continue;
                };
                if demand.assigned_facility.is_some() {
                    continue;
                }
                demand.assigned_facility = Some(facility.id);
                let measured = metric.distance(facility.location, demand.location);
                total += *demand.distance.get_or_insert(measured);
            }
            facility.facility_costs = Some(total);
        }
        for demand in &mut self.demands {
            if demand.assigned_facility.is_none() {
                demand.distance = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn sample() -> PointSet {
        let mut f = Facility::new(FacilityId(0), Location::new(0.0, 0.0), 100.0);
        f.connection = smallvec![DemandId(0), DemandId(1), DemandId(9)];
        PointSet {
            demands: vec![
                Demand::new(DemandId(0), Location::new(3.0, 4.0)),
                Demand::new(DemandId(1), Location::new(-1.0, 0.0)),
            ],
            facilities: vec![f],
        }
    }

    #[test]
    fn connections_skip_dangling_ids() {
        let set = sample();
        let ids: Vec<_> = set.connections().map(|(_, d)| d.id).collect();
        assert_eq!(ids, vec![DemandId(0), DemandId(1)]);
    }

    #[test]
    fn remove_leaves_connection_lists_alone() {
        let mut set = sample();
        assert!(set.remove(PointRef::Demand(DemandId(0))));
        assert!(!set.remove(PointRef::Demand(DemandId(0))));
        assert_eq!(set.facilities[0].connection.len(), 3);
        assert_eq!(set.connections().count(), 1);
    }

    #[test]
    fn attribute_costs_uses_metric() {
        let mut set = sample();
        set.attribute_costs(Metric::Euclidean);
        assert_eq!(set.demands[0].distance, Some(5.0));
        assert_eq!(set.demands[0].assigned_facility, Some(FacilityId(0)));
        assert_eq!(set.facilities[0].facility_costs, Some(106.0));

        let mut set = sample();
        set.attribute_costs(Metric::Manhattan);
        assert_eq!(set.demands[0].distance, Some(7.0));
        assert_eq!(set.facilities[0].facility_costs, Some(108.0));
    }

    #[test]
    fn unserved_demands_lose_their_distance() {
        let mut set = sample();
        set.attribute_costs(Metric::Euclidean);
        set.remove(PointRef::Facility(FacilityId(0)));
        set.attribute_costs(Metric::Euclidean);
        assert!(set.demands.iter().all(|d| d.distance.is_none() && d.assigned_facility.is_none()));
    }

    #[test]
    fn demand_wire_format() {
        let d = Demand::new(DemandId(0), Location::new(150.0, 100.0));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"demandID": 0, "location": [150.0, 100.0]})
        );
    }

    #[test]
    fn facility_accepts_server_shape() {
        let f: Facility = serde_json::from_str(
            r#"{"facilityID": 2, "location": [1, 2], "connection": [0, 3], "openingCosts": 10.0}"#,
        )
        .unwrap();
        assert_eq!(f.id, FacilityId(2));
        assert_eq!(f.location, Location::new(1.0, 2.0));
        assert_eq!(f.connection.as_slice(), &[DemandId(0), DemandId(3)]);
        assert_eq!(f.facility_costs, None);
    }

    #[test]
    fn color_css() {
        let c = Color::rgb8(0x00, 0xdd, 0xff);
        assert_eq!(c.to_rgba8(), [0, 221, 255, 255]);
        assert_eq!(c.to_css(), "rgba(0, 221, 255, 1)");
        assert_eq!(c.with_alpha(0.5).to_rgba8()[3], 128);
    }
}
