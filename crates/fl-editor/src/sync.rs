//! Sync engine: local point sets ↔ optimization service.
//!
//! The engine owns the authoritative client-side `PointSet` and decides
//! which edits need a round trip to the solver. It performs no I/O itself:
//!
//! - **Outgoing**: `add_point` applies the edit locally and, when the mode
//!   calls for it, returns a [`PendingRequest`] for the host to send.
//! - **Incoming**: the host hands the response (or the transport failure)
//!   back with the request's sequence number. Only the most recently issued
//!   request may change state; anything older is discarded.

use fl_core::config::CanvasConfig;
use fl_core::error::{ConfigError, ServiceError};
use fl_core::id::{DemandId, FacilityId, IdAllocator};
use fl_core::model::*;
use fl_core::protocol::{
    Costs, Endpoint, Mode, OfflineRequest, OnlineRequest, Params, ServiceRequest, Solution,
    parse_response,
};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// A request the host must deliver to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub seq: u64,
    pub endpoint: Endpoint,
    pub body: serde_json::Value,
}

/// What happened to a delivered response.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Point sets replaced with the service's.
    Adopted,
    /// Envelope carried no data; nothing changed.
    NoOp,
    /// A newer request was issued since; ignored.
    Stale,
    /// The latest request failed; local state kept, error recorded.
    Failed(ServiceError),
}

/// Bookkeeping for the most recently issued request.
#[derive(Debug, Clone, Copy)]
struct Issued {
    seq: u64,
    /// Ids handed out after this point were never seen by the service.
    next_demand: DemandId,
    next_facility: FacilityId,
}

pub struct SyncEngine {
    /// The current demand and facility sets.
    pub points: PointSet,

    /// Online (incremental) or offline (batch) solving.
    pub mode: Mode,

    /// Last reported solver costs.
    pub costs: Option<Costs>,

    /// Last reported coin flip of the online algorithm.
    pub coin: Option<bool>,

    params: Params,

    ids: IdAllocator,

    /// Most recent coin flips, newest first.
    coin_history: VecDeque<bool>,

    coin_history_len: usize,

    next_seq: u64,

    latest: Option<Issued>,

    /// Sequence numbers sent but not yet answered.
    in_flight: BTreeSet<u64>,

    last_error: Option<ServiceError>,
}

impl SyncEngine {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            points: PointSet::new(),
            mode: Mode::default(),
            costs: None,
            coin: None,
            params: Params::default(),
            ids: IdAllocator::new(),
            coin_history: VecDeque::with_capacity(config.coin_history_len),
            coin_history_len: config.coin_history_len,
            next_seq: 0,
            latest: None,
            in_flight: BTreeSet::new(),
            last_error: None,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace the solver parameters. Rejected values leave the old ones.
    pub fn set_params(&mut self, params: Params) -> Result<(), ConfigError> {
        params.validate()?;
        log::debug!("params: {params:?}");
        self.params = params;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::debug!("mode: {} -> {}", self.mode.name(), mode.name());
            self.mode = mode;
        }
    }

    pub fn coin_history(&self) -> impl Iterator<Item = bool> + '_ {
        self.coin_history.iter().copied()
    }

    pub fn last_error(&self) -> Option<&ServiceError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// A request is waiting for its response.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    // ─── Local edits ─────────────────────────────────────────────────────

    /// Place a point and build the service request the edit requires.
    ///
    /// The point is inserted locally before any response arrives. Facilities
    /// placed in online mode never produce a request.
    pub fn add_point(&mut self, kind: PointKind, at: Location) -> Option<PendingRequest> {
        let request = match kind {
            PointKind::Demand => {
                let demand = Demand::new(self.ids.next_demand(), at);
                log::debug!("add {} at ({}, {})", demand.id, at.x, at.y);
                let prior = (self.mode == Mode::Online).then(|| self.points.demands.clone());
                self.points.demands.push(demand.clone());
                match prior {
                    Some(demands) => ServiceRequest::Online(OnlineRequest {
                        demand,
                        demands,
                        facilities: self.points.facilities.clone(),
                        parameter: self.params,
                    }),
                    None => self.offline_request(),
                }
            }
            PointKind::Facility => {
                let facility = Facility::new(self.ids.next_facility(), at, self.params.opening_costs);
                log::debug!("add {} at ({}, {})", facility.id, at.x, at.y);
                self.points.facilities.push(facility);
                match self.mode {
                    Mode::Online => return None,
                    Mode::Offline => self.offline_request(),
                }
            }
        };
        Some(self.issue(request))
    }

    /// Delete a point locally. No request is made.
    pub fn remove_point(&mut self, point: PointRef) -> bool {
        let removed = self.points.remove(point);
        if removed {
            log::debug!("removed {point:?}");
            self.points.attribute_costs(self.params.metric);
        }
        removed
    }

    // ─── Responses ───────────────────────────────────────────────────────

    /// Deliver a raw response body for request `seq`.
    pub fn receive_body(&mut self, seq: u64, body: &str) -> SyncOutcome {
        self.receive(seq, parse_response(body))
    }

    /// Deliver the outcome of request `seq`.
    pub fn receive(&mut self, seq: u64, result: Result<Option<Solution>, ServiceError>) -> SyncOutcome {
        let was_pending = self.in_flight.remove(&seq);
        let latest = match self.latest {
            Some(issued) if was_pending && issued.seq == seq => issued,
            _ => {
                match &result {
                    Err(e) => log::warn!("request #{seq} superseded, failure dropped: {e}"),
                    Ok(_) => log::warn!("request #{seq} superseded, response discarded"),
                }
                return SyncOutcome::Stale;
            }
        };

        match result {
            Err(e) => {
                log::warn!("request #{seq} failed: {e}");
                self.last_error = Some(e.clone());
                SyncOutcome::Failed(e)
            }
            Ok(None) => {
                log::info!("request #{seq}: no data, state unchanged");
                SyncOutcome::NoOp
            }
            Ok(Some(solution)) => {
                self.adopt(solution, latest);
                log::info!(
                    "request #{seq} adopted: {} demands, {} facilities",
                    self.points.demands.len(),
                    self.points.facilities.len()
                );
                SyncOutcome::Adopted
            }
        }
    }
}

impl SyncEngine {
    fn offline_request(&self) -> ServiceRequest {
        ServiceRequest::Offline(OfflineRequest {
            demands: self.points.demands.clone(),
            facilities: self.points.facilities.clone(),
            parameter: self.params,
        })
    }

    fn issue(&mut self, request: ServiceRequest) -> PendingRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        let (next_demand, next_facility) = self.ids.peek();
        self.latest = Some(Issued {
            seq,
            next_demand,
            next_facility,
        });
        self.in_flight.insert(seq);
        let endpoint = request.endpoint();
        log::info!("request #{seq} -> {}", endpoint.path());
        PendingRequest {
            seq,
            endpoint,
            body: request.to_json(),
        }
    }

    /// Replace local state with the service's, keeping points placed after
    /// the request went out.
    fn adopt(&mut self, solution: Solution, issued: Issued) {
        let Solution {
            demands,
            facilities,
            data,
        } = solution;

        let carried_demands: Vec<Demand> = self
            .points
            .demands
            .drain(..)
            .filter(|d| d.id >= issued.next_demand)
            .collect();
        let carried_facilities: Vec<Facility> = self
            .points
            .facilities
            .drain(..)
            .filter(|f| f.id >= issued.next_facility)
            .collect();

        self.points = PointSet {
            demands,
            facilities,
        };
        for d in &self.points.demands {
            self.ids.observe_demand(d.id);
        }
        for f in &self.points.facilities {
            self.ids.observe_facility(f.id);
        }

        // The solver numbers facilities it opens by count, which can repeat
        // an id still in use after a deletion.
        let mut seen = HashSet::new();
        for f in &mut self.points.facilities {
            if !seen.insert(f.id) {
                let fresh = self.ids.next_facility();
                log::warn!("duplicate {} from service renumbered to {fresh}", f.id);
                f.id = fresh;
            }
        }

        for mut d in carried_demands {
            if self.points.demand(d.id).is_some() {
                d.id = self.ids.next_demand();
            }
            self.points.demands.push(d);
        }
        for mut f in carried_facilities {
            if self.points.facility(f.id).is_some() {
                f.id = self.ids.next_facility();
            }
            self.points.facilities.push(f);
        }

        self.points.attribute_costs(self.params.metric);

        if let Some(info) = data {
            if let Some(coin) = info.coin {
                self.coin = Some(coin);
                self.coin_history.push_front(coin);
                self.coin_history.truncate(self.coin_history_len);
            }
            if let Some(costs) = info.costs {
                self.costs = Some(costs);
            }
        }
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine(mode: Mode) -> SyncEngine {
        let mut s = SyncEngine::new(&CanvasConfig::default());
        s.set_mode(mode);
        s
    }

    fn ok(body: serde_json::Value) -> String {
        serde_json::json!({ "msg": "ok", "code": 200, "data": body }).to_string()
    }

    #[test]
    fn online_facility_is_local_only() {
        let mut s = engine(Mode::Online);
        assert_eq!(s.add_point(PointKind::Facility, Location::new(1.0, 2.0)), None);
        assert_eq!(s.points.facilities.len(), 1);
        assert!(s.points.facilities[0].connection.is_empty());
        assert_eq!(s.points.facilities[0].opening_costs, 1000.0);
        assert!(!s.is_busy());
    }

    #[test]
    fn online_demand_sends_prior_demands() {
        let mut s = engine(Mode::Online);
        s.add_point(PointKind::Demand, Location::new(0.0, 0.0));
        let req = s.add_point(PointKind::Demand, Location::new(5.0, 5.0)).unwrap();

        assert_eq!(req.endpoint, Endpoint::Online);
        assert_eq!(req.body["demand"]["demandID"], 1);
        assert_eq!(req.body["demands"].as_array().unwrap().len(), 1);
        // Optimistic insert.
        assert_eq!(s.points.demands.len(), 2);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut s = engine(Mode::Offline);
        let first = s.add_point(PointKind::Demand, Location::new(0.0, 0.0)).unwrap();
        let second = s.add_point(PointKind::Demand, Location::new(9.0, 0.0)).unwrap();

        let body = ok(serde_json::json!({ "demands": [], "facilities": [] }));
        assert_eq!(s.receive_body(first.seq, &body), SyncOutcome::Stale);
        assert_eq!(s.points.demands.len(), 2);
        assert!(s.is_busy());

        let body = ok(serde_json::json!({
            "demands": [
                { "demandID": 0, "location": [0.0, 0.0] },
                { "demandID": 1, "location": [9.0, 0.0] }
            ],
            "facilities": []
        }));
        assert_eq!(s.receive_body(second.seq, &body), SyncOutcome::Adopted);
        assert!(!s.is_busy());
    }

    #[test]
    fn duplicate_delivery_is_stale() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Facility, Location::new(0.0, 0.0)).unwrap();
        let body = ok(serde_json::json!({ "demands": [], "facilities": [] }));
        assert_eq!(s.receive_body(req.seq, &body), SyncOutcome::Adopted);
        assert_eq!(s.receive_body(req.seq, &body), SyncOutcome::Stale);
    }

    #[test]
    fn rejection_keeps_local_state() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Demand, Location::new(3.0, 4.0)).unwrap();
        let body = r#"{"msg": "bad parameter", "code": 400, "data": null}"#;

        let outcome = s.receive_body(req.seq, body);
        assert_eq!(
            outcome,
            SyncOutcome::Failed(ServiceError::Rejected {
                code: 400,
                message: "bad parameter".into()
            })
        );
        assert_eq!(s.points.demands.len(), 1);
        assert!(s.last_error().is_some());
        s.dismiss_error();
        assert!(s.last_error().is_none());
    }

    #[test]
    fn missing_data_is_a_noop() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Demand, Location::new(3.0, 4.0)).unwrap();
        let outcome = s.receive_body(req.seq, r#"{"msg": "nothing", "code": 200}"#);
        assert_eq!(outcome, SyncOutcome::NoOp);
        assert_eq!(s.points.demands.len(), 1);
    }

    #[test]
    fn coin_history_is_capped_newest_first() {
        let mut config = CanvasConfig::default();
        config.coin_history_len = 3;
        let mut s = SyncEngine::new(&config);
        for i in 0..5 {
            let req = s.add_point(PointKind::Demand, Location::new(i as f64, 0.0)).unwrap();
            let body = ok(serde_json::json!({
                "demands": [], "facilities": [],
                "data": { "coin": i % 2 == 0 }
            }));
            s.receive_body(req.seq, &body);
        }
        assert_eq!(s.coin_history().collect::<Vec<_>>(), vec![true, false, true]);
        assert_eq!(s.coin, Some(true));
    }

    #[test]
    fn adoption_advances_ids_past_the_service() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Demand, Location::new(0.0, 0.0)).unwrap();
        let body = ok(serde_json::json!({
            "demands": [{ "demandID": 0, "location": [0.0, 0.0] }],
            "facilities": [{ "facilityID": 7, "location": [1.0, 1.0], "connection": [0], "openingCosts": 10.0 }]
        }));
        s.receive_body(req.seq, &body);
        s.set_mode(Mode::Online);
        s.add_point(PointKind::Facility, Location::new(2.0, 2.0));
        assert_eq!(s.points.facilities[1].id, FacilityId(8));
    }

    #[test]
    fn facilities_placed_while_waiting_survive_adoption() {
        let mut s = engine(Mode::Online);
        let req = s.add_point(PointKind::Demand, Location::new(0.0, 0.0)).unwrap();
        s.add_point(PointKind::Facility, Location::new(50.0, 50.0));

        // The solver opened facility 0 itself; the local one was also 0.
        let body = ok(serde_json::json!({
            "demands": [{ "demandID": 0, "location": [0.0, 0.0] }],
            "facilities": [{ "facilityID": 0, "location": [0.0, 0.0], "connection": [0], "openingCosts": 1000.0 }]
        }));
        assert_eq!(s.receive_body(req.seq, &body), SyncOutcome::Adopted);

        let ids: Vec<_> = s.points.facilities.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![FacilityId(0), FacilityId(1)]);
        assert_eq!(s.points.facilities[1].location, Location::new(50.0, 50.0));
    }

    #[test]
    fn duplicate_service_ids_are_renumbered() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Demand, Location::new(0.0, 0.0)).unwrap();
        let body = ok(serde_json::json!({
            "demands": [],
            "facilities": [
                { "facilityID": 1, "location": [0.0, 0.0], "connection": [], "openingCosts": 1.0 },
                { "facilityID": 1, "location": [9.0, 9.0], "connection": [], "openingCosts": 1.0 }
            ]
        }));
        s.receive_body(req.seq, &body);
        assert_eq!(s.points.facilities[0].id, FacilityId(1));
        assert_eq!(s.points.facilities[1].id, FacilityId(2));
    }

    #[test]
    fn adopting_the_largest_id_does_not_overflow() {
        let mut s = engine(Mode::Offline);
        let req = s.add_point(PointKind::Demand, Location::new(0.0, 0.0)).unwrap();
        let body = ok(serde_json::json!({
            "demands": [{ "demandID": 0, "location": [0.0, 0.0] }],
            "facilities": [
                { "facilityID": 18446744073709551615u64, "location": [1.0, 1.0], "connection": [0], "openingCosts": 1.0 }
            ]
        }));
        assert_eq!(s.receive_body(req.seq, &body), SyncOutcome::Adopted);
        assert_eq!(s.points.facilities[0].id, FacilityId(u64::MAX));
        assert_eq!(s.points.demands[0].assigned_facility, Some(FacilityId(u64::MAX)));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut s = engine(Mode::Offline);
        let bad = Params {
            probability: 2.0,
            ..Params::default()
        };
        assert!(s.set_params(bad).is_err());
        assert_eq!(s.params().probability, 1.0);
    }
}
