//! Wire contract of the optimization service.
//!
//! Two POST endpoints share one response envelope:
//!
//! | Endpoint                     | Body                                       |
//! |------------------------------|--------------------------------------------|
//! | `/online_facility_location`  | `{demand, demands, facilities, parameter}` |
//! | `/offline_facility_location` | `{demands, facilities, parameter}`         |
//!
//! Request points carry only their inputs (`demandID`, `location` and
//! `facilityID`, `location`, `connection`, `openingCosts`); costs derived on
//! the client are never sent back.
//!
//! Response: `{msg, code, data: {demands, facilities, data: {coin?, costs?}}}`.
//! Error responses carry `code >= 400` and `data: null`.

use crate::error::{ConfigError, ServiceError};
use crate::id::{DemandId, FacilityId};
use crate::model::{Connection, Demand, Facility, Location, Metric};
use serde::{Deserialize, Serialize, Serializer};

/// How additions are submitted to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Each new demand is submitted incrementally.
    #[default]
    Online,
    /// The full point set is re-solved on every addition.
    Offline,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Online => "online",
            Mode::Offline => "offline",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "online" => Some(Mode::Online),
            "offline" => Some(Mode::Offline),
            _ => None,
        }
    }
}

/// Solver parameters sent with every request as `parameter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Online randomization bias in `[0, 1]`.
    pub probability: f64,
    /// Cost charged per newly opened facility.
    #[serde(rename = "openingCosts")]
    pub opening_costs: f64,
    pub metric: Metric,
    /// Offline iteration budget.
    pub iterations: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            probability: 1.0,
            opening_costs: 1000.0,
            metric: Metric::Euclidean,
            iterations: 10,
        }
    }
}

impl Params {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Params = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ConfigError::OutOfRange {
                field: "probability",
                value: self.probability,
            });
        }
        if !self.opening_costs.is_finite() || self.opening_costs < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "openingCosts",
                value: self.opening_costs,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Online,
    Offline,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Online => "/online_facility_location",
            Endpoint::Offline => "/offline_facility_location",
        }
    }
}

// ─── Requests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnlineRequest {
    /// The newly placed demand.
    #[serde(serialize_with = "wire::demand")]
    pub demand: Demand,
    /// Demands placed before it.
    #[serde(serialize_with = "wire::demands")]
    pub demands: Vec<Demand>,
    #[serde(serialize_with = "wire::facilities")]
    pub facilities: Vec<Facility>,
    pub parameter: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfflineRequest {
    #[serde(serialize_with = "wire::demands")]
    pub demands: Vec<Demand>,
    #[serde(serialize_with = "wire::facilities")]
    pub facilities: Vec<Facility>,
    pub parameter: Params,
}

/// Request-side projections of the point types.
mod wire {
    use super::*;

    #[derive(Serialize)]
    struct DemandInput {
        #[serde(rename = "demandID")]
        id: DemandId,
        location: Location,
    }

    #[derive(Serialize)]
    struct FacilityInput<'a> {
        #[serde(rename = "facilityID")]
        id: FacilityId,
        location: Location,
        connection: &'a Connection,
        #[serde(rename = "openingCosts")]
        opening_costs: f64,
    }

    fn demand_input(d: &Demand) -> DemandInput {
        DemandInput {
            id: d.id,
            location: d.location,
        }
    }

    fn facility_input(f: &Facility) -> FacilityInput<'_> {
        FacilityInput {
            id: f.id,
            location: f.location,
            connection: &f.connection,
            opening_costs: f.opening_costs,
        }
    }

    pub fn demand<S: Serializer>(d: &Demand, s: S) -> Result<S::Ok, S::Error> {
        demand_input(d).serialize(s)
    }

    pub fn demands<S: Serializer>(ds: &[Demand], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(ds.iter().map(demand_input))
    }

    pub fn facilities<S: Serializer>(fs: &[Facility], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(fs.iter().map(facility_input))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    Online(OnlineRequest),
    Offline(OfflineRequest),
}

impl ServiceRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ServiceRequest::Online(_) => Endpoint::Online,
            ServiceRequest::Offline(_) => Endpoint::Offline,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            ServiceRequest::Online(r) => serde_json::to_value(r),
            ServiceRequest::Offline(r) => serde_json::to_value(r),
        };
        // Plain structs of numbers and strings always encode.
        value.unwrap_or(serde_json::Value::Null)
    }
}

// ─── Responses ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Costs {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
}

/// Optional solver metadata (`data.data`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct SolveInfo {
    /// Outcome of the online algorithm's biased coin flip.
    #[serde(default)]
    pub coin: Option<bool>,
    #[serde(default)]
    pub costs: Option<Costs>,
}

/// Authoritative point sets returned by the service (`data`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub data: Option<SolveInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct Envelope {
    #[serde(default)]
    msg: String,
    #[serde(default = "ok_code")]
    code: u16,
    #[serde(default)]
    data: Option<Solution>,
}

fn ok_code() -> u16 {
    200
}

/// Decode a response body.
///
/// `Ok(None)` means the envelope carried no `data`; callers treat that as a
/// no-op rather than a failure.
pub fn parse_response(body: &str) -> Result<Option<Solution>, ServiceError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    if envelope.code >= 400 {
        return Err(ServiceError::Rejected {
            code: envelope.code,
            message: envelope.msg,
        });
    }
    if envelope.data.is_none() {
        log::debug!("response without data: {:?}", envelope.msg);
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn params_wire_names() {
        let json = serde_json::to_value(Params::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "probability": 1.0,
                "openingCosts": 1000.0,
                "metric": "euclidean",
                "iterations": 10
            })
        );
    }

    #[test]
    fn params_partial_json_keeps_defaults() {
        let p = Params::from_json(r#"{"metric": "manhattan"}"#).unwrap();
        assert_eq!(p.metric, Metric::Manhattan);
        assert_eq!(p.opening_costs, 1000.0);
    }

    #[test]
    fn params_reject_bad_probability() {
        assert!(matches!(
            Params::from_json(r#"{"probability": 1.5}"#),
            Err(ConfigError::OutOfRange { field: "probability", .. })
        ));
    }

    #[test]
    fn online_request_shape() {
        let req = ServiceRequest::Online(OnlineRequest {
            demand: Demand::new(DemandId(1), Location::new(5.0, 6.0)),
            demands: vec![Demand::new(DemandId(0), Location::new(0.0, 0.0))],
            facilities: vec![],
            parameter: Params::default(),
        });
        assert_eq!(req.endpoint().path(), "/online_facility_location");
        let body = req.to_json();
        assert_eq!(body["demand"]["demandID"], 1);
        assert_eq!(body["demands"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["parameter"]["iterations"], 10);
    }

    #[test]
    fn requests_leave_derived_costs_behind() {
        let mut points = crate::model::PointSet {
            demands: vec![Demand::new(DemandId(0), Location::new(3.0, 4.0))],
            facilities: vec![Facility::new(FacilityId(0), Location::new(0.0, 0.0), 1000.0)],
        };
        points.facilities[0].connection.push(DemandId(0));
        points.attribute_costs(Metric::Euclidean);
        assert_eq!(points.facilities[0].facility_costs, Some(1005.0));

        let offline = ServiceRequest::Offline(OfflineRequest {
            demands: points.demands.clone(),
            facilities: points.facilities.clone(),
            parameter: Params::default(),
        });
        assert_eq!(
            offline.to_json(),
            serde_json::json!({
                "demands": [{"demandID": 0, "location": [3.0, 4.0]}],
                "facilities": [{
                    "facilityID": 0,
                    "location": [0.0, 0.0],
                    "connection": [0],
                    "openingCosts": 1000.0
                }],
                "parameter": serde_json::to_value(Params::default()).unwrap()
            })
        );

        let online = ServiceRequest::Online(OnlineRequest {
            demand: points.demands[0].clone(),
            demands: points.demands.clone(),
            facilities: points.facilities.clone(),
            parameter: Params::default(),
        });
        let body = online.to_json();
        assert_eq!(body["demand"], serde_json::json!({"demandID": 0, "location": [3.0, 4.0]}));
        assert_eq!(body["facilities"][0].get("facilityCosts"), None);
    }

    #[test]
    fn parse_full_response() {
        let body = r#"{
            "msg": "/online_facility_location successful.",
            "code": 200,
            "data": {
                "demands": [{"demandID": 0, "location": [0, 0]}],
                "facilities": [{"facilityID": 0, "location": [0, 0], "connection": [0], "openingCosts": 10.0}],
                "data": {"costs": {"current": 10.0, "previous": 0.0, "delta": 10.0}, "coin": true}
            }
        }"#;
        let solution = parse_response(body).unwrap().unwrap();
        assert_eq!(solution.facilities[0].id, FacilityId(0));
        let info = solution.data.unwrap();
        assert_eq!(info.coin, Some(true));
        assert_eq!(info.costs.unwrap().delta, 10.0);
    }

    #[test]
    fn missing_data_is_no_op() {
        assert_eq!(parse_response(r#"{"msg": "ok", "code": 200}"#), Ok(None));
    }

    #[test]
    fn error_envelope_is_rejected() {
        let err = parse_response(r#"{"msg": "Could not initialize Classes", "code": 400, "data": null}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                code: 400,
                message: "Could not initialize Classes".into()
            }
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(ServiceError::Malformed(_))
        ));
    }
}
