//! Flightradar24 official API source (paid, enriched data).
//!
//! Queries live flight positions for a bounding box around the
//! observer. Supports the sandbox endpoints for testing without
//! credits; sandbox data is synthetic, so in that mode the wrapper's
//! radius filter is skipped (`keep_out_of_range`).

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, error, info};
use reqwest::StatusCode;
use serde_json::Value;

use crate::extract::{coerce_str, pick_bool, pick_f64, pick_i32, pick_str};
use crate::geo::BoundingBox;
use crate::types::{Flight, Result};

use super::RawSource;

const API_BASE: &str = "https://fr24api.flightradar24.com/api";

pub struct Fr24Source {
    client: reqwest::blocking::Client,
    api_token: String,
    sandbox: bool,
    lat: f64,
    lon: f64,
    radius_nm: f64,
    // Name lookups are memoized for the life of the instance —
    // airline and airport names do not change during a run.
    airline_names: HashMap<String, String>,
    airport_names: HashMap<String, String>,
}

impl Fr24Source {
    pub fn new(lat: f64, lon: f64, radius_nm: f64, api_token: String, sandbox: bool) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        info!("FR24: REST client ({})", if sandbox { "SANDBOX" } else { "LIVE" });
        Fr24Source {
            client,
            api_token,
            sandbox,
            lat,
            lon,
            radius_nm,
            airline_names: HashMap::new(),
            airport_names: HashMap::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        if self.sandbox {
            format!("{API_BASE}/sandbox{path}")
        } else {
            format!("{API_BASE}{path}")
        }
    }

    /// Bounds query parameter: "north,south,west,east" in degrees.
    fn bounds_str(&self) -> String {
        let bb = BoundingBox::around(self.lat, self.lon, self.radius_nm);
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            bb.lat_max, bb.lat_min, bb.lon_min, bb.lon_max
        )
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .header("Accept-Version", "v1")
            .header("User-Agent", "FlightBoard/1.0")
    }

    /// Airline ICAO code to display name via the static-data endpoint.
    /// Failures are memoized as "" so a dead code is asked only once.
    fn lookup_airline(&mut self, code: &str) -> String {
        if code.len() != 3 {
            return String::new();
        }
        if let Some(name) = self.airline_names.get(code) {
            return name.clone();
        }
        let name = self
            .fetch_name(&self.endpoint(&format!("/static/airlines/{code}/light")))
            .unwrap_or_default();
        self.airline_names.insert(code.to_string(), name.clone());
        name
    }

    /// Airport code to display name, same memoization policy.
    fn lookup_airport(&mut self, code: &str) -> String {
        if code.is_empty() {
            return String::new();
        }
        if let Some(name) = self.airport_names.get(code) {
            return name.clone();
        }
        let name = self
            .fetch_name(&self.endpoint(&format!("/static/airports/{code}/light")))
            .unwrap_or_default();
        self.airport_names.insert(code.to_string(), name.clone());
        name
    }

    fn fetch_name(&self, url: &str) -> Option<String> {
        let data: Value = self.get(url).send().ok()?.error_for_status().ok()?.json().ok()?;
        let name = pick_str(&data, &["name"]);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Pull the item list out of whichever response shape the API sent:
/// a flat list, an object with `data`/`flights`/`results`, or an
/// object whose values are all records (dict-of-dicts).
pub fn extract_items(data: &Value) -> Vec<Value> {
    if let Value::Array(items) = data {
        return items.clone();
    }
    let obj = match data.as_object() {
        Some(o) => o,
        None => return Vec::new(),
    };
    for key in ["data", "flights", "results"] {
        if let Some(Value::Array(items)) = obj.get(key) {
            if !items.is_empty() {
                return items.clone();
            }
        }
    }
    if !obj.is_empty() && obj.values().all(Value::is_object) {
        return obj.values().cloned().collect();
    }
    Vec::new()
}

fn nested_str(item: &Value, obj_key: &str, inner: &[&str]) -> String {
    match item.get(obj_key) {
        Some(v @ Value::Object(_)) => {
            let mut cur = v;
            for key in inner {
                match cur.get(key) {
                    Some(next) => cur = next,
                    None => return String::new(),
                }
            }
            coerce_str(cur)
        }
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Parse one record. Handles both the live-positions flat schema and
/// the older nested airline/aircraft/origin/destination sub-objects.
pub fn parse_item(item: &Value) -> Option<Flight> {
    if !item.is_object() {
        return None;
    }
    let lat = pick_f64(item, &["latitude", "lat"]);
    let lon = pick_f64(item, &["longitude", "lon", "lng"]);
    if lat == 0.0 && lon == 0.0 {
        return None;
    }

    let mut callsign = pick_str(item, &["callsign", "flight"]);
    if callsign.is_empty() {
        callsign = nested_str(item, "identification", &["callsign"]);
    }

    let airline = {
        let nested = nested_str(item, "airline", &["name"]);
        if nested.is_empty() {
            pick_str(item, &["airline_name"])
        } else {
            nested
        }
    };

    let aircraft_type = {
        let nested = nested_str(item, "aircraft", &["model", "code"]);
        if nested.is_empty() {
            pick_str(item, &["aircraft_code", "type"])
        } else {
            nested
        }
    };

    let registration = {
        let nested = nested_str(item, "aircraft", &["registration"]);
        if nested.is_empty() {
            pick_str(item, &["registration", "reg"])
        } else {
            nested
        }
    };

    let origin_iata = {
        let nested = nested_str(item, "origin", &["iata"]);
        if nested.is_empty() {
            pick_str(item, &["origin_iata", "orig_iata", "from"])
        } else {
            nested
        }
    };
    let origin_name = {
        let nested = nested_str(item, "origin", &["name"]);
        if nested.is_empty() {
            pick_str(item, &["origin_name"])
        } else {
            nested
        }
    };
    let destination_iata = {
        let nested = nested_str(item, "destination", &["iata"]);
        if nested.is_empty() {
            pick_str(item, &["destination_iata", "dest_iata", "to"])
        } else {
            nested
        }
    };
    let destination_name = {
        let nested = nested_str(item, "destination", &["name"]);
        if nested.is_empty() {
            pick_str(item, &["destination_name"])
        } else {
            nested
        }
    };

    Some(Flight {
        flight_id: pick_str(item, &["id", "flight_id", "fr24_id"]),
        callsign,
        airline,
        aircraft_type,
        registration,
        origin_iata,
        origin_name,
        destination_iata,
        destination_name,
        latitude: lat,
        longitude: lon,
        altitude: pick_i32(item, &["altitude", "alt"]),
        ground_speed: pick_i32(item, &["ground_speed", "speed", "gspeed"]),
        heading: pick_i32(item, &["heading", "track", "direction"]),
        vertical_speed: pick_i32(item, &["vertical_speed", "vspeed"]),
        squawk: pick_str(item, &["squawk"]),
        on_ground: pick_bool(item, &["on_ground"]),
        hex_code: pick_str(item, &["hex"]).to_lowercase(),
        ..Default::default()
    })
}

/// The painted/operating airline ICAO code, for the name lookup path.
fn airline_code(item: &Value) -> String {
    pick_str(item, &["operating_as", "painted_as"])
}

impl RawSource for Fr24Source {
    fn name(&self) -> &'static str {
        "FR24Source"
    }

    fn keep_out_of_range(&self) -> bool {
        self.sandbox
    }

    fn fetch_raw(&mut self) -> Result<Vec<Flight>> {
        let url = self.endpoint("/live/flight-positions/full");
        let resp = self.get(&url).query(&[("bounds", self.bounds_str())]).send()?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                error!("FR24 auth failed (401) - check your API token");
                return Ok(Vec::new());
            }
            StatusCode::FORBIDDEN => {
                error!("FR24 forbidden (403) - check subscription tier");
                return Ok(Vec::new());
            }
            _ => {}
        }

        let data: Value = resp.error_for_status()?.json()?;
        let items = extract_items(&data);
        debug!("FR24: {} raw records", items.len());

        let mut flights = Vec::new();
        for item in &items {
            let mut f = match parse_item(item) {
                Some(f) => f,
                None => continue,
            };

            // Secondary lookups for human-readable names.
            if f.airline.is_empty() {
                let code = airline_code(item);
                if !code.is_empty() {
                    let name = self.lookup_airline(&code);
                    f.airline = if name.is_empty() { code } else { name };
                }
            }
            if f.origin_name.is_empty() && !f.origin_iata.is_empty() {
                let iata = f.origin_iata.clone();
                f.origin_name = self.lookup_airport(&iata);
            }
            if f.destination_name.is_empty() && !f.destination_iata.is_empty() {
                let iata = f.destination_iata.clone();
                f.destination_name = self.lookup_airport(&iata);
            }

            flights.push(f);
        }
        Ok(flights)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_flat_list() {
        let data = json!([{"lat": 1.0}, {"lat": 2.0}]);
        assert_eq!(extract_items(&data).len(), 2);
    }

    #[test]
    fn test_extract_items_data_key() {
        let data = json!({"data": [{"lat": 1.0}]});
        assert_eq!(extract_items(&data).len(), 1);
        let data = json!({"flights": [{"lat": 1.0}]});
        assert_eq!(extract_items(&data).len(), 1);
        let data = json!({"results": [{"lat": 1.0}]});
        assert_eq!(extract_items(&data).len(), 1);
    }

    #[test]
    fn test_extract_items_dict_of_dicts() {
        let data = json!({
            "abc123": {"lat": 1.0},
            "def456": {"lat": 2.0}
        });
        assert_eq!(extract_items(&data).len(), 2);
    }

    #[test]
    fn test_extract_items_unknown_shape() {
        assert!(extract_items(&json!(42)).is_empty());
        assert!(extract_items(&json!({"full_count": 12000, "version": 4})).is_empty());
    }

    #[test]
    fn test_parse_flat_item() {
        let item = json!({
            "fr24_id": "39b3c1f8",
            "callsign": "BAW117",
            "lat": 51.52,
            "lon": -0.15,
            "alt": 38000,
            "gspeed": 487,
            "track": 285,
            "vspeed": -200,
            "squawk": "4521",
            "hex": "400801",
            "orig_iata": "LHR",
            "dest_iata": "JFK",
            "type": "B777",
            "reg": "G-VIIA"
        });
        let f = parse_item(&item).unwrap();
        assert_eq!(f.flight_id, "39b3c1f8");
        assert_eq!(f.callsign, "BAW117");
        assert_eq!(f.origin_iata, "LHR");
        assert_eq!(f.destination_iata, "JFK");
        assert_eq!(f.aircraft_type, "B777");
        assert_eq!(f.registration, "G-VIIA");
        assert_eq!(f.altitude, 38000);
        assert_eq!(f.ground_speed, 487);
        assert_eq!(f.hex_code, "400801");
    }

    #[test]
    fn test_parse_nested_item() {
        let item = json!({
            "id": "x1",
            "identification": {"callsign": "RYR4421"},
            "airline": {"name": "Ryanair"},
            "aircraft": {"model": {"code": "B738"}, "registration": "EI-DCP"},
            "origin": {"iata": "STN", "name": "London Stansted"},
            "destination": {"iata": "DUB", "name": "Dublin"},
            "latitude": 51.55,
            "longitude": -0.08,
            "altitude": 24500,
            "ground_speed": 412
        });
        let f = parse_item(&item).unwrap();
        assert_eq!(f.callsign, "RYR4421");
        assert_eq!(f.airline, "Ryanair");
        assert_eq!(f.aircraft_type, "B738");
        assert_eq!(f.registration, "EI-DCP");
        assert_eq!(f.origin_iata, "STN");
        assert_eq!(f.origin_name, "London Stansted");
        assert_eq!(f.destination_iata, "DUB");
        assert_eq!(f.destination_name, "Dublin");
    }

    #[test]
    fn test_parse_item_without_position_dropped() {
        assert!(parse_item(&json!({"callsign": "BAW117"})).is_none());
        assert!(parse_item(&json!("junk")).is_none());
    }

    #[test]
    fn test_bounds_str_order() {
        let src = Fr24Source::new(51.5074, -0.1278, 10.0, "tok".into(), false);
        let bounds = src.bounds_str();
        let parts: Vec<f64> = bounds.split(',').map(|p| p.parse().unwrap()).collect();
        assert_eq!(parts.len(), 4);
        // north,south,west,east
        assert!(parts[0] > parts[1]);
        assert!(parts[2] < parts[3]);
    }

    #[test]
    fn test_sandbox_keeps_out_of_range() {
        let live = Fr24Source::new(51.5, -0.1, 10.0, "tok".into(), false);
        let sandbox = Fr24Source::new(51.5, -0.1, 10.0, "tok".into(), true);
        assert!(!live.keep_out_of_range());
        assert!(sandbox.keep_out_of_range());
    }

    #[test]
    fn test_sandbox_endpoint_prefix() {
        let sandbox = Fr24Source::new(51.5, -0.1, 10.0, "tok".into(), true);
        assert!(sandbox
            .endpoint("/live/flight-positions/full")
            .contains("/api/sandbox/live/"));
        let live = Fr24Source::new(51.5, -0.1, 10.0, "tok".into(), false);
        assert!(!live.endpoint("/live/flight-positions/full").contains("sandbox"));
    }
}
