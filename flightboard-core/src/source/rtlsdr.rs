//! Local ADS-B receiver source — dump1090, readsb, or tar1090.
//!
//! These decoders receive raw ADS-B via an RTL-SDR USB stick and serve
//! aircraft data as JSON over HTTP on the local network. No API key,
//! real-time, range depends on the antenna.

use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::extract::{pick_bool, pick_f64, pick_i32, pick_str};
use crate::types::{Flight, Result};

use super::RawSource;

/// Well-known endpoints, probed in order (readsb/tar1090 preferred).
const DEFAULT_URLS: &[&str] = &[
    "http://localhost/tar1090/data/aircraft.json",
    "http://localhost:8080/data/aircraft.json",
    "http://localhost:30152/data/aircraft.json",
    "http://localhost:16601/data/aircraft.json",
    "http://localhost:8080/data.json",
];

/// Transponder reports older than this are dropped as stale.
const MAX_SEEN_SECS: f64 = 60.0;

pub struct RtlSdrSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl RtlSdrSource {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        let url = match url {
            Some(u) => {
                info!("RTL-SDR source: using {u}");
                u
            }
            None => detect_endpoint(&client),
        };

        RtlSdrSource { client, url }
    }
}

/// Probe candidate endpoints and take the first that answers with
/// something that looks like aircraft data.
fn detect_endpoint(client: &reqwest::blocking::Client) -> String {
    for url in DEFAULT_URLS {
        let resp = match client
            .get(*url)
            .timeout(Duration::from_secs(3))
            .send()
        {
            Ok(r) => r,
            Err(_) => continue,
        };
        if !resp.status().is_success() {
            continue;
        }
        let data: Value = match resp.json() {
            Ok(d) => d,
            Err(_) => continue,
        };
        if data.is_array() || data.get("aircraft").is_some() {
            info!("RTL-SDR: auto-detected endpoint at {url}");
            return url.to_string();
        }
    }

    // None found: use the first candidate and let errors surface per-poll.
    let default = DEFAULT_URLS[0];
    warn!(
        "RTL-SDR: no endpoint detected, defaulting to {default} — \
         make sure readsb, dump1090, or tar1090 is running, or set source.url"
    );
    default.to_string()
}

/// Parse a dump1090/readsb payload into flights.
///
/// The payload is either a bare list or an object with an `aircraft`
/// array; per-record keys vary across decoder versions, so every field
/// goes through an ordered candidate-key list.
pub fn parse_aircraft(data: &Value) -> Vec<Flight> {
    let list = match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match data.get("aircraft").and_then(Value::as_array) {
            Some(items) => items.as_slice(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut flights = Vec::new();
    for ac in list {
        if !ac.is_object() {
            continue;
        }

        let lat = pick_f64(ac, &["lat"]);
        let lon = pick_f64(ac, &["lon"]);
        if lat == 0.0 && lon == 0.0 {
            continue;
        }

        // "seen" = seconds since last message.
        if pick_f64(ac, &["seen"]) > MAX_SEEN_SECS {
            continue;
        }

        let hex = pick_str(ac, &["hex"]).to_lowercase();
        let alt_field = pick_str(ac, &["alt_baro"]);
        let on_ground =
            pick_bool(ac, &["ground", "on_ground"]) || alt_field.eq_ignore_ascii_case("ground");

        flights.push(Flight {
            hex_code: hex.clone(),
            flight_id: hex,
            callsign: pick_str(ac, &["flight", "call"]),
            aircraft_type: pick_str(ac, &["t", "type"]),
            registration: pick_str(ac, &["r", "reg"]),
            latitude: lat,
            longitude: lon,
            altitude: pick_i32(ac, &["alt_baro", "altitude", "alt"]),
            ground_speed: pick_i32(ac, &["gs", "speed", "spd"]),
            heading: pick_i32(ac, &["track", "heading", "trk"]),
            vertical_speed: pick_i32(ac, &["baro_rate", "vert_rate", "vspeed"]),
            squawk: pick_str(ac, &["squawk"]),
            on_ground,
            ..Default::default()
        });
    }

    flights
}

impl RawSource for RtlSdrSource {
    fn name(&self) -> &'static str {
        "RTLSDRSource"
    }

    fn fetch_raw(&mut self) -> Result<Vec<Flight>> {
        let data: Value = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(parse_aircraft(&data))
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
    fn test_parse_readsb_payload() {
        let data = json!({
            "now": 1718000000.0,
            "aircraft": [{
                "hex": "4CA7B4",
                "flight": "RYR4421 ",
                "t": "B738",
                "r": "EI-DCP",
                "lat": 51.55,
                "lon": -0.08,
                "alt_baro": 24500,
                "gs": 412.3,
                "track": 310.0,
                "baro_rate": 1200,
                "squawk": "7402",
                "seen": 0.4
            }]
        });
        let flights = parse_aircraft(&data);
        assert_eq!(flights.len(), 1);
        let f = &flights[0];
        assert_eq!(f.hex_code, "4ca7b4");
        assert_eq!(f.flight_id, "4ca7b4");
        assert_eq!(f.callsign, "RYR4421");
        assert_eq!(f.aircraft_type, "B738");
        assert_eq!(f.registration, "EI-DCP");
        assert_eq!(f.altitude, 24500);
        assert_eq!(f.ground_speed, 412);
        assert_eq!(f.heading, 310);
        assert_eq!(f.vertical_speed, 1200);
        assert_eq!(f.squawk, "7402");
        assert!(!f.on_ground);
    }

    #[test]
    fn test_parse_bare_list() {
        let data = json!([
            {"hex": "abc123", "lat": 51.5, "lon": -0.1, "altitude": 10000, "speed": 250}
        ]);
        let flights = parse_aircraft(&data);
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].altitude, 10000);
        assert_eq!(flights[0].ground_speed, 250);
    }

    #[test]
    fn test_parse_alternate_key_names() {
        let data = json!([
            {"hex": "abc123", "call": "BAW117", "lat": 51.5, "lon": -0.1,
             "alt": 38000, "spd": 487, "trk": 285, "vspeed": -200}
        ]);
        let f = &parse_aircraft(&data)[0];
        assert_eq!(f.callsign, "BAW117");
        assert_eq!(f.altitude, 38000);
        assert_eq!(f.ground_speed, 487);
        assert_eq!(f.heading, 285);
        assert_eq!(f.vertical_speed, -200);
    }

    #[test]
    fn test_stale_records_dropped() {
        let data = json!({"aircraft": [
            {"hex": "a", "lat": 51.5, "lon": -0.1, "seen": 120.0},
            {"hex": "b", "lat": 51.5, "lon": -0.1, "seen": 2.0}
        ]});
        let flights = parse_aircraft(&data);
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].hex_code, "b");
    }

    #[test]
    fn test_ground_string_altitude() {
        let data = json!({"aircraft": [
            {"hex": "a", "lat": 51.5, "lon": -0.1, "alt_baro": "ground"}
        ]});
        let flights = parse_aircraft(&data);
        assert!(flights[0].on_ground);
        assert_eq!(flights[0].altitude, 0);
    }

    #[test]
    fn test_missing_position_dropped() {
        let data = json!({"aircraft": [{"hex": "a", "alt_baro": 30000}]});
        assert!(parse_aircraft(&data).is_empty());
    }

    #[test]
    fn test_non_object_entries_ignored() {
        let data = json!({"aircraft": [42, "junk", {"hex": "a", "lat": 51.5, "lon": -0.1}]});
        assert_eq!(parse_aircraft(&data).len(), 1);
    }

    #[test]
    fn test_unexpected_shape_yields_empty() {
        assert!(parse_aircraft(&json!("nope")).is_empty());
        assert!(parse_aircraft(&json!({"messages": 12})).is_empty());
    }
}
