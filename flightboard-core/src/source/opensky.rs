//! OpenSky Network REST API source (free, rate-limited).
//!
//! Anonymous access is limited to ~10 req/min; basic auth raises the
//! limit. The upstream itself only refreshes every ~10 seconds, so
//! this source carries a longer cache TTL than the default.

use std::time::Duration;

use log::info;
use serde_json::Value;

use crate::extract::{index_f64, index_str};
use crate::geo::BoundingBox;
use crate::types::{Flight, Result};

use super::RawSource;

const API_URL: &str = "https://opensky-network.org/api/states/all";

const CACHE_TTL: Duration = Duration::from_secs(10);

/// A state vector with fewer elements than this is dropped.
const MIN_STATE_LEN: usize = 17;

const METERS_TO_FEET: f64 = 3.28084;
const MS_TO_KNOTS: f64 = 1.94384;
const MS_TO_FPM: f64 = 196.85;

pub struct OpenSkySource {
    client: reqwest::blocking::Client,
    username: String,
    password: String,
    lat: f64,
    lon: f64,
    radius_nm: f64,
}

impl OpenSkySource {
    pub fn new(lat: f64, lon: f64, radius_nm: f64, username: String, password: String) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        info!(
            "OpenSky: {} mode",
            if username.is_empty() { "anonymous" } else { "authenticated" }
        );
        OpenSkySource {
            client,
            username,
            password,
            lat,
            lon,
            radius_nm,
        }
    }
}

/// Parse the `states` array of positional state vectors.
///
/// Index meaning: 0 icao24, 1 callsign, 5 longitude, 6 latitude,
/// 7 baro altitude m (13 geo altitude fallback), 8 on_ground,
/// 9 velocity m/s, 10 true track deg, 11 vertical rate m/s, 14 squawk.
pub fn parse_states(data: &Value) -> Vec<Flight> {
    let states = match data.get("states").and_then(Value::as_array) {
        Some(s) => s,
        None => return Vec::new(),
    };

    let mut flights = Vec::new();
    for state in states {
        let s = match state.as_array() {
            Some(s) => s,
            None => continue,
        };
        if s.len() < MIN_STATE_LEN {
            continue;
        }

        let lat = index_f64(s, 6);
        let lon = index_f64(s, 5);
        if lat == 0.0 && lon == 0.0 {
            continue;
        }

        let mut alt_m = index_f64(s, 7);
        if alt_m == 0.0 {
            alt_m = index_f64(s, 13);
        }
        let spd_ms = index_f64(s, 9);
        let vs_ms = index_f64(s, 11);

        let hex = index_str(s, 0).to_lowercase();
        flights.push(Flight {
            hex_code: hex.clone(),
            flight_id: hex,
            callsign: index_str(s, 1),
            latitude: lat,
            longitude: lon,
            altitude: (alt_m * METERS_TO_FEET) as i32,
            ground_speed: (spd_ms * MS_TO_KNOTS) as i32,
            heading: index_f64(s, 10) as i32,
            vertical_speed: (vs_ms * MS_TO_FPM) as i32,
            squawk: index_str(s, 14),
            on_ground: s.get(8).and_then(Value::as_bool).unwrap_or(false),
            ..Default::default()
        });
    }

    flights
}

impl RawSource for OpenSkySource {
    fn name(&self) -> &'static str {
        "OpenSkySource"
    }

    fn cache_ttl(&self) -> Duration {
        CACHE_TTL
    }

    fn fetch_raw(&mut self) -> Result<Vec<Flight>> {
        let bb = BoundingBox::around(self.lat, self.lon, self.radius_nm);
        let mut req = self.client.get(API_URL).query(&[
            ("lamin", bb.lat_min),
            ("lamax", bb.lat_max),
            ("lomin", bb.lon_min),
            ("lomax", bb.lon_max),
        ]);
        if !self.username.is_empty() {
            req = req.basic_auth(&self.username, Some(&self.password));
        }

        let data: Value = req.send()?.error_for_status()?.json()?;
        Ok(parse_states(&data))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_state() -> Value {
        json!([
            "4ca7b4", "RYR4421 ", "Ireland", 1718000000, 1718000001,
            -0.08, 51.55, 7467.6, false, 212.0, 310.0, 6.1,
            null, 7500.0, "7402", false, 0
        ])
    }

    #[test]
    fn test_parse_state_vector() {
        let data = json!({"time": 1718000000, "states": [full_state()]});
        let flights = parse_states(&data);
        assert_eq!(flights.len(), 1);
        let f = &flights[0];
        assert_eq!(f.hex_code, "4ca7b4");
        assert_eq!(f.callsign, "RYR4421");
        assert_eq!(f.latitude, 51.55);
        assert_eq!(f.longitude, -0.08);
        // 7467.6 m = ~24500 ft
        assert_eq!(f.altitude, 24500);
        // 212 m/s = ~412 kn
        assert_eq!(f.ground_speed, 412);
        assert_eq!(f.heading, 310);
        // 6.1 m/s = ~1200 ft/min
        assert_eq!(f.vertical_speed, 1200);
        assert_eq!(f.squawk, "7402");
        assert!(!f.on_ground);
    }

    #[test]
    fn test_short_state_dropped() {
        let data = json!({"states": [["4ca7b4", "RYR4421", "Ireland", 0, 0, -0.08, 51.55]]});
        assert!(parse_states(&data).is_empty());
    }

    #[test]
    fn test_geo_altitude_fallback() {
        let mut s = full_state();
        s[7] = json!(null);
        let data = json!({"states": [s]});
        let f = &parse_states(&data)[0];
        // Falls back to index 13 (7500 m geo altitude)
        assert_eq!(f.altitude, (7500.0 * METERS_TO_FEET) as i32);
    }

    #[test]
    fn test_on_ground_flag() {
        let mut s = full_state();
        s[8] = json!(true);
        let data = json!({"states": [s]});
        assert!(parse_states(&data)[0].on_ground);
    }

    #[test]
    fn test_missing_states_key() {
        assert!(parse_states(&json!({"time": 0, "states": null})).is_empty());
        assert!(parse_states(&json!({})).is_empty());
    }

    #[test]
    fn test_no_position_dropped() {
        let mut s = full_state();
        s[5] = json!(null);
        s[6] = json!(null);
        let data = json!({"states": [s]});
        assert!(parse_states(&data).is_empty());
    }

    #[test]
    fn test_cache_ttl_is_ten_seconds() {
        let src = OpenSkySource::new(51.5, -0.1, 10.0, String::new(), String::new());
        assert_eq!(src.cache_ttl(), Duration::from_secs(10));
    }
}
