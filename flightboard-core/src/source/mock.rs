//! Built-in synthetic source for development without hardware or API
//! keys. A fixed roster of plausible flights with small per-fetch
//! jitter on altitude, speed, and distance.

use rand::Rng;

use crate::types::{Flight, Result};

use super::RawSource;

/// Radius passed to the wrapper for this source — wide enough that
/// the whole roster always survives the filter.
pub const MOCK_RADIUS_NM: f64 = 999.0;

struct Roster {
    callsign: &'static str,
    airline: &'static str,
    aircraft_type: &'static str,
    registration: &'static str,
    origin_iata: &'static str,
    origin_name: &'static str,
    destination_iata: &'static str,
    destination_name: &'static str,
    latitude: f64,
    longitude: f64,
    altitude: i32,
    ground_speed: i32,
    heading: i32,
    vertical_speed: i32,
    distance_nm: f64,
    squawk: &'static str,
    flight_id: &'static str,
}

#[rustfmt::skip]
const ROSTER: &[Roster] = &[
    Roster { callsign: "BA117",   airline: "BRITISH AIRWAYS", aircraft_type: "B777", registration: "G-VIIA",
             origin_iata: "LHR", origin_name: "LONDON HEATHROW", destination_iata: "JFK", destination_name: "NEW YORK JFK",
             latitude: 51.52, longitude: -0.15, altitude: 38000, ground_speed: 487, heading: 285, vertical_speed: -200,
             distance_nm: 1.2, squawk: "4521", flight_id: "mock1" },
    Roster { callsign: "RYR4421", airline: "RYANAIR", aircraft_type: "B738", registration: "EI-DCP",
             origin_iata: "STN", origin_name: "LONDON STANSTED", destination_iata: "DUB", destination_name: "DUBLIN",
             latitude: 51.55, longitude: -0.08, altitude: 24500, ground_speed: 412, heading: 310, vertical_speed: 1200,
             distance_nm: 3.8, squawk: "7402", flight_id: "mock2" },
    Roster { callsign: "EZY6012", airline: "EASYJET", aircraft_type: "A320", registration: "G-EZWB",
             origin_iata: "LGW", origin_name: "LONDON GATWICK", destination_iata: "EDI", destination_name: "EDINBURGH",
             latitude: 51.48, longitude: -0.20, altitude: 31000, ground_speed: 445, heading: 350, vertical_speed: 0,
             distance_nm: 5.1, squawk: "0521", flight_id: "mock3" },
    Roster { callsign: "VIR401",  airline: "VIRGIN ATLANTIC", aircraft_type: "A350", registration: "G-VLUX",
             origin_iata: "LHR", origin_name: "LONDON HEATHROW", destination_iata: "LAX", destination_name: "LOS ANGELES",
             latitude: 51.60, longitude: -0.05, altitude: 36000, ground_speed: 502, heading: 270, vertical_speed: 100,
             distance_nm: 7.4, squawk: "2204", flight_id: "mock4" },
    Roster { callsign: "DLH902",  airline: "LUFTHANSA", aircraft_type: "A321", registration: "D-AISP",
             origin_iata: "FRA", origin_name: "FRANKFURT", destination_iata: "LHR", destination_name: "LONDON HEATHROW",
             latitude: 51.45, longitude: -0.22, altitude: 18500, ground_speed: 320, heading: 245, vertical_speed: -800,
             distance_nm: 2.9, squawk: "1000", flight_id: "mock5" },
    Roster { callsign: "KLM642",  airline: "KLM ROYAL DUTCH", aircraft_type: "E190", registration: "PH-EZK",
             origin_iata: "AMS", origin_name: "AMSTERDAM", destination_iata: "LHR", destination_name: "LONDON HEATHROW",
             latitude: 51.53, longitude: -0.10, altitude: 12000, ground_speed: 280, heading: 230, vertical_speed: -1500,
             distance_nm: 1.5, squawk: "7620", flight_id: "mock6" },
    Roster { callsign: "AFR1234", airline: "AIR FRANCE", aircraft_type: "A220", registration: "F-HZUA",
             origin_iata: "CDG", origin_name: "PARIS CDG", destination_iata: "MAN", destination_name: "MANCHESTER",
             latitude: 51.58, longitude: -0.18, altitude: 35000, ground_speed: 460, heading: 330, vertical_speed: 0,
             distance_nm: 9.2, squawk: "1234", flight_id: "mock7" },
    Roster { callsign: "UAE32",   airline: "EMIRATES", aircraft_type: "A380", registration: "A6-EDB",
             origin_iata: "DXB", origin_name: "DUBAI", destination_iata: "LHR", destination_name: "LONDON HEATHROW",
             latitude: 51.50, longitude: -0.12, altitude: 8500, ground_speed: 210, heading: 260, vertical_speed: -2000,
             distance_nm: 0.8, squawk: "6101", flight_id: "mock8" },
];

#[derive(Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        MockSource
    }
}

impl RawSource for MockSource {
    fn name(&self) -> &'static str {
        "MockSource"
    }

    fn fetch_raw(&mut self) -> Result<Vec<Flight>> {
        let mut rng = rand::thread_rng();
        Ok(ROSTER
            .iter()
            .map(|r| Flight {
                callsign: r.callsign.to_string(),
                airline: r.airline.to_string(),
                aircraft_type: r.aircraft_type.to_string(),
                registration: r.registration.to_string(),
                origin_iata: r.origin_iata.to_string(),
                origin_name: r.origin_name.to_string(),
                destination_iata: r.destination_iata.to_string(),
                destination_name: r.destination_name.to_string(),
                latitude: r.latitude,
                longitude: r.longitude,
                altitude: r.altitude + rng.gen_range(-500..=500),
                ground_speed: r.ground_speed + rng.gen_range(-10..=10),
                heading: r.heading,
                vertical_speed: r.vertical_speed,
                distance_nm: ((r.distance_nm + rng.gen_range(-0.5..0.5)).max(0.1) * 10.0).round()
                    / 10.0,
                squawk: r.squawk.to_string(),
                flight_id: r.flight_id.to_string(),
                ..Default::default()
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
