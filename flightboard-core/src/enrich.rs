//! Flight metadata enrichment — fill gaps, never overwrite.
//!
//! Four tiers, cheapest first: local aircraft registry by hex code,
//! built-in airline table by callsign prefix, cached route rows, and
//! finally a budget-limited remote route lookup (AirLabs). Every tier
//! only fills fields the provider left empty.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::airlines::airline_for_prefix;
use crate::config::EnrichmentConfig;
use crate::extract::pick_str;
use crate::store::{AircraftRecord, AirportRecord, MetadataStore, RouteRecord};
use crate::types::Flight;

const AIRLABS_BASE: &str = "https://airlabs.co/api/v9";

/// Fills flight metadata gaps from local and remote sources.
pub struct Enricher {
    store: Option<MetadataStore>,
    api_key: String,
    client: Option<reqwest::blocking::Client>,
    /// Callsigns already attempted remotely this session.
    route_misses: HashSet<String>,
    api_calls: u32,
    max_api_calls: u32,
}

impl Enricher {
    pub fn new(config: &EnrichmentConfig) -> Self {
        let store = match MetadataStore::open(&config.database) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("Metadata store unavailable ({e}) - enrichment limited to built-in data");
                None
            }
        };
        Enricher {
            store,
            api_key: config.airlabs_api_key.clone(),
            client: None,
            route_misses: HashSet::new(),
            api_calls: 0,
            max_api_calls: config.max_api_calls_per_session,
        }
    }

    /// Build from parts, mainly for tests with an in-memory store.
    pub fn with_store(store: MetadataStore, api_key: &str, max_api_calls: u32) -> Self {
        Enricher {
            store: Some(store),
            api_key: api_key.to_string(),
            client: None,
            route_misses: HashSet::new(),
            api_calls: 0,
            max_api_calls,
        }
    }

    pub fn store(&self) -> Option<&MetadataStore> {
        self.store.as_ref()
    }

    pub fn api_calls(&self) -> u32 {
        self.api_calls
    }

    /// Fill metadata gaps on a single flight.
    pub fn enrich(&mut self, flight: &mut Flight) {
        // Tier 1: local aircraft registry by hex code.
        if !flight.hex_code.is_empty() {
            if let Some(rec) = self
                .store
                .as_ref()
                .and_then(|s| s.get_aircraft(&flight.hex_code))
            {
                fill(&mut flight.registration, &rec.registration);
                fill(&mut flight.aircraft_type, &rec.typecode);
                fill(&mut flight.airline, &rec.operator);
                fill(&mut flight.airline, &rec.owner);
            }
        }

        // Tier 2: built-in airline table by callsign prefix.
        let callsign = flight.callsign.trim().to_uppercase();
        if flight.airline.is_empty() {
            if let Some(name) = prefix_airline(&callsign) {
                flight.airline = name.to_string();
            }
        }

        // Route tiers only run while an endpoint is still unknown.
        if callsign.is_empty() || !needs_route(flight) {
            return;
        }

        // Tier 3: cached route. A fresh negative entry also ends here,
        // suppressing remote retries until it expires.
        if let Some(route) = self.store.as_ref().and_then(|s| s.get_route(&callsign)) {
            apply_route(flight, &route);
            return;
        }

        // Tier 4: remote lookup, only when the session budget allows it.
        if self.api_key.is_empty()
            || self.route_misses.contains(&callsign)
            || self.api_calls >= self.max_api_calls
        {
            return;
        }
        self.remote_route_lookup(flight, &callsign);
    }

    // -----------------------------------------------------------------------
    // Remote lookups
    // -----------------------------------------------------------------------

    fn client(&mut self) -> &reqwest::blocking::Client {
        self.client.get_or_insert_with(|| {
            reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default()
        })
    }

    fn remote_route_lookup(&mut self, flight: &mut Flight, callsign: &str) {
        self.api_calls += 1;
        debug!(
            "Route lookup {callsign} ({}/{} API calls)",
            self.api_calls, self.max_api_calls
        );

        let api_key = self.api_key.clone();
        let resp = self
            .client()
            .get(format!("{AIRLABS_BASE}/flights"))
            .query(&[("api_key", api_key.as_str()), ("flight_icao", callsign)])
            .send();

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                warn!("Route lookup failed for {callsign}: {e}");
                self.route_misses.insert(callsign.to_string());
                return;
            }
        };

        match resp.status().as_u16() {
            401 | 403 => {
                error!("Route API key rejected - disabling remote lookups");
                self.api_key.clear();
            }
            429 => {
                error!("Route API rate limit hit - disabling remote lookups this session");
                self.api_calls = self.max_api_calls;
            }
            s if s >= 400 => {
                warn!("Route lookup for {callsign} returned HTTP {s}");
                self.route_misses.insert(callsign.to_string());
            }
            _ => match resp.json::<Value>() {
                Ok(payload) => self.apply_remote_payload(flight, callsign, &payload),
                Err(e) => {
                    warn!("Route lookup for {callsign} returned bad JSON: {e}");
                    self.route_misses.insert(callsign.to_string());
                }
            },
        }
    }

    /// Apply a remote route payload to a flight, caching whatever it
    /// carried. An empty match list becomes a negative cache entry.
    fn apply_remote_payload(&mut self, flight: &mut Flight, callsign: &str, payload: &Value) {
        let item = match payload
            .get("response")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
        {
            Some(v @ Value::Object(_)) => v,
            _ => {
                debug!("No route match for {callsign}");
                self.route_misses.insert(callsign.to_string());
                if let Some(store) = self.store.as_ref() {
                    let _ = store.cache_route(&RouteRecord {
                        callsign: callsign.to_string(),
                        source: "airlabs".into(),
                        ..Default::default()
                    });
                }
                return;
            }
        };

        let dep_iata = pick_str(item, &["dep_iata"]);
        let arr_iata = pick_str(item, &["arr_iata"]);
        let mut airline_name = pick_str(item, &["airline_name"]);
        if airline_name.is_empty() {
            if let Some(name) = prefix_airline(callsign) {
                airline_name = name.to_string();
            }
        }

        let route = RouteRecord {
            callsign: callsign.to_string(),
            dep_name: self.airport_name(&dep_iata),
            arr_name: self.airport_name(&arr_iata),
            dep_iata,
            dep_icao: pick_str(item, &["dep_icao"]),
            arr_iata,
            arr_icao: pick_str(item, &["arr_icao"]),
            airline_name,
            aircraft_icao: pick_str(item, &["aircraft_icao"]),
            flight_iata: pick_str(item, &["flight_iata"]),
            source: "airlabs".into(),
        };

        if let Some(store) = self.store.as_ref() {
            if let Err(e) = store.cache_route(&route) {
                warn!("Could not cache route for {callsign}: {e}");
            }

            // Aircraft metadata riding along on the route payload.
            let hex = pick_str(item, &["hex"]).to_lowercase();
            if !hex.is_empty() {
                let _ = store.upsert_aircraft(&AircraftRecord {
                    hex,
                    registration: pick_str(item, &["reg_number"]),
                    typecode: pick_str(item, &["aircraft_icao"]),
                    operator: route.airline_name.clone(),
                    source: "airlabs".into(),
                    ..Default::default()
                });
            }
        }

        if route.has_data() {
            info!(
                "Route {callsign}: {} -> {}",
                display_or(&route.dep_iata, "?"),
                display_or(&route.arr_iata, "?")
            );
        }
        apply_route(flight, &route);
    }

    /// Resolve an airport display name, preferring the local cache.
    /// Falls back to the bare code when nothing better is known.
    fn airport_name(&mut self, iata: &str) -> String {
        if iata.is_empty() {
            return String::new();
        }
        if let Some(apt) = self.store.as_ref().and_then(|s| s.get_airport(iata)) {
            if !apt.name.is_empty() {
                return apt.name;
            }
        }

        if self.api_key.is_empty() || self.api_calls >= self.max_api_calls {
            return iata.to_string();
        }
        self.api_calls += 1;

        let api_key = self.api_key.clone();
        let resp = self
            .client()
            .get(format!("{AIRLABS_BASE}/airports"))
            .query(&[("api_key", api_key.as_str()), ("iata_code", iata)])
            .send();

        let payload: Value = match resp.and_then(|r| r.error_for_status()).and_then(|r| r.json()) {
            Ok(v) => v,
            Err(e) => {
                debug!("Airport lookup failed for {iata}: {e}");
                return iata.to_string();
            }
        };

        let item = match payload
            .get("response")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
        {
            Some(v) => v,
            None => return iata.to_string(),
        };

        let name = pick_str(item, &["name"]);
        if name.is_empty() {
            return iata.to_string();
        }

        if let Some(store) = self.store.as_ref() {
            let _ = store.upsert_airport(&AirportRecord {
                iata: iata.to_string(),
                icao: pick_str(item, &["icao_code"]),
                name: name.clone(),
                city: pick_str(item, &["city"]),
                country: pick_str(item, &["country_code"]),
                lat: item.get("lat").and_then(Value::as_f64).unwrap_or(0.0),
                lon: item.get("lng").and_then(Value::as_f64).unwrap_or(0.0),
                source: "airlabs".into(),
            });
        }
        name
    }
}

/// Airline name for an airline-style callsign: three alphabetic
/// characters followed by a flight number. Bare three-letter callsigns
/// and non-ASCII prefixes never match. Char-based, so arbitrary
/// provider strings cannot slice mid-character.
fn prefix_airline(callsign: &str) -> Option<&'static str> {
    if callsign.chars().count() < 4 {
        return None;
    }
    let prefix: String = callsign.chars().take(3).collect();
    if !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    airline_for_prefix(&prefix)
}

/// Set `dst` from `src` only when `dst` is empty and `src` is not.
fn fill(dst: &mut String, src: &str) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src.to_string();
    }
}

fn needs_route(flight: &Flight) -> bool {
    flight.origin_iata.is_empty() || flight.destination_iata.is_empty()
}

fn apply_route(flight: &mut Flight, route: &RouteRecord) {
    fill(&mut flight.origin_iata, &route.dep_iata);
    fill(&mut flight.origin_name, &route.dep_name);
    fill(&mut flight.destination_iata, &route.arr_iata);
    fill(&mut flight.destination_name, &route.arr_name);
    fill(&mut flight.airline, &route.airline_name);
    fill(&mut flight.aircraft_type, &route.aircraft_icao);
}

fn display_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.is_empty() {
        fallback
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
