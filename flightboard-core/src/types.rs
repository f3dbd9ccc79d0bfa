//! Shared types and error enum for flightboard-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by flightboard-core.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("unexpected payload: {0}")]
    Parse(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;

// ---------------------------------------------------------------------------
// Flight record
// ---------------------------------------------------------------------------

/// One aircraft at one moment, normalized across all providers.
///
/// Absence of data is always the empty string or zero, never an
/// `Option` — the enrichment engine fills only fields that are still
/// at their default, so "empty" and "unknown" are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Flight {
    pub callsign: String,
    pub airline: String,
    pub aircraft_type: String,
    pub registration: String,
    pub origin_iata: String,
    pub origin_name: String,
    pub destination_iata: String,
    pub destination_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Barometric altitude, feet.
    pub altitude: i32,
    /// Ground speed, knots.
    pub ground_speed: i32,
    /// Track, degrees.
    pub heading: i32,
    /// Vertical rate, ft/min.
    pub vertical_speed: i32,
    /// Great-circle distance from the observer, nautical miles.
    pub distance_nm: f64,
    pub squawk: String,
    /// Provider-assigned opaque identifier.
    pub flight_id: String,
    pub on_ground: bool,
    /// ICAO 24-bit address as lowercase hex.
    pub hex_code: String,
}

impl Flight {
    /// True if the record carries a usable position.
    pub fn has_position(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
