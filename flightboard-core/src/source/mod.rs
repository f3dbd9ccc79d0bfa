//! Provider abstraction — one capability trait plus a shared wrapper.
//!
//! A source only has to produce unfiltered records (`fetch_raw`); the
//! `FlightSource` wrapper owns the TTL cache and the ground/altitude/
//! radius filtering and distance sort, identically for every provider.

use std::time::{Duration, Instant};

use log::{error, info};

use crate::geo::haversine_nm;
use crate::types::{Flight, Result};

pub mod factory;
pub mod fr24;
pub mod mock;
pub mod opensky;
pub mod rtlsdr;

pub use factory::create_source;

/// Default poll cache TTL.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

/// Capability contract for a flight data source.
///
/// Implementations do source-specific I/O and parsing only; filtering,
/// sorting, and caching live in [`FlightSource`].
pub trait RawSource {
    fn name(&self) -> &'static str;

    /// Fetch unfiltered records from the source.
    fn fetch_raw(&mut self) -> Result<Vec<Flight>>;

    /// How long a successful fetch stays valid.
    fn cache_ttl(&self) -> Duration {
        DEFAULT_CACHE_TTL
    }

    /// Keep records outside the search radius. Only the FR24 sandbox
    /// sets this: sandbox data is synthetic and rarely in-radius.
    fn keep_out_of_range(&self) -> bool {
        false
    }
}

/// A raw source composed with the shared caching/filtering/sorting
/// wrapper. This is what poll cycles talk to.
pub struct FlightSource {
    inner: Box<dyn RawSource>,
    lat: f64,
    lon: f64,
    radius_nm: f64,
    cache: Vec<Flight>,
    last_fetch: Option<Instant>,
}

impl FlightSource {
    pub fn new(inner: Box<dyn RawSource>, lat: f64, lon: f64, radius_nm: f64) -> Self {
        FlightSource {
            inner,
            lat,
            lon,
            radius_nm,
            cache: Vec::new(),
            last_fetch: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Fetch, filter by radius, sort by distance. Uses the cache.
    ///
    /// Never fails: any error during fetch or parse is logged and the
    /// previous cache is returned unchanged — stale beats missing.
    pub fn fetch_flights(&mut self) -> Vec<Flight> {
        if let Some(t) = self.last_fetch {
            if t.elapsed() < self.inner.cache_ttl() && !self.cache.is_empty() {
                return self.cache.clone();
            }
        }

        let raw = match self.inner.fetch_raw() {
            Ok(raw) => raw,
            Err(e) => {
                error!("{} error: {e}", self.inner.name());
                return self.cache.clone();
            }
        };

        let keep_out_of_range = self.inner.keep_out_of_range();
        let mut flights = Vec::new();
        for mut f in raw {
            // Taxiing or parked: explicit ground flag, or slow and low.
            if f.on_ground || (f.altitude < 100 && f.ground_speed < 50) {
                continue;
            }
            if !f.has_position() {
                continue;
            }
            f.distance_nm =
                (haversine_nm(self.lat, self.lon, f.latitude, f.longitude) * 10.0).round() / 10.0;
            if !keep_out_of_range && f.distance_nm > self.radius_nm {
                continue;
            }
            flights.push(f);
        }

        flights.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));
        self.cache = flights;
        self.last_fetch = Some(Instant::now());
        info!(
            "{}: {} aircraft within {}nm",
            self.inner.name(),
            self.cache.len(),
            self.radius_nm
        );
        self.cache.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
