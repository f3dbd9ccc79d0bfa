//! flightboard-core: live flight acquisition + metadata enrichment.
//!
//! Polls a configurable data source (RTL-SDR JSON feed, FlightRadar24,
//! OpenSky, or built-in mock), filters to airborne traffic near an
//! observer, and fills metadata gaps from a local SQLite store, a
//! built-in airline table, and an optional remote route API. Blocking
//! I/O throughout — callers drive the poll cadence.

pub mod airlines;
pub mod config;
pub mod enrich;
pub mod extract;
pub mod geo;
pub mod source;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{load_config, Config};
pub use enrich::Enricher;
pub use source::{create_source, FlightSource};
pub use store::MetadataStore;
pub use types::{BoardError, Flight, Result};
