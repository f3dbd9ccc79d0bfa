//! SQLite metadata store — aircraft registry, route cache, airport names.
//!
//! Three tables keyed by hex code, callsign, and IATA code. Aircraft
//! writes are fill-gap only: an empty incoming field never clobbers a
//! populated one. Route rows expire after 24 hours; empty origin and
//! destination fields are a valid negative entry that suppresses
//! repeat lookups until expiry.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::types::Result;

/// Route cache rows older than this are treated as absent.
pub const ROUTE_TTL_SECS: f64 = 24.0 * 3600.0;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS aircraft (
    hex TEXT PRIMARY KEY,
    registration TEXT DEFAULT '',
    typecode TEXT DEFAULT '',
    model TEXT DEFAULT '',
    operator TEXT DEFAULT '',
    operator_icao TEXT DEFAULT '',
    operator_iata TEXT DEFAULT '',
    owner TEXT DEFAULT '',
    source TEXT DEFAULT '',
    updated_at REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS routes (
    callsign TEXT PRIMARY KEY,
    dep_iata TEXT DEFAULT '',
    dep_icao TEXT DEFAULT '',
    dep_name TEXT DEFAULT '',
    arr_iata TEXT DEFAULT '',
    arr_icao TEXT DEFAULT '',
    arr_name TEXT DEFAULT '',
    airline_name TEXT DEFAULT '',
    aircraft_icao TEXT DEFAULT '',
    flight_iata TEXT DEFAULT '',
    source TEXT DEFAULT '',
    updated_at REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS airports (
    iata TEXT PRIMARY KEY,
    icao TEXT DEFAULT '',
    name TEXT DEFAULT '',
    city TEXT DEFAULT '',
    country TEXT DEFAULT '',
    lat REAL DEFAULT 0,
    lon REAL DEFAULT 0,
    source TEXT DEFAULT '',
    updated_at REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_aircraft_registration ON aircraft(registration);
CREATE INDEX IF NOT EXISTS idx_routes_updated ON routes(updated_at);
"#;

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Aircraft registry row. Empty string means unknown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AircraftRecord {
    pub hex: String,
    pub registration: String,
    pub typecode: String,
    pub model: String,
    pub operator: String,
    pub operator_icao: String,
    pub operator_iata: String,
    pub owner: String,
    pub source: String,
}

/// Cached route row. Empty dep/arr fields mark a negative entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteRecord {
    pub callsign: String,
    pub dep_iata: String,
    pub dep_icao: String,
    pub dep_name: String,
    pub arr_iata: String,
    pub arr_icao: String,
    pub arr_name: String,
    pub airline_name: String,
    pub aircraft_icao: String,
    pub flight_iata: String,
    pub source: String,
}

impl RouteRecord {
    /// A negative entry has neither endpoint resolved.
    pub fn has_data(&self) -> bool {
        !self.dep_iata.is_empty() || !self.arr_iata.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AirportRecord {
    pub iata: String,
    pub icao: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub total_aircraft: i64,
    pub with_typecode: i64,
    pub with_registration: i64,
    pub routes_cached: i64,
    pub routes_with_data: i64,
    pub airports_cached: i64,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// SQLite-backed metadata store.
pub struct MetadataStore {
    conn: Connection,
}

impl MetadataStore {
    /// Open or create a store at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            Connection::open(path)?
        };

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(MetadataStore { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    // -----------------------------------------------------------------------
    // Aircraft
    // -----------------------------------------------------------------------

    /// Insert or fill-gap update an aircraft row. Existing non-empty
    /// fields are never overwritten.
    pub fn upsert_aircraft(&self, rec: &AircraftRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO aircraft
             (hex, registration, typecode, model, operator, operator_icao,
              operator_iata, owner, source, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(hex) DO UPDATE SET
                 registration = CASE WHEN registration = '' THEN excluded.registration ELSE registration END,
                 typecode = CASE WHEN typecode = '' THEN excluded.typecode ELSE typecode END,
                 model = CASE WHEN model = '' THEN excluded.model ELSE model END,
                 operator = CASE WHEN operator = '' THEN excluded.operator ELSE operator END,
                 operator_icao = CASE WHEN operator_icao = '' THEN excluded.operator_icao ELSE operator_icao END,
                 operator_iata = CASE WHEN operator_iata = '' THEN excluded.operator_iata ELSE operator_iata END,
                 owner = CASE WHEN owner = '' THEN excluded.owner ELSE owner END,
                 source = CASE WHEN source = '' THEN excluded.source ELSE source END,
                 updated_at = excluded.updated_at",
            params![
                rec.hex.to_lowercase(),
                rec.registration,
                rec.typecode,
                rec.model,
                rec.operator,
                rec.operator_icao,
                rec.operator_iata,
                rec.owner,
                rec.source,
                now()
            ],
        )?;
        Ok(())
    }

    pub fn get_aircraft(&self, hex: &str) -> Option<AircraftRecord> {
        self.conn
            .query_row(
                "SELECT hex, registration, typecode, model, operator, operator_icao,
                        operator_iata, owner, source
                 FROM aircraft WHERE hex = ?1",
                params![hex.to_lowercase()],
                |r| {
                    Ok(AircraftRecord {
                        hex: r.get(0)?,
                        registration: r.get(1)?,
                        typecode: r.get(2)?,
                        model: r.get(3)?,
                        operator: r.get(4)?,
                        operator_icao: r.get(5)?,
                        operator_iata: r.get(6)?,
                        owner: r.get(7)?,
                        source: r.get(8)?,
                    })
                },
            )
            .ok()
    }

    // -----------------------------------------------------------------------
    // Routes
    // -----------------------------------------------------------------------

    /// Cache a route lookup result. Negative entries (empty endpoints)
    /// are cached too so misses are not retried for 24 hours.
    pub fn cache_route(&self, rec: &RouteRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO routes
             (callsign, dep_iata, dep_icao, dep_name, arr_iata, arr_icao,
              arr_name, airline_name, aircraft_icao, flight_iata, source, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                rec.callsign.to_uppercase(),
                rec.dep_iata,
                rec.dep_icao,
                rec.dep_name,
                rec.arr_iata,
                rec.arr_icao,
                rec.arr_name,
                rec.airline_name,
                rec.aircraft_icao,
                rec.flight_iata,
                rec.source,
                now()
            ],
        )?;
        Ok(())
    }

    /// Get a route row if one exists and is fresher than 24 hours.
    pub fn get_route(&self, callsign: &str) -> Option<RouteRecord> {
        let cutoff = now() - ROUTE_TTL_SECS;
        self.conn
            .query_row(
                "SELECT callsign, dep_iata, dep_icao, dep_name, arr_iata, arr_icao,
                        arr_name, airline_name, aircraft_icao, flight_iata, source
                 FROM routes WHERE callsign = ?1 AND updated_at >= ?2",
                params![callsign.to_uppercase(), cutoff],
                |r| {
                    Ok(RouteRecord {
                        callsign: r.get(0)?,
                        dep_iata: r.get(1)?,
                        dep_icao: r.get(2)?,
                        dep_name: r.get(3)?,
                        arr_iata: r.get(4)?,
                        arr_icao: r.get(5)?,
                        arr_name: r.get(6)?,
                        airline_name: r.get(7)?,
                        aircraft_icao: r.get(8)?,
                        flight_iata: r.get(9)?,
                        source: r.get(10)?,
                    })
                },
            )
            .ok()
    }

    /// Force a route row's timestamp (test hook for expiry behavior).
    #[cfg(test)]
    pub fn age_route(&self, callsign: &str, age_secs: f64) {
        let _ = self.conn.execute(
            "UPDATE routes SET updated_at = ?1 WHERE callsign = ?2",
            params![now() - age_secs, callsign.to_uppercase()],
        );
    }

    // -----------------------------------------------------------------------
    // Airports
    // -----------------------------------------------------------------------

    pub fn upsert_airport(&self, rec: &AirportRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO airports
             (iata, icao, name, city, country, lat, lon, source, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                rec.iata.to_uppercase(),
                rec.icao,
                rec.name,
                rec.city,
                rec.country,
                rec.lat,
                rec.lon,
                rec.source,
                now()
            ],
        )?;
        Ok(())
    }

    pub fn get_airport(&self, iata: &str) -> Option<AirportRecord> {
        self.conn
            .query_row(
                "SELECT iata, icao, name, city, country, lat, lon, source
                 FROM airports WHERE iata = ?1",
                params![iata.to_uppercase()],
                |r| {
                    Ok(AirportRecord {
                        iata: r.get(0)?,
                        icao: r.get(1)?,
                        name: r.get(2)?,
                        city: r.get(3)?,
                        country: r.get(4)?,
                        lat: r.get(5)?,
                        lon: r.get(6)?,
                        source: r.get(7)?,
                    })
                },
            )
            .ok()
    }

    // -----------------------------------------------------------------------
    // Registry import
    // -----------------------------------------------------------------------

    /// Bulk-import a registry CSV export keyed by an `icao24` column.
    /// Missing columns read as empty; existing populated fields are
    /// preserved. Returns the number of rows imported.
    pub fn import_registry_csv(&mut self, path: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let hex_col = col("icao24").ok_or_else(|| {
            crate::types::BoardError::Parse("registry CSV has no icao24 column".into())
        })?;
        let reg_col = col("registration");
        let type_col = col("typecode");
        let model_col = col("model");
        let op_col = col("operator");
        let op_icao_col = col("operatoricao");
        let op_iata_col = col("operatoriata");
        let owner_col = col("owner");

        let field = |rec: &csv::StringRecord, idx: Option<usize>| {
            idx.and_then(|i| rec.get(i))
                .unwrap_or("")
                .trim()
                .trim_matches('\'')
                .to_string()
        };

        let tx = self.conn.transaction()?;
        let mut imported = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO aircraft
                 (hex, registration, typecode, model, operator, operator_icao,
                  operator_iata, owner, source, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'registry', ?9)
                 ON CONFLICT(hex) DO UPDATE SET
                     registration = CASE WHEN registration = '' THEN excluded.registration ELSE registration END,
                     typecode = CASE WHEN typecode = '' THEN excluded.typecode ELSE typecode END,
                     model = CASE WHEN model = '' THEN excluded.model ELSE model END,
                     operator = CASE WHEN operator = '' THEN excluded.operator ELSE operator END,
                     operator_icao = CASE WHEN operator_icao = '' THEN excluded.operator_icao ELSE operator_icao END,
                     operator_iata = CASE WHEN operator_iata = '' THEN excluded.operator_iata ELSE operator_iata END,
                     owner = CASE WHEN owner = '' THEN excluded.owner ELSE owner END,
                     updated_at = excluded.updated_at",
            )?;

            let ts = now();
            for record in reader.records() {
                let record = record?;
                let hex = field(&record, Some(hex_col)).to_lowercase();
                if hex.is_empty() {
                    continue;
                }
                stmt.execute(params![
                    hex,
                    field(&record, reg_col),
                    field(&record, type_col),
                    field(&record, model_col),
                    field(&record, op_col),
                    field(&record, op_icao_col),
                    field(&record, op_iata_col),
                    field(&record, owner_col),
                    ts
                ])?;
                imported += 1;
            }
        }
        tx.commit()?;

        info!("Imported {imported} registry rows");
        Ok(imported)
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> StoreStats {
        let count = |sql: &str| -> i64 {
            self.conn.query_row(sql, [], |r| r.get(0)).unwrap_or(0)
        };
        StoreStats {
            total_aircraft: count("SELECT COUNT(*) FROM aircraft"),
            with_typecode: count("SELECT COUNT(*) FROM aircraft WHERE typecode != ''"),
            with_registration: count("SELECT COUNT(*) FROM aircraft WHERE registration != ''"),
            routes_cached: count("SELECT COUNT(*) FROM routes"),
            routes_with_data: count(
                "SELECT COUNT(*) FROM routes WHERE dep_iata != '' OR arr_iata != ''",
            ),
            airports_cached: count("SELECT COUNT(*) FROM airports"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_store() -> MetadataStore {
        MetadataStore::open_memory().unwrap()
    }

    #[test]
    fn test_open_memory() {
        let store = test_store();
        assert_eq!(store.stats().total_aircraft, 0);
    }

    #[test]
    fn test_upsert_and_get_aircraft() {
        let store = test_store();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "4CA7B4".into(),
                registration: "EI-DCP".into(),
                typecode: "B738".into(),
                operator: "RYANAIR".into(),
                ..Default::default()
            })
            .unwrap();

        // Keyed lowercase regardless of input case
        let rec = store.get_aircraft("4ca7b4").unwrap();
        assert_eq!(rec.registration, "EI-DCP");
        assert_eq!(rec.typecode, "B738");
    }

    #[test]
    fn test_aircraft_fill_gap_only() {
        let store = test_store();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "4ca7b4".into(),
                registration: "EI-DCP".into(),
                operator: "RYANAIR".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "4ca7b4".into(),
                registration: "DIFFERENT".into(),
                typecode: "B738".into(),
                ..Default::default()
            })
            .unwrap();

        let rec = store.get_aircraft("4ca7b4").unwrap();
        // Populated field untouched, gap filled
        assert_eq!(rec.registration, "EI-DCP");
        assert_eq!(rec.operator, "RYANAIR");
        assert_eq!(rec.typecode, "B738");
    }

    #[test]
    fn test_route_cache_roundtrip() {
        let store = test_store();
        store
            .cache_route(&RouteRecord {
                callsign: "RYR4421".into(),
                dep_iata: "STN".into(),
                dep_name: "LONDON STANSTED".into(),
                arr_iata: "DUB".into(),
                arr_name: "DUBLIN".into(),
                ..Default::default()
            })
            .unwrap();

        let route = store.get_route("ryr4421").unwrap();
        assert_eq!(route.dep_iata, "STN");
        assert_eq!(route.arr_iata, "DUB");
        assert!(route.has_data());
    }

    #[test]
    fn test_negative_route_entry() {
        let store = test_store();
        store
            .cache_route(&RouteRecord {
                callsign: "ZZZ999".into(),
                ..Default::default()
            })
            .unwrap();

        let route = store.get_route("ZZZ999").unwrap();
        assert!(!route.has_data());
    }

    #[test]
    fn test_stale_route_not_returned() {
        let store = test_store();
        store
            .cache_route(&RouteRecord {
                callsign: "BAW117".into(),
                dep_iata: "LHR".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(store.get_route("BAW117").is_some());

        store.age_route("BAW117", ROUTE_TTL_SECS + 60.0);
        assert!(store.get_route("BAW117").is_none());
    }

    #[test]
    fn test_airport_roundtrip() {
        let store = test_store();
        store
            .upsert_airport(&AirportRecord {
                iata: "dub".into(),
                name: "DUBLIN".into(),
                country: "Ireland".into(),
                ..Default::default()
            })
            .unwrap();

        let apt = store.get_airport("DUB").unwrap();
        assert_eq!(apt.name, "DUBLIN");
    }

    #[test]
    fn test_import_registry_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "icao24,registration,typecode,operator").unwrap();
        writeln!(f, "4CA7B4,EI-DCP,B738,RYANAIR").unwrap();
        writeln!(f, "400615,G-VIIA,B777,BRITISH AIRWAYS").unwrap();
        writeln!(f, ",X-MISS,A320,NOBODY").unwrap();
        drop(f);

        let mut store = test_store();
        let imported = store.import_registry_csv(&path).unwrap();
        assert_eq!(imported, 2);

        let rec = store.get_aircraft("4ca7b4").unwrap();
        assert_eq!(rec.registration, "EI-DCP");
        assert_eq!(rec.source, "registry");
    }

    #[test]
    fn test_import_does_not_clobber() {
        let store_dir = tempfile::tempdir().unwrap();
        let path = store_dir.path().join("registry.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "icao24,registration,typecode").unwrap();
        writeln!(f, "4ca7b4,WRONG-REG,B738").unwrap();
        drop(f);

        let mut store = test_store();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "4ca7b4".into(),
                registration: "EI-DCP".into(),
                ..Default::default()
            })
            .unwrap();
        store.import_registry_csv(&path).unwrap();

        let rec = store.get_aircraft("4ca7b4").unwrap();
        assert_eq!(rec.registration, "EI-DCP");
        assert_eq!(rec.typecode, "B738");
    }

    #[test]
    fn test_import_missing_icao24_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "registration,typecode\nEI-DCP,B738\n").unwrap();

        let mut store = test_store();
        assert!(store.import_registry_csv(&path).is_err());
    }

    #[test]
    fn test_stats() {
        let store = test_store();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "aaa111".into(),
                typecode: "A320".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .upsert_aircraft(&AircraftRecord {
                hex: "bbb222".into(),
                registration: "G-TEST".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .cache_route(&RouteRecord {
                callsign: "BAW1".into(),
                dep_iata: "LHR".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .cache_route(&RouteRecord {
                callsign: "MISS1".into(),
                ..Default::default()
            })
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_aircraft, 2);
        assert_eq!(stats.with_typecode, 1);
        assert_eq!(stats.with_registration, 1);
        assert_eq!(stats.routes_cached, 2);
        assert_eq!(stats.routes_with_data, 1);
    }
}
