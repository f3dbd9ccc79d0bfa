//! Source construction from configuration.
//!
//! Resolves the configured source type, honors CLI overrides, detects
//! legacy flat-layout FR24 credentials, and falls back to the mock
//! source when nothing usable is configured. The mock fallback is the
//! only automatic substitution and is always logged.

use log::{error, info, warn};

use crate::config::Config;
use crate::types::Flight;

use super::fr24::Fr24Source;
use super::mock::{MockSource, MOCK_RADIUS_NM};
use super::opensky::OpenSkySource;
use super::rtlsdr::RtlSdrSource;
use super::{FlightSource, RawSource};

const PLACEHOLDER_TOKEN: &str = "YOUR_API_TOKEN_HERE";

/// Build the configured data source, wrapped and ready to poll.
pub fn create_source(config: &Config) -> FlightSource {
    let lat = config.location.latitude;
    let lon = config.location.longitude;
    let radius = config.radius_nm;

    let mut kind = config.source.kind.clone();
    let mut sandbox = config.source.sandbox;

    // CLI overrides
    if config.use_mock {
        kind = "mock".into();
    }
    if config.use_sandbox {
        sandbox = true;
        if kind != "fr24" {
            kind = "fr24".into();
        }
    }

    // Legacy: no source block, but a usable top-level FR24 token.
    if kind.is_empty() {
        match config.fr24_api_token.as_deref() {
            Some(token) if !token.is_empty() && token != PLACEHOLDER_TOKEN => {
                kind = "fr24".into();
            }
            _ => {
                warn!("No data source configured - using mock data");
                kind = "mock".into();
            }
        }
    }

    info!("Data source: {kind}");

    let inner: Box<dyn RawSource> = match kind.as_str() {
        "rtlsdr" => Box::new(RtlSdrSource::new(config.source.url.clone())),
        "fr24" => {
            let token = config
                .source
                .api_token
                .clone()
                .or_else(|| config.fr24_api_token.clone())
                .unwrap_or_default();
            if token.is_empty() || token == PLACEHOLDER_TOKEN {
                error!(
                    "FR24 source requires an API token \
                     (https://fr24api.flightradar24.com/key-management) - falling back to mock data"
                );
                return mock_source(lat, lon);
            }
            Box::new(Fr24Source::new(lat, lon, radius, token, sandbox))
        }
        "opensky" => Box::new(OpenSkySource::new(
            lat,
            lon,
            radius,
            config.source.username.clone(),
            config.source.password.clone(),
        )),
        "mock" => return mock_source(lat, lon),
        other => {
            error!("Unknown source type '{other}' (valid: rtlsdr, fr24, opensky, mock) - using mock data");
            return mock_source(lat, lon);
        }
    };

    FlightSource::new(inner, lat, lon, radius)
}

fn mock_source(lat: f64, lon: f64) -> FlightSource {
    FlightSource::new(Box::new(MockSource::new()), lat, lon, MOCK_RADIUS_NM)
}

/// Poll result summary, used by callers for logging.
pub fn describe(flights: &[Flight]) -> String {
    match flights.len() {
        0 => "no aircraft overhead".to_string(),
        1 => "1 aircraft overhead".to_string(),
        n => format!("{n} aircraft overhead"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_defaults_to_mock() {
        let config = Config::default();
        let src = create_source(&config);
        assert_eq!(src.name(), "MockSource");
    }

    #[test]
    fn test_explicit_mock() {
        let mut config = Config::default();
        config.source.kind = "mock".into();
        assert_eq!(create_source(&config).name(), "MockSource");
    }

    #[test]
    fn test_unknown_type_falls_back_to_mock() {
        let mut config = Config::default();
        config.source.kind = "flightaware".into();
        assert_eq!(create_source(&config).name(), "MockSource");
    }

    #[test]
    fn test_fr24_without_token_falls_back_to_mock() {
        let mut config = Config::default();
        config.source.kind = "fr24".into();
        assert_eq!(create_source(&config).name(), "MockSource");

        config.source.api_token = Some(PLACEHOLDER_TOKEN.into());
        assert_eq!(create_source(&config).name(), "MockSource");
    }

    #[test]
    fn test_fr24_with_token() {
        let mut config = Config::default();
        config.source.kind = "fr24".into();
        config.source.api_token = Some("real-token".into());
        assert_eq!(create_source(&config).name(), "FR24Source");
    }

    #[test]
    fn test_legacy_flat_token_selects_fr24() {
        let mut config = Config::default();
        config.fr24_api_token = Some("legacy-token".into());
        assert_eq!(create_source(&config).name(), "FR24Source");
    }

    #[test]
    fn test_legacy_placeholder_token_is_ignored() {
        let mut config = Config::default();
        config.fr24_api_token = Some(PLACEHOLDER_TOKEN.into());
        assert_eq!(create_source(&config).name(), "MockSource");
    }

    #[test]
    fn test_mock_override_wins() {
        let mut config = Config::default();
        config.source.kind = "opensky".into();
        config.use_mock = true;
        assert_eq!(create_source(&config).name(), "MockSource");
    }

    #[test]
    fn test_sandbox_override_forces_fr24() {
        let mut config = Config::default();
        config.source.kind = "opensky".into();
        config.source.api_token = Some("tok".into());
        config.use_sandbox = true;
        assert_eq!(create_source(&config).name(), "FR24Source");
    }

    #[test]
    fn test_opensky_selected() {
        let mut config = Config::default();
        config.source.kind = "opensky".into();
        assert_eq!(create_source(&config).name(), "OpenSkySource");
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&[]), "no aircraft overhead");
        assert_eq!(describe(&[Flight::default()]), "1 aircraft overhead");
    }
}
