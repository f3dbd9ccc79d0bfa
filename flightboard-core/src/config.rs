//! Configuration file management for flightboard.
//!
//! Reads a YAML-subset `config.yaml` with observer location, search
//! radius, data-source selection, and enrichment settings. A missing
//! or malformed file degrades to defaults — configuration problems
//! must never stop a poll cycle from running.

use std::path::Path;

use log::{info, warn};

/// Full configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub location: LocationConfig,
    pub radius_nm: f64,
    pub poll_interval_seconds: u64,
    pub source: SourceConfig,
    pub enrichment: EnrichmentConfig,
    /// Legacy flat-config FR24 token (pre source-block layout).
    pub fr24_api_token: Option<String>,
    /// CLI overrides, never read from the file.
    pub use_mock: bool,
    pub use_sandbox: bool,
}

#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    /// "rtlsdr", "fr24", "opensky", "mock", or empty for unset.
    pub kind: String,
    pub url: Option<String>,
    pub api_token: Option<String>,
    pub sandbox: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub database: String,
    pub airlabs_api_key: String,
    pub max_api_calls_per_session: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                latitude: 51.5074,
                longitude: -0.1278,
            },
            radius_nm: 10.0,
            poll_interval_seconds: 60,
            source: SourceConfig::default(),
            enrichment: EnrichmentConfig {
                enabled: true,
                database: "aircraft.db".into(),
                airlabs_api_key: String::new(),
                max_api_calls_per_session: 200,
            },
            fr24_api_token: None,
            use_mock: false,
            use_sandbox: false,
        }
    }
}

/// Load config from a file path. Missing file or parse failure
/// returns defaults with a warning.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        warn!("Config file '{}' not found, using defaults", path.display());
        return Config::default();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("Could not read '{}': {e} - using defaults", path.display());
            return Config::default();
        }
    };

    info!("Loaded config from {}", path.display());
    parse_config(&text)
}

/// Parse simple YAML-like config text. Unknown keys are ignored.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        if let Some((key, val)) = stripped.split_once(':') {
            let key = key.trim();
            let val = val.trim();

            if !is_indented {
                if val.is_empty() {
                    current_section = Some(key.to_string());
                } else {
                    current_section = None;
                    match key {
                        "radius_nm" => {
                            if let Some(v) = parse_float_value(val) {
                                config.radius_nm = v;
                            }
                        }
                        "poll_interval_seconds" => {
                            if let Ok(v) = val.parse() {
                                config.poll_interval_seconds = v;
                            }
                        }
                        "fr24_api_token" => config.fr24_api_token = parse_string_value(val),
                        _ => {}
                    }
                }
            } else if let Some(ref section) = current_section {
                match section.as_str() {
                    "location" => match key {
                        "latitude" => {
                            if let Some(v) = parse_float_value(val) {
                                config.location.latitude = v;
                            }
                        }
                        "longitude" => {
                            if let Some(v) = parse_float_value(val) {
                                config.location.longitude = v;
                            }
                        }
                        _ => {}
                    },
                    "source" => match key {
                        "type" => {
                            if let Some(v) = parse_string_value(val) {
                                config.source.kind = v.to_lowercase();
                            }
                        }
                        "url" => config.source.url = parse_string_value(val),
                        "api_token" => config.source.api_token = parse_string_value(val),
                        "sandbox" => config.source.sandbox = val == "true",
                        "username" => {
                            config.source.username = parse_string_value(val).unwrap_or_default()
                        }
                        "password" => {
                            config.source.password = parse_string_value(val).unwrap_or_default()
                        }
                        _ => {}
                    },
                    "enrichment" => match key {
                        "enabled" => config.enrichment.enabled = val != "false",
                        "database" => {
                            if let Some(v) = parse_string_value(val) {
                                config.enrichment.database = v;
                            }
                        }
                        "airlabs_api_key" => {
                            config.enrichment.airlabs_api_key =
                                parse_string_value(val).unwrap_or_default()
                        }
                        "max_api_calls_per_session" => {
                            if let Ok(v) = val.parse() {
                                config.enrichment.max_api_calls_per_session = v;
                            }
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.latitude, 51.5074);
        assert_eq!(config.radius_nm, 10.0);
        assert_eq!(config.poll_interval_seconds, 60);
        assert!(config.source.kind.is_empty());
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.max_api_calls_per_session, 200);
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
location:
  latitude: 53.3498
  longitude: -6.2603

radius_nm: 25
poll_interval_seconds: 30

source:
  type: fr24
  api_token: "tok123"
  sandbox: true

enrichment:
  enabled: true
  database: "/tmp/aircraft.db"
  airlabs_api_key: "key456"
  max_api_calls_per_session: 50
"#;
        let config = parse_config(text);
        assert_eq!(config.location.latitude, 53.3498);
        assert_eq!(config.location.longitude, -6.2603);
        assert_eq!(config.radius_nm, 25.0);
        assert_eq!(config.poll_interval_seconds, 30);
        assert_eq!(config.source.kind, "fr24");
        assert_eq!(config.source.api_token.as_deref(), Some("tok123"));
        assert!(config.source.sandbox);
        assert_eq!(config.enrichment.database, "/tmp/aircraft.db");
        assert_eq!(config.enrichment.airlabs_api_key, "key456");
        assert_eq!(config.enrichment.max_api_calls_per_session, 50);
    }

    #[test]
    fn test_parse_opensky_credentials() {
        let text = r#"
source:
  type: OpenSky
  username: "alice"
  password: "s3cret"
"#;
        let config = parse_config(text);
        assert_eq!(config.source.kind, "opensky");
        assert_eq!(config.source.username, "alice");
        assert_eq!(config.source.password, "s3cret");
    }

    #[test]
    fn test_parse_legacy_token() {
        let config = parse_config("fr24_api_token: \"legacy\"\n");
        assert_eq!(config.fr24_api_token.as_deref(), Some("legacy"));
        assert!(config.source.kind.is_empty());
    }

    #[test]
    fn test_parse_null_values() {
        let text = r#"
source:
  type: rtlsdr
  url: null
"#;
        let config = parse_config(text);
        assert_eq!(config.source.kind, "rtlsdr");
        assert!(config.source.url.is_none());
    }

    #[test]
    fn test_garbage_degrades_to_defaults() {
        let config = parse_config("{{{ not yaml at all\n\t???");
        assert_eq!(config.radius_nm, 10.0);
    }

    #[test]
    fn test_enrichment_disabled() {
        let config = parse_config("enrichment:\n  enabled: false\n");
        assert!(!config.enrichment.enabled);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let config = load_config(Path::new("/definitely/not/here/config.yaml"));
        assert_eq!(config.radius_nm, 10.0);
    }
}
