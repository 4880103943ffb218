use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::adapters::chargepoint::{ChargePointConfig, DEFAULT_ENDPOINT};
use crate::app::AppError;
use crate::domain::day_window::ImportWindow;

const DEFAULT_DB_PATH: &str = "chargePoint.db";
const DEFAULT_STATION_IDS_PATH: &str = "StationIds.yaml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chargepoint: ChargePointConfig,
    pub db_path: String,
    pub station_ids_path: String,
    pub station_ids: Vec<String>,
    pub window: ImportWindow,
    pub update_stations: bool,
    pub update_sessions: bool,
    pub record_fifteen_min: bool,
}

#[derive(Debug, Deserialize)]
struct StationIdFile {
    #[serde(rename = "StationIds")]
    station_ids: Vec<StationIdEntry>,
}

/// YAML lists often leave purely numeric ids unquoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StationIdEntry {
    Text(String),
    Number(u64),
}

impl StationIdEntry {
    fn into_id(self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env(record_fifteen_min: bool) -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok(), record_fifteen_min)
    }

    fn from_lookup<F>(lookup: F, record_fifteen_min: bool) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = required(&lookup, "CP_USERNAME")?;
        let password = lookup("CP_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::config("CP_PASSWORD is required"))?;

        let start = parse_boundary("IMPORT_START", &required(&lookup, "IMPORT_START")?)?;
        let end = parse_boundary("IMPORT_END", &required(&lookup, "IMPORT_END")?)?;
        let window = ImportWindow::new(start, end).map_err(AppError::config)?;

        let station_ids_path = optional(&lookup, "STATION_IDS_PATH")
            .unwrap_or_else(|| DEFAULT_STATION_IDS_PATH.to_string());
        let station_ids = load_station_ids(&station_ids_path)?;

        let timeout_secs = parse_or_default(&lookup, "CP_TIMEOUT_SECS", 30_u64)?;
        if timeout_secs == 0 {
            return Err(AppError::config("CP_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(Self {
            chargepoint: ChargePointConfig {
                endpoint: optional(&lookup, "CP_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                username,
                password,
                timeout_secs,
            },
            db_path: optional(&lookup, "DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            station_ids_path,
            station_ids,
            window,
            update_stations: parse_bool_or_default(&lookup, "UPDATE_STATIONS", true)?,
            update_sessions: parse_bool_or_default(&lookup, "UPDATE_SESSIONS", true)?,
            record_fifteen_min,
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| AppError::config(format!("{key} is required")))
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}

fn parse_bool_or_default<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key).map(|v| v.to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(AppError::config(format!("{key} must be true or false"))),
        },
        None => Ok(default),
    }
}

/// Accepts a bare date (midnight UTC) or a naive date-time read as UTC.
fn parse_boundary(key: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|value| value.and_utc())
        .map_err(|_| {
            AppError::config(format!(
                "{key} must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got {raw:?}"
            ))
        })
}

/// Reads `StationIds` from YAML, or from JSON when the file ends in `.json`.
fn load_station_ids(path: &str) -> Result<Vec<String>, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|error| AppError::config(format!("failed to read station ids {path}: {error}")))?;
    let file: StationIdFile = if Path::new(path)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
    {
        serde_json::from_str(&raw).map_err(|error| error.to_string())
    } else {
        serde_yaml::from_str(&raw).map_err(|error| error.to_string())
    }
    .map_err(|error| AppError::config(format!("failed to parse station ids {path}: {error}")))?;

    let mut seen = HashSet::new();
    let mut station_ids = Vec::with_capacity(file.station_ids.len());
    for entry in file.station_ids {
        let id = entry.into_id();
        if id.is_empty() {
            return Err(AppError::config(format!("{path} contains a blank station id")));
        }
        if !seen.insert(id.clone()) {
            return Err(AppError::config(format!("{path} lists station {id} twice")));
        }
        station_ids.push(id);
    }

    if station_ids.is_empty() {
        return Err(AppError::config(format!("{path} lists no station ids")));
    }

    Ok(station_ids)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::adapters::chargepoint::DEFAULT_ENDPOINT;
    use crate::test_support::temp_db_path;

    use super::AppConfig;

    fn station_file(contents: &str) -> String {
        named_station_file("station_ids.json", contents)
    }

    fn named_station_file(name: &str, contents: &str) -> String {
        let path = temp_db_path(name);
        std::fs::write(&path, contents).expect("station id file should be written");
        path.to_string_lossy().into_owned()
    }

    fn base_lookup(station_ids_path: String) -> impl Fn(&str) -> Option<String> {
        move |key| match key {
            "CP_USERNAME" => Some("ops@example.org".to_string()),
            "CP_PASSWORD" => Some("secret".to_string()),
            "IMPORT_START" => Some("2020-01-01".to_string()),
            "IMPORT_END" => Some("2020-01-03".to_string()),
            "STATION_IDS_PATH" => Some(station_ids_path.clone()),
            _ => None,
        }
    }

    #[test]
    fn applies_defaults_for_optional_fields() {
        let path = station_file(r#"{"StationIds": ["1:100", " 1:200 "]}"#);

        let config = AppConfig::from_lookup(base_lookup(path), false).expect("config should be valid");

        assert_eq!(config.chargepoint.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.chargepoint.timeout_secs, 30);
        assert_eq!(config.db_path, "chargePoint.db");
        assert_eq!(config.station_ids, vec!["1:100", "1:200"]);
        assert!(config.update_stations);
        assert!(config.update_sessions);
        assert!(!config.record_fifteen_min);
        assert_eq!(
            config.window.start(),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(config.window.days().count(), 2);
    }

    #[test]
    fn loads_station_ids_from_yaml() {
        let path = named_station_file(
            "StationIds.yaml",
            "StationIds:\n  - \"1:12345\"\n  - 67890\n  - ' 1:22222 '\n",
        );

        let config = AppConfig::from_lookup(base_lookup(path), false).expect("config should be valid");

        assert_eq!(config.station_ids, vec!["1:12345", "67890", "1:22222"]);
    }

    #[test]
    fn rejects_yaml_without_station_ids_key() {
        let path = named_station_file("StationIds.yaml", "Stations:\n  - \"1:12345\"\n");

        let result = AppConfig::from_lookup(base_lookup(path), false);

        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_the_yaml_station_file() {
        let lookup = base_lookup(String::new());

        let result = AppConfig::from_lookup(
            |key| if key == "STATION_IDS_PATH" { None } else { lookup(key) },
            false,
        );

        match result {
            Ok(config) => assert_eq!(config.station_ids_path, "StationIds.yaml"),
            Err(error) => assert!(error.to_string().contains("StationIds.yaml"), "{error}"),
        }
    }

    #[test]
    fn rejects_missing_username() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let result = AppConfig::from_lookup(
            |key| if key == "CP_USERNAME" { None } else { lookup(key) },
            false,
        );

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: CP_USERNAME is required"
        );
    }

    #[test]
    fn accepts_date_time_boundaries() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let config = AppConfig::from_lookup(
            |key| match key {
                "IMPORT_START" => Some("2020-01-01T06:30:00".to_string()),
                _ => lookup(key),
            },
            true,
        )
        .expect("config should be valid");

        assert_eq!(
            config.window.start(),
            Utc.with_ymd_and_hms(2020, 1, 1, 6, 30, 0).unwrap()
        );
        assert!(config.record_fifteen_min);
    }

    #[test]
    fn rejects_end_before_start() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let result = AppConfig::from_lookup(
            |key| match key {
                "IMPORT_END" => Some("2019-12-31".to_string()),
                _ => lookup(key),
            },
            false,
        );

        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_boundaries() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let result = AppConfig::from_lookup(
            |key| match key {
                "IMPORT_START" => Some("01/01/2020".to_string()),
                _ => lookup(key),
            },
            false,
        );

        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_and_duplicate_station_lists() {
        for contents in [
            r#"{"StationIds": []}"#,
            r#"{"StationIds": ["1:100", "1:100"]}"#,
            r#"{"StationIds": ["1:100", "  "]}"#,
            r#"{"Stations": ["1:100"]}"#,
        ] {
            let path = station_file(contents);
            let result = AppConfig::from_lookup(base_lookup(path), false);
            assert!(result.is_err(), "{contents} should be rejected");
        }
    }

    #[test]
    fn rejects_invalid_flags_and_numbers() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let flag = AppConfig::from_lookup(
            |key| match key {
                "UPDATE_STATIONS" => Some("maybe".to_string()),
                _ => lookup(key),
            },
            false,
        );
        let timeout = AppConfig::from_lookup(
            |key| match key {
                "CP_TIMEOUT_SECS" => Some("abc".to_string()),
                _ => lookup(key),
            },
            false,
        );

        assert_eq!(
            flag.unwrap_err().to_string(),
            "invalid configuration: UPDATE_STATIONS must be true or false"
        );
        assert_eq!(
            timeout.unwrap_err().to_string(),
            "invalid configuration: CP_TIMEOUT_SECS must be a valid number"
        );
    }

    #[test]
    fn disables_importers_from_flags() {
        let path = station_file(r#"{"StationIds": ["1:100"]}"#);
        let lookup = base_lookup(path);

        let config = AppConfig::from_lookup(
            |key| match key {
                "UPDATE_STATIONS" => Some("false".to_string()),
                "UPDATE_SESSIONS" => Some("0".to_string()),
                _ => lookup(key),
            },
            false,
        )
        .expect("config should be valid");

        assert!(!config.update_stations);
        assert!(!config.update_sessions);
    }
}
