use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

/// A fetched record is missing a required field or carries a value that
/// cannot be interpreted. Only the record is skipped, never the batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordShapeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("field {field} has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

pub fn optional_text(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_string)
}

pub fn required_text(field: &'static str, value: Option<&str>) -> Result<String, RecordShapeError> {
    optional_text(value).ok_or(RecordShapeError::MissingField(field))
}

pub fn optional_i64(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<i64>, RecordShapeError> {
    match present(value) {
        Some(text) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(field, text)),
        None => Ok(None),
    }
}

pub fn required_i64(field: &'static str, value: Option<&str>) -> Result<i64, RecordShapeError> {
    optional_i64(field, value)?.ok_or(RecordShapeError::MissingField(field))
}

pub fn optional_f64(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<f64>, RecordShapeError> {
    match present(value) {
        Some(text) => text
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(field, text)),
        None => Ok(None),
    }
}

pub fn optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, RecordShapeError> {
    match present(value) {
        Some(text) => parse_timestamp(text)
            .map(|timestamp| Some(format_timestamp(timestamp)))
            .ok_or_else(|| invalid(field, text)),
        None => Ok(None),
    }
}

pub fn required_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<String, RecordShapeError> {
    optional_timestamp(field, value)?.ok_or(RecordShapeError::MissingField(field))
}

/// `1`, `true` and `yes` are set; anything else, including absence, is unset.
pub fn flag(value: Option<&str>) -> bool {
    present(value)
        .map(|text| matches!(text.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .map(|naive| naive.and_utc())
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn invalid(field: &'static str, text: &str) -> RecordShapeError {
    RecordShapeError::InvalidField {
        field,
        value: text.to_string(),
    }
}
