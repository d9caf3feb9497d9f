//! Checks the loosely-typed `/api/weather` payload before anything leaves the process.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::WeatherQuery;

/// Reasons a payload is rejected. The display text is returned to the caller verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No data provided")]
    EmptyBody,

    #[error("Missing data: latitude, longitude, startDate, or endDate")]
    MissingFields,

    #[error("Invalid date or time format. Please use YYYY-MM-DD and HH:MM")]
    InvalidFormat,

    #[error("Start date cannot be after end date")]
    StartDateAfterEndDate,

    /// Compares time-of-day only, even when the dates differ.
    #[error("Start time must be before end time")]
    StartTimeNotBeforeEndTime,
}

/// Turn a JSON payload into a [`WeatherQuery`].
///
/// Checks run in order: presence, date format, date order, time format, time order.
pub fn validate(payload: &Value) -> Result<WeatherQuery, ValidationError> {
    let fields = match payload.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => return Err(ValidationError::EmptyBody),
    };

    let (Some(lat), Some(lon), Some(start), Some(end)) = (
        present(fields, "latitude"),
        present(fields, "longitude"),
        present(fields, "startDate"),
        present(fields, "endDate"),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    let latitude = lat.as_f64().ok_or(ValidationError::InvalidFormat)?;
    let longitude = lon.as_f64().ok_or(ValidationError::InvalidFormat)?;

    let start_date = start.as_str().ok_or(ValidationError::InvalidFormat)?;
    let end_date = end.as_str().ok_or(ValidationError::InvalidFormat)?;
    if parse_date(start_date)? > parse_date(end_date)? {
        return Err(ValidationError::StartDateAfterEndDate);
    }

    let start_time = optional_time(fields, "startTime")?;
    let end_time = optional_time(fields, "endTime")?;
    if let (Some(from), Some(to)) = (&start_time, &end_time) {
        // zero-padded HH:MM, so lexical order is chronological
        if from >= to {
            return Err(ValidationError::StartTimeNotBeforeEndTime);
        }
    }

    Ok(WeatherQuery {
        latitude,
        longitude,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        start_time,
        end_time,
    })
}

fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

/// chrono's parser tolerates signs, spaces and unpadded fields, so the parsed
/// value must format back to exactly the input.
fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date.format("%Y-%m-%d").to_string() == raw => Ok(date),
        _ => Err(ValidationError::InvalidFormat),
    }
}

fn is_canonical_time(raw: &str) -> bool {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .is_ok_and(|time| time.format("%H:%M").to_string() == raw)
}

/// `null`, absent and `""` all mean "not supplied".
fn optional_time(
    fields: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = present(fields, key) else {
        return Ok(None);
    };
    let raw = value.as_str().ok_or(ValidationError::InvalidFormat)?;
    if raw.is_empty() {
        return Ok(None);
    }
    if !is_canonical_time(raw) {
        return Err(ValidationError::InvalidFormat);
    }
    Ok(Some(raw.to_string()))
}
