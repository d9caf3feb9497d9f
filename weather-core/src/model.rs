use serde::{Serialize, Serializer};
use std::fmt;

/// Sentinel sent to the client in place of a missing temperature.
pub const MISSING_TEMPERATURE: &str = "N/A";

/// Marker placed in the readings when the provider payload has an unexpected shape.
pub const MALFORMED_SHAPE_MESSAGE: &str = "Data format from Open-Meteo was not as expected";

/// A validated weather request. Serialized back to the caller as `data_received`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    /// `HH:MM`, echoed only; the provider works in whole days.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    Celsius(f64),
    Missing,
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Temperature::Celsius(value) => serializer.serialize_f64(*value),
            Temperature::Missing => serializer.serialize_str(MISSING_TEMPERATURE),
        }
    }
}

impl From<Option<f64>> for Temperature {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Temperature::Missing, Temperature::Celsius)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub time: String,
    #[serde(rename = "temp_c")]
    pub temperature: Temperature,
}

/// One element of `weather_info.temperature_readings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingEntry {
    Reading(TemperatureReading),
    ShapeError { error: String },
}

impl ReadingEntry {
    pub fn malformed_shape() -> Self {
        ReadingEntry::ShapeError { error: MALFORMED_SHAPE_MESSAGE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeatherInfo {
    pub temperature_readings: Vec<ReadingEntry>,
}

/// Outcome classification written to `api_response_status` in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiResponseStatus {
    Success(u16),
    SuccessUnexpectedShape,
    HttpError(u16),
    ConnectionError,
    TimeoutError,
    RequestException,
    UnexpectedProcessingError,
}

impl fmt::Display for ApiResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponseStatus::Success(code) => write!(f, "Success ({code})"),
            ApiResponseStatus::SuccessUnexpectedShape => {
                f.write_str("Success but unexpected data structure")
            }
            ApiResponseStatus::HttpError(code) => write!(f, "HTTP Error ({code})"),
            ApiResponseStatus::ConnectionError => f.write_str("Connection Error"),
            ApiResponseStatus::TimeoutError => f.write_str("Timeout Error"),
            ApiResponseStatus::RequestException => f.write_str("Request Exception"),
            ApiResponseStatus::UnexpectedProcessingError => {
                f.write_str("Unexpected processing error")
            }
        }
    }
}
