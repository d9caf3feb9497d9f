//! Maps validation and provider failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use weather_core::{ValidationError, WeatherError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Weather(WeatherError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        ApiError::Weather(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Weather(WeatherError::ProviderHttp { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Weather(WeatherError::ProviderConnection) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Weather(WeatherError::ProviderTimeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Weather(WeatherError::ProviderUnknown | WeatherError::Processing) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::Validation(err) => (err.to_string(), None),
            ApiError::Weather(WeatherError::ProviderHttp { status, body }) => (
                format!("Error fetching weather data from provider: {status}"),
                Some(body.clone()),
            ),
            ApiError::Weather(WeatherError::ProviderConnection) => {
                ("Could not connect to weather data provider.".to_string(), None)
            }
            ApiError::Weather(WeatherError::ProviderTimeout) => {
                ("Request to weather data provider timed out.".to_string(), None)
            }
            ApiError::Weather(WeatherError::ProviderUnknown) => {
                ("An unexpected error occurred while fetching weather data.".to_string(), None)
            }
            ApiError::Weather(WeatherError::Processing) => {
                ("An internal error occurred while processing weather data.".to_string(), None)
            }
        };
        ErrorBody { error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
