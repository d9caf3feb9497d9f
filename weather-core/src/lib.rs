//! Core library for the weather backend.
//!
//! This crate defines:
//! - Configuration loading
//! - Validation of inbound weather requests
//! - The Open-Meteo client behind the `WeatherProvider` trait
//! - Reshaping of hourly forecasts into temperature readings
//! - The SQLite request log
//!
//! It is used by `weather-server`, which only adds the HTTP surface.

pub mod config;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;
pub mod transform;
pub mod validate;

pub use config::{Config, DatabaseConfig, ProviderConfig, ServerConfig};
pub use model::{
    ApiResponseStatus, ReadingEntry, Temperature, TemperatureReading, WeatherInfo, WeatherQuery,
};
pub use provider::{OpenMeteoProvider, ProviderOutcome, WeatherProvider};
pub use service::{WeatherError, WeatherReport, WeatherService};
pub use store::{NewRequestLog, RequestLogStore, StoreError, WeatherRequestLog};
pub use transform::ShapeStatus;
pub use validate::{ValidationError, validate};
