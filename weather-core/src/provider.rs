use crate::{config::ProviderConfig, model::WeatherQuery};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Result of one outbound forecast call. Exactly one attempt is made per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// 2xx with a JSON body.
    Success { status: u16, body: Value },
    /// 2xx, but the body could not be decoded as JSON.
    MalformedPayload(String),
    /// Non-2xx; `body` is the provider's raw response text.
    HttpError { status: u16, body: String },
    ConnectionFailure(String),
    Timeout,
    UnknownFailure(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch hourly temperatures for the whole-day range of `query`.
    async fn fetch_hourly(&self, query: &WeatherQuery) -> ProviderOutcome;
}

/// Construct the Open-Meteo provider from config.
pub fn provider_from_config(config: &ProviderConfig) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::new(&config.base_url, config.timeout())?;
    Ok(Box::new(provider))
}
