use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::model::WeatherQuery;

use super::{ProviderOutcome, WeatherProvider};

const USER_AGENT: &str = concat!("weather-core/", env!("CARGO_PKG_VERSION"));

/// Only hourly 2m temperature is requested.
pub const HOURLY_FIELD: &str = "temperature_2m";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    forecast_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    /// `base_url` is the scheme and host, e.g. `https://api.open-meteo.com`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self {
            forecast_url: format!("{}/v1/forecast", base_url.trim_end_matches('/')),
            http,
        })
    }

    pub fn forecast_url(&self) -> &str {
        &self.forecast_url
    }

    fn query_params(query: &WeatherQuery) -> [(&'static str, String); 7] {
        [
            ("latitude", query.latitude.to_string()),
            ("longitude", query.longitude.to_string()),
            ("start_date", query.start_date.clone()),
            ("end_date", query.end_date.clone()),
            ("hourly", HOURLY_FIELD.to_string()),
            ("timezone", "auto".to_string()),
            ("temperature_unit", "celsius".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_hourly(&self, query: &WeatherQuery) -> ProviderOutcome {
        debug!(url = %self.forecast_url, start = %query.start_date, end = %query.end_date, "Requesting Open-Meteo forecast");

        let res = match self
            .http
            .get(&self.forecast_url)
            .query(&Self::query_params(query))
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => return classify_transport_error(&err),
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return classify_transport_error(&err),
        };

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %truncate_body(&body), "Open-Meteo returned an error status");
            return ProviderOutcome::HttpError { status: status.as_u16(), body };
        }

        match serde_json::from_str(&body) {
            Ok(json) => ProviderOutcome::Success { status: status.as_u16(), body: json },
            Err(err) => ProviderOutcome::MalformedPayload(format!(
                "Failed to parse Open-Meteo JSON: {err}; body: {}",
                truncate_body(&body)
            )),
        }
    }
}

fn classify_transport_error(err: &reqwest::Error) -> ProviderOutcome {
    if err.is_timeout() {
        ProviderOutcome::Timeout
    } else if err.is_connect() {
        ProviderOutcome::ConnectionFailure(err.to_string())
    } else {
        ProviderOutcome::UnknownFailure(err.to_string())
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
