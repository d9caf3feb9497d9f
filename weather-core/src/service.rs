use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    model::{ApiResponseStatus, WeatherInfo, WeatherQuery},
    provider::{ProviderOutcome, WeatherProvider},
    store::{NewRequestLog, RequestLogStore},
    transform::{self, ShapeStatus},
};

/// Provider-stage failures. The request has already been logged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("provider returned HTTP {status}")]
    ProviderHttp { status: u16, body: String },

    #[error("could not connect to provider")]
    ProviderConnection,

    #[error("provider request timed out")]
    ProviderTimeout,

    #[error("provider request failed")]
    ProviderUnknown,

    #[error("provider payload could not be processed")]
    Processing,
}

/// A successfully processed request, possibly carrying the malformed-shape marker.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub status: ApiResponseStatus,
    pub shape: ShapeStatus,
    pub info: WeatherInfo,
}

/// Everything a request needs after validation: the provider and the log store.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<RequestLogStore>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<RequestLogStore>) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &RequestLogStore {
        &self.store
    }

    /// Call the provider once, reshape the result and write exactly one log row.
    pub async fn process(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let outcome = self.provider.fetch_hourly(query).await;

        let (status, result) = match outcome {
            ProviderOutcome::Success { status, body } => {
                let transformed = transform::hourly_readings(&body);
                let log_status = match transformed.shape {
                    ShapeStatus::Success => ApiResponseStatus::Success(status),
                    ShapeStatus::MalformedShape => {
                        warn!("Open-Meteo response missing expected hourly data structure");
                        ApiResponseStatus::SuccessUnexpectedShape
                    }
                };
                let report = WeatherReport {
                    status: log_status,
                    shape: transformed.shape,
                    info: transformed.info,
                };
                (log_status, Ok(report))
            }
            ProviderOutcome::HttpError { status, body } => {
                error!(status, body = %body, "HTTP error from weather provider");
                (ApiResponseStatus::HttpError(status), Err(WeatherError::ProviderHttp { status, body }))
            }
            ProviderOutcome::ConnectionFailure(reason) => {
                error!(%reason, "Connection error reaching weather provider");
                (ApiResponseStatus::ConnectionError, Err(WeatherError::ProviderConnection))
            }
            ProviderOutcome::Timeout => {
                error!("Request to weather provider timed out");
                (ApiResponseStatus::TimeoutError, Err(WeatherError::ProviderTimeout))
            }
            ProviderOutcome::UnknownFailure(reason) => {
                error!(%reason, "Weather provider request failed");
                (ApiResponseStatus::RequestException, Err(WeatherError::ProviderUnknown))
            }
            ProviderOutcome::MalformedPayload(reason) => {
                error!(%reason, "Unexpected error processing weather provider response");
                (ApiResponseStatus::UnexpectedProcessingError, Err(WeatherError::Processing))
            }
        };

        self.record(query, status);

        info!(
            lat = query.latitude,
            lon = query.longitude,
            start_date = %query.start_date,
            end_date = %query.end_date,
            start_time = query.start_time.as_deref().unwrap_or("-"),
            end_time = query.end_time.as_deref().unwrap_or("-"),
            status = %status,
            "Processed weather request"
        );

        result
    }

    /// Log-store failures never reach the caller.
    fn record(&self, query: &WeatherQuery, status: ApiResponseStatus) {
        if let Err(err) = self.store.append(&NewRequestLog::new(query, status.to_string())) {
            error!(error = %err, "Database error while logging weather request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReadingEntry, Temperature};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FixedProvider {
        outcome: ProviderOutcome,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn fetch_hourly(&self, _query: &WeatherQuery) -> ProviderOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn service(outcome: ProviderOutcome) -> (WeatherService, Arc<FixedProvider>) {
        let provider = Arc::new(FixedProvider { outcome, calls: AtomicUsize::new(0) });
        let store = Arc::new(RequestLogStore::open_in_memory().unwrap());
        (WeatherService::new(provider.clone(), store), provider)
    }

    fn service_without_log_table(outcome: ProviderOutcome) -> WeatherService {
        let (svc, _) = service(outcome);
        svc.store().execute_batch("DROP TABLE weather_request_log").unwrap();
        svc
    }

    fn query() -> WeatherQuery {
        WeatherQuery {
            latitude: 35.0,
            longitude: -80.0,
            start_date: "2023-01-01".into(),
            end_date: "2023-01-01".into(),
            start_time: None,
            end_time: None,
        }
    }

    fn logged_statuses(svc: &WeatherService) -> Vec<String> {
        svc.store()
            .recent(10)
            .unwrap()
            .into_iter()
            .filter_map(|row| row.api_response_status)
            .collect()
    }

    #[tokio::test]
    async fn success_is_transformed_and_logged_once() {
        let (svc, provider) = service(ProviderOutcome::Success {
            status: 200,
            body: json!({"hourly": {"time": ["t0", "t1"], "temperature_2m": [10.0, 10.5]}}),
        });

        let report = svc.process(&query()).await.unwrap();

        assert_eq!(report.status, ApiResponseStatus::Success(200));
        assert_eq!(report.shape, ShapeStatus::Success);
        assert_eq!(report.info.temperature_readings.len(), 2);
        match &report.info.temperature_readings[0] {
            ReadingEntry::Reading(r) => assert_eq!(r.temperature, Temperature::Celsius(10.0)),
            other => panic!("unexpected entry {other:?}"),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(logged_statuses(&svc), vec!["Success (200)"]);
    }

    #[tokio::test]
    async fn malformed_shape_is_still_a_success() {
        let (svc, _) = service(ProviderOutcome::Success {
            status: 200,
            body: json!({"latitude": 35.0, "longitude": -80.0}),
        });

        let report = svc.process(&query()).await.unwrap();

        assert_eq!(report.status, ApiResponseStatus::SuccessUnexpectedShape);
        assert_eq!(report.shape, ShapeStatus::MalformedShape);
        assert_eq!(report.info.temperature_readings, vec![ReadingEntry::malformed_shape()]);
        assert_eq!(logged_statuses(&svc), vec!["Success but unexpected data structure"]);
    }

    #[tokio::test]
    async fn every_failure_kind_is_logged_and_classified() {
        let cases = [
            (
                ProviderOutcome::HttpError { status: 400, body: "bad".into() },
                WeatherError::ProviderHttp { status: 400, body: "bad".into() },
                "HTTP Error (400)",
            ),
            (
                ProviderOutcome::ConnectionFailure("refused".into()),
                WeatherError::ProviderConnection,
                "Connection Error",
            ),
            (ProviderOutcome::Timeout, WeatherError::ProviderTimeout, "Timeout Error"),
            (
                ProviderOutcome::UnknownFailure("tls".into()),
                WeatherError::ProviderUnknown,
                "Request Exception",
            ),
            (
                ProviderOutcome::MalformedPayload("not json".into()),
                WeatherError::Processing,
                "Unexpected processing error",
            ),
        ];

        for (outcome, expected, status) in cases {
            let (svc, _) = service(outcome);

            let err = svc.process(&query()).await.unwrap_err();

            assert_eq!(err, expected);
            assert_eq!(logged_statuses(&svc), vec![status]);
        }
    }

    #[tokio::test]
    async fn failed_log_write_does_not_fail_a_success() {
        let svc = service_without_log_table(ProviderOutcome::Success {
            status: 200,
            body: json!({"hourly": {"time": ["t0"], "temperature_2m": [1.5]}}),
        });

        let report = svc.process(&query()).await.unwrap();

        assert_eq!(report.status, ApiResponseStatus::Success(200));
        assert_eq!(report.info.temperature_readings.len(), 1);
    }

    #[tokio::test]
    async fn failed_log_write_keeps_the_provider_error() {
        let cases = [
            (
                ProviderOutcome::HttpError { status: 404, body: "missing".into() },
                WeatherError::ProviderHttp { status: 404, body: "missing".into() },
            ),
            (ProviderOutcome::ConnectionFailure("refused".into()), WeatherError::ProviderConnection),
            (ProviderOutcome::Timeout, WeatherError::ProviderTimeout),
            (ProviderOutcome::UnknownFailure("tls".into()), WeatherError::ProviderUnknown),
            (ProviderOutcome::MalformedPayload("not json".into()), WeatherError::Processing),
        ];

        for (outcome, expected) in cases {
            let svc = service_without_log_table(outcome);

            assert_eq!(svc.process(&query()).await.unwrap_err(), expected);
        }
    }
}
