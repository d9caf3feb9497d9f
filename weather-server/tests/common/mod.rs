//! Shared helpers: run the app on an ephemeral port, by default with an in-memory request log.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use weather_core::{
    ProviderOutcome, RequestLogStore, WeatherProvider, WeatherQuery, WeatherService,
};
use weather_server::AppState;

/// Provider that answers every call with the same outcome.
#[derive(Debug)]
pub struct StubProvider {
    outcome: ProviderOutcome,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(outcome: ProviderOutcome) -> Arc<Self> {
        Arc::new(Self { outcome, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn fetch_hourly(&self, _query: &WeatherQuery) -> ProviderOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub struct TestApp {
    pub base_url: String,
    pub store: Arc<RequestLogStore>,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(provider: Arc<dyn WeatherProvider>) -> Self {
        let store = Arc::new(RequestLogStore::open_in_memory().unwrap());
        Self::spawn_with_store(provider, store).await
    }

    pub async fn spawn_with_store(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<RequestLogStore>,
    ) -> Self {
        let state = AppState::new(WeatherService::new(provider, store.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(weather_server::serve(listener, state, std::future::pending()));

        Self { base_url: format!("http://{addr}"), store, client: reqwest::Client::new() }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.base_url)).send().await.unwrap()
    }

    pub async fn post_weather(&self, payload: &Value) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}/api/weather", self.base_url))
            .json(payload)
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }

    pub async fn post_raw(&self, body: &'static str) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}/api/weather", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }

    pub fn logged_statuses(&self) -> Vec<String> {
        self.store
            .recent(100)
            .unwrap()
            .into_iter()
            .filter_map(|row| row.api_response_status)
            .collect()
    }
}
