//! Common test utilities for integration tests.
//!
//! The router is built over a temp-dir store with scripted executor and
//! directory implementations, so no browser or network is needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use checkin_api::{
    app::{create_app, AppState},
    config::{Config, PacingConfig},
    services::{CheckinRunner, WhatsAppGateway},
};
use domain::models::{AttemptOutcome, AttemptRequest, OutcomeKind};
use domain::services::{
    AttemptError, AttemptExecutor, DirectoryEntry, DirectoryError, EmployeeDirectory,
    MockNotificationService,
};
use persistence::Store;

/// Executor answering from a per-NIP script; unknown NIPs succeed.
#[derive(Default)]
pub struct MockExecutor {
    outcomes: HashMap<String, OutcomeKind>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn with(outcomes: &[(&str, OutcomeKind)]) -> Self {
        Self {
            outcomes: outcomes
                .iter()
                .map(|(nip, kind)| (nip.to_string(), *kind))
                .collect(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes every attempt take `delay` before answering.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// NIPs attempted so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttemptExecutor for MockExecutor {
    async fn attempt(&self, request: &AttemptRequest) -> Result<AttemptOutcome, AttemptError> {
        self.calls.lock().unwrap().push(request.nip.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let kind = self
            .outcomes
            .get(&request.nip)
            .copied()
            .unwrap_or(OutcomeKind::Success);
        let outcome = AttemptOutcome::from_kind(kind);
        Ok(if kind.is_success() {
            outcome.with_checkin_time("07:03:10")
        } else {
            outcome
        })
    }
}

/// Directory returning a fixed list for any office code.
pub struct StaticDirectory(pub Vec<DirectoryEntry>);

#[async_trait::async_trait]
impl EmployeeDirectory for StaticDirectory {
    async fn fetch(&self, office_code: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        if office_code.trim().is_empty() {
            return Err(DirectoryError::MissingOfficeCode);
        }
        Ok(self.0.clone())
    }
}

pub fn directory_entry(nip: &str, nama: &str) -> DirectoryEntry {
    DirectoryEntry {
        nip: nip.to_string(),
        nama: nama.to_string(),
    }
}

/// Test configuration; no dashboard token unless set by the caller.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.logging.format = "pretty".to_string();
    config.portal.url = "https://presensi.test/absen".to_string();
    config.scheduler.enabled = false;
    // Nothing listens on port 9 of localhost.
    config.whatsapp.base_url = "http://127.0.0.1:9".to_string();
    config.whatsapp.timeout_secs = 2;
    config.pacing = PacingConfig::none();
    config
}

/// Everything a test needs to drive and inspect the app.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub executor: Arc<MockExecutor>,
    pub notifier: MockNotificationService,
    _dir: tempfile::TempDir,
}

pub fn create_test_app(config: Config, executor: MockExecutor, directory: Vec<DirectoryEntry>) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::open(dir.path());
    let executor = Arc::new(executor);
    let notifier = MockNotificationService::new();

    let runner = Arc::new(CheckinRunner::new(
        store.clone(),
        executor.clone(),
        Arc::new(notifier.clone()),
        Arc::new(StaticDirectory(directory)),
        config.pacing.clone(),
    ));
    let gateway = WhatsAppGateway::new(&config.whatsapp).expect("Failed to build gateway client");
    let state = AppState::new(config, store.clone(), runner, gateway);

    TestApp {
        router: create_app(state),
        store,
        executor,
        notifier,
        _dir: dir,
    }
}

/// Build a JSON request, optionally with the dashboard token.
pub fn json_request(
    method: axum::http::Method,
    uri: &str,
    body: serde_json::Value,
    api_key: Option<&str>,
) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{header, Request},
    };

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a body-less request, optionally with the dashboard token.
pub fn empty_request(
    method: axum::http::Method,
    uri: &str,
    api_key: Option<&str>,
) -> axum::http::Request<axum::body::Body> {
    use axum::{body::Body, http::Request};

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
