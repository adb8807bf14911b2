#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use csvinsight_ai::{AiError, InsightGenerator};
use csvinsight_common::Report;
use csvinsight_server::app;
use csvinsight_server::config::ServerConfig;
use csvinsight_server::state::AppState;
use csvinsight_storage::{DatabaseConfig, ReportGateway, ReportStore, StorageError};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const SAMPLE_INSIGHTS: &str = "## Summary\n...";

/// Scripted [`InsightGenerator`] that counts its calls.
pub struct MockGenerator {
    reply: Result<String, String>,
    healthy: bool,
    pub calls: AtomicUsize,
    pub last_csv: Mutex<Option<String>>,
}

impl MockGenerator {
    pub fn replying(insights: &str) -> Self {
        Self {
            reply: Ok(insights.to_string()),
            healthy: true,
            calls: AtomicUsize::new(0),
            last_csv: Mutex::new(None),
        }
    }

    /// Fails every call with an upstream error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            healthy: false,
            calls: AtomicUsize::new(0),
            last_csv: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightGenerator for MockGenerator {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, csv_data: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_csv.lock().unwrap() = Some(csv_data.to_string());
        self.reply.clone().map_err(|message| AiError::Upstream {
            status: 502,
            message,
        })
    }

    async fn health_check(&self) -> Result<(), AiError> {
        if self.healthy {
            Ok(())
        } else {
            Err(AiError::Upstream {
                status: 503,
                message: "upstream unavailable".to_string(),
            })
        }
    }
}

/// In-memory [`ReportStore`] that can be switched into a failing state.
#[derive(Default)]
pub struct MockStore {
    reports: Mutex<Vec<Report>>,
    failure: Option<String>,
    pub creates: AtomicUsize,
}

impl MockStore {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StorageError> {
        match &self.failure {
            Some(msg) => Err(StorageError::Other(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ReportStore for MockStore {
    async fn create(&self, filename: &str, insights: &str) -> Result<Report, StorageError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut reports = self.reports.lock().unwrap();
        let report = Report {
            id: reports.len() as i32 + 1,
            filename: filename.to_string(),
            insights: insights.to_string(),
            timestamp: Utc::now(),
        };
        reports.push(report.clone());
        Ok(report)
    }

    async fn list(&self, limit: u64) -> Result<Vec<Report>, StorageError> {
        self.check()?;
        let reports = self.reports.lock().unwrap();
        Ok(reports.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.check()
    }
}

pub struct TestContext {
    pub app: axum::Router,
    _temp_dir: Option<TempDir>,
}

pub fn build_context(
    generator: Arc<dyn InsightGenerator>,
    store: Arc<dyn ReportStore>,
) -> TestContext {
    let state = AppState::new(generator, store, ServerConfig::default());
    TestContext {
        app: app::build_http_app(state),
        _temp_dir: None,
    }
}

/// SQLite-backed gateway in a fresh temporary directory.
pub fn sqlite_gateway(dir: &TempDir) -> Arc<ReportGateway> {
    let url = format!("sqlite://{}", dir.path().join("reports.db").display());
    Arc::new(ReportGateway::new(DatabaseConfig::with_url(url)))
}

/// Context backed by a real SQLite report store. The database lives as long
/// as the returned context.
pub fn build_sqlite_context(generator: Arc<dyn InsightGenerator>) -> (TestContext, Arc<ReportGateway>) {
    let temp_dir = tempfile::tempdir().expect("tempdir should be created");
    let gateway = sqlite_gateway(&temp_dir);
    let state = AppState::new(generator, gateway.clone(), ServerConfig::default());
    (
        TestContext {
            app: app::build_http_app(state),
            _temp_dir: Some(temp_dir),
        },
        gateway,
    )
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    let req = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let body = body.map(|b| b.to_string());
    request_raw(app, method, uri, body.as_deref()).await
}
