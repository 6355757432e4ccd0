#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use biology_learning_api::app::{app, AppState};
use biology_learning_api::config::AppConfig;
use biology_learning_api::database::DatabaseManager;

/// Router over a fresh in-memory store, plus a handle to that store.
pub fn test_app() -> (Router, DatabaseManager) {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    test_app_with(config)
}

pub fn test_app_with(config: AppConfig) -> (Router, DatabaseManager) {
    let db = DatabaseManager::in_memory();
    (app(AppState::new(db.clone(), config)), db)
}

pub fn disconnected_app() -> Router {
    app(AppState::new(DatabaseManager::disconnected(), AppConfig::development()))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v)?)
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body)?).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
    };
    Ok((status, value))
}

pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    send(app, Method::POST, uri, Some(body)).await
}

pub fn chapter(number: i64, title: &str) -> Value {
    serde_json::json!({
        "number": number,
        "title": title,
        "summary": format!("Ringkasan {}", title),
        "objectives": ["Memahami konsep dasar"],
        "reference": "Campbell Biology ed.11",
        "sections": [{ "title": "Pendahuluan", "content": "Isi" }]
    })
}

pub fn question(chapter_id: &str, text: &str) -> Value {
    serde_json::json!({
        "chapter_id": chapter_id,
        "question": text,
        "options": ["A", "B", "C", "D"],
        "correct_index": 2,
        "explanation": "C benar"
    })
}

/// The built binary on a free port, killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    /// Start with no database configured. Runs from the temp dir so no
    /// `.env` file is picked up.
    pub fn spawn_without_database() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_biology-learning-api"));
        cmd.args(["serve", "--port", &port.to_string()])
            .current_dir(std::env::temp_dir())
            .env_remove("DATABASE_URL")
            .env_remove("DATABASE_NAME")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Degraded is still up
                if resp.status() == reqwest::StatusCode::OK
                    || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
