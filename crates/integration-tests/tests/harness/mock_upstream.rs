//! Scripted mock of the upstream image generation API
//!
//! Answers each call with the next status and body from its script and keeps
//! answering with the last entry once the script runs out.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub const GENERATIONS_PATH: &str = "/v1/images/generations";

pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    calls: AtomicU32,
    script: Vec<(StatusCode, Value)>,
    last_authorization: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

impl MockUpstream {
    /// Start a mock answering with `script` in order
    pub async fn start(script: Vec<(u16, Value)>) -> anyhow::Result<Self> {
        assert!(!script.is_empty(), "script needs at least one response");

        let script = script
            .into_iter()
            .map(|(status, body)| (StatusCode::from_u16(status).expect("valid status"), body))
            .collect();

        let state = Arc::new(MockState {
            calls: AtomicU32::new(0),
            script,
            last_authorization: Mutex::new(None),
            last_body: Mutex::new(None),
        });

        let app = Router::new()
            .route(GENERATIONS_PATH, routing::post(handle_generation))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Start a mock that always answers with the same response
    pub async fn always(status: u16, body: Value) -> anyhow::Result<Self> {
        Self::start(vec![(status, body)]).await
    }

    /// Start a mock that returns a successful generation
    pub async fn succeeding() -> anyhow::Result<Self> {
        Self::always(200, success_payload()).await
    }

    /// Full URL of the mocked generation endpoint
    pub fn url(&self) -> String {
        format!("http://{}{GENERATIONS_PATH}", self.addr)
    }

    /// Number of generation calls received
    pub fn call_count(&self) -> u32 {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Authorization header of the most recent call
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// JSON body of the most recent call
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Payload shaped like a real upstream success
pub fn success_payload() -> Value {
    json!({
        "id": "gen-123",
        "model": "black-forest-labs/FLUX.1-schnell-Free",
        "object": "list",
        "data": [
            { "index": 0, "url": "https://images.example/gen-123.png", "timings": { "inference": 0.42 } }
        ]
    })
}

/// An address nothing listens on
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{GENERATIONS_PATH}")
}

async fn handle_generation(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let index = state.calls.fetch_add(1, Ordering::SeqCst) as usize;

    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *state.last_body.lock().unwrap() = Some(body);

    let (status, payload) = state
        .script
        .get(index)
        .or_else(|| state.script.last())
        .cloned()
        .expect("script is not empty");

    (status, Json(payload))
}
