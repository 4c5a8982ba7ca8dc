/*!
Stub Elasticsearch server for tests

An axum server on an ephemeral local port. Responses are registered per
method + path (the query string is ignored) and every incoming request is
recorded so tests can assert on what was sent. Unregistered routes answer 404.
*/

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use anyhow::Result;

/// Canned response for one route
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: Value,
    /// Sent as-is instead of `body` when set
    pub raw_body: Option<String>,
    pub delay: Option<Duration>,
}

impl StubResponse {
    /// 200 with a JSON body
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body,
            raw_body: None,
            delay: None,
        }
    }

    /// Status code with an Elasticsearch-style error body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({"error": {"type": "stub_error", "reason": format!("stubbed status {status}")}, "status": status}),
            raw_body: None,
            delay: None,
        }
    }

    /// Status code with a non-JSON body
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Value::Null,
            raw_body: Some(body.into()),
            delay: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Hold the response back, e.g. to trip a client timeout
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One request as seen by the stub
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct StubState {
    routes: Arc<Mutex<HashMap<(String, String), StubResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running stub server; stops when dropped
pub struct EsStub {
    addr: SocketAddr,
    state: StubState,
    task: JoinHandle<()>,
}

impl EsStub {
    /// Bind `127.0.0.1:0` and start serving
    pub async fn start() -> Result<Self> {
        let state = StubState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ [STUB] Server stopped: {}", e);
            }
        });

        log::info!("🧪 [STUB] Elasticsearch stub listening on {}", addr);
        Ok(Self { addr, state, task })
    }

    /// Register (or replace) the response for `method path`
    pub fn on(&self, method: &str, path: &str, response: StubResponse) -> &Self {
        self.state
            .routes
            .lock()
            .insert((method.to_uppercase(), path.to_string()), response);
        self
    }

    /// 200 JSON response for `GET path`
    pub fn on_get(&self, path: &str, body: Value) -> &Self {
        self.on("GET", path, StubResponse::json(body))
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Requests received for `path`, any method
    pub fn hits(&self, path: &str) -> usize {
        self.state.requests.lock().iter().filter(|r| r.path == path).count()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().clear();
    }
}

impl Drop for EsStub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        user_agent: header_value(&headers, header::USER_AGENT),
        body,
    };
    log::debug!("📥 [STUB] {} {}", recorded.method, uri);

    let route = (recorded.method.clone(), recorded.path.clone());
    state.requests.lock().push(recorded);

    let response = state.routes.lock().get(&route).cloned();
    let Some(response) = response else {
        log::warn!("⚠️ [STUB] No route for {} {}", route.0, route.1);
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no stub route", "status": 404}))).into_response();
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match response.raw_body {
        Some(raw) => (status, raw).into_response(),
        None => (status, Json(response.body)).into_response(),
    }
}
