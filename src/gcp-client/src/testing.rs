//! In-process stand-in for the Monitoring, Logging, Trace and OAuth endpoints.
//!
//! Only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! gcp-client = { path = "../gcp-client", features = ["testing"] }
//! ```
//!
//! Each endpoint serves a fixed list of pages. Page `N` is returned for the
//! page token `page-N` and links to `page-N+1` while more pages remain.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::config::HttpConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The fake's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TimeSeries,
    LogEntries,
    Traces,
    Token,
}

impl Endpoint {
    /// Field holding the items of one page.
    fn items_field(self) -> &'static str {
        match self {
            Endpoint::TimeSeries => "timeSeries",
            Endpoint::LogEntries => "entries",
            Endpoint::Traces => "traces",
            Endpoint::Token => "",
        }
    }
}

/// One request as seen by the fake.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: Endpoint,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// Decoded value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref().and_then(|q| form_value(q, name))
    }

    /// Decoded value of a form-encoded body field.
    pub fn form_param(&self, name: &str) -> Option<String> {
        form_value(&self.body, name)
    }

    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Default)]
struct FakeState {
    pages: HashMap<Endpoint, Vec<Vec<Value>>>,
    failures: HashMap<Endpoint, (u16, String)>,
    requests: Vec<RecordedRequest>,
    token_ttl: u64,
    tokens_issued: usize,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Serve on an ephemeral localhost port.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            token_ttl: 3600,
            ..FakeState::default()
        }));

        let app = Router::new()
            .route("/v3/projects/:project/timeSeries", get(time_series))
            .route("/v2/*method", post(log_entries))
            .route("/v1/projects/:project/traces", get(traces))
            .route("/token", post(token))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Fake backend stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// OAuth token endpoint, for use as a credential's `token_uri`.
    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url())
    }

    /// HTTP settings pointing every API at this fake.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
            monitoring_endpoint: self.base_url(),
            logging_endpoint: self.base_url(),
            trace_endpoint: self.base_url(),
        }
    }

    /// Pages served by `endpoint`, each a list of JSON items.
    pub fn set_pages(&self, endpoint: Endpoint, pages: Vec<Vec<Value>>) {
        self.lock().pages.insert(endpoint, pages);
    }

    /// Answer every request to `endpoint` with an error status.
    pub fn fail(&self, endpoint: Endpoint, status: u16, message: impl Into<String>) {
        self.lock()
            .failures
            .insert(endpoint, (status, message.into()));
    }

    pub fn clear_failure(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Lifetime of issued tokens, in seconds.
    pub fn set_token_ttl(&self, seconds: u64) {
        self.lock().token_ttl = seconds;
    }

    pub fn tokens_issued(&self) -> usize {
        self.lock().tokens_issued
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        lock(&self.state)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn form_value(encoded: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

type Reply = (StatusCode, Json<Value>);

fn record(
    state: &Shared,
    endpoint: Endpoint,
    path: String,
    query: Option<String>,
    headers: &HeaderMap,
    body: String,
) -> Result<(), Reply> {
    let mut state = lock(state);
    state.requests.push(RecordedRequest {
        endpoint,
        path,
        query,
        body,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    match state.failures.get(&endpoint) {
        Some((status, message)) => {
            let code = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({
                "error": { "code": status, "message": message, "status": code.canonical_reason().unwrap_or("") }
            });
            Err((code, Json(body)))
        }
        None => Ok(()),
    }
}

fn page(state: &Shared, endpoint: Endpoint, page_token: Option<&str>) -> Reply {
    let state = lock(state);
    let pages = state.pages.get(&endpoint).cloned().unwrap_or_default();
    let index = page_token
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = serde_json::Map::new();
    body.insert(
        endpoint.items_field().to_string(),
        Value::Array(pages.get(index).cloned().unwrap_or_default()),
    );
    if index + 1 < pages.len() {
        body.insert(
            "nextPageToken".to_string(),
            Value::String(format!("page-{}", index + 1)),
        );
    }
    (StatusCode::OK, Json(Value::Object(body)))
}

async fn time_series(
    State(state): State<Shared>,
    Path(project): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/v3/projects/{project}/timeSeries");
    if let Err(reply) = record(&state, Endpoint::TimeSeries, path, query.clone(), &headers, String::new()) {
        return reply;
    }
    let token = query.as_deref().and_then(|q| form_value(q, "pageToken"));
    page(&state, Endpoint::TimeSeries, token.as_deref())
}

async fn log_entries(
    State(state): State<Shared>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Reply {
    if method != "entries:list" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": 404, "message": format!("unknown method {method}") } })),
        );
    }
    let path = format!("/v2/{method}");
    if let Err(reply) = record(&state, Endpoint::LogEntries, path, None, &headers, body.clone()) {
        return reply;
    }
    let token = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("pageToken").and_then(Value::as_str).map(str::to_string));
    page(&state, Endpoint::LogEntries, token.as_deref())
}

async fn traces(
    State(state): State<Shared>,
    Path(project): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/v1/projects/{project}/traces");
    if let Err(reply) = record(&state, Endpoint::Traces, path, query.clone(), &headers, String::new()) {
        return reply;
    }
    let token = query.as_deref().and_then(|q| form_value(q, "pageToken"));
    page(&state, Endpoint::Traces, token.as_deref())
}

async fn token(State(state): State<Shared>, headers: HeaderMap, body: String) -> Reply {
    if let Err(reply) = record(&state, Endpoint::Token, "/token".to_string(), None, &headers, body) {
        return reply;
    }
    let mut state = lock(&state);
    state.tokens_issued += 1;
    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("fake-token-{}", state.tokens_issued),
            "token_type": "Bearer",
            "expires_in": state.token_ttl,
        })),
    )
}
