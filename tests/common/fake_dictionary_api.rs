//! Fake dictionary API for integration tests.
//!
//! Spins up a small `axum` server on a random port bound to 127.0.0.1 that
//! serves:
//! - `GET /list` with the configured terms
//! - `GET /search/{query}` with the configured results
//!
//! Either route can be switched to a fixed status code or a raw body, which
//! is how the tests provoke 4xx, 5xx and malformed responses.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Canned answer for one route.
#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(StatusCode),
    Raw(String),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => axum::Json(value).into_response(),
            Reply::Status(status) => (status, "upstream says no").into_response(),
            Reply::Raw(body) => {
                ([("content-type", "application/json")], body).into_response()
            }
        }
    }
}

struct ApiState {
    list: Reply,
    search: Reply,
    /// Path segment of the most recent `/search` request, as decoded by axum.
    last_search: Option<String>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            list: Reply::Json(Value::Array(Vec::new())),
            search: Reply::Json(Value::Array(Vec::new())),
            last_search: None,
        }
    }
}

/// Handle to the running fake dictionary API.
pub struct FakeDictionaryApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeDictionaryApi {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/list", get(list))
            .route("/search/:query", get(search))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL to hand to `DirectoryClient::new`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_terms(&self, terms: Vec<Value>) {
        self.state.lock().await.list = Reply::Json(Value::Array(terms));
    }

    pub async fn set_search_results(&self, results: Vec<Value>) {
        self.state.lock().await.search = Reply::Json(Value::Array(results));
    }

    pub async fn fail_list(&self, status: u16) {
        self.state.lock().await.list = Reply::Status(status_code(status));
    }

    pub async fn fail_search(&self, status: u16) {
        self.state.lock().await.search = Reply::Status(status_code(status));
    }

    pub async fn set_raw_list(&self, body: &str) {
        self.state.lock().await.list = Reply::Raw(body.to_string());
    }

    pub async fn last_search(&self) -> Option<String> {
        self.state.lock().await.last_search.clone()
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap()
}

async fn list(State(state): State<Arc<Mutex<ApiState>>>) -> Reply {
    state.lock().await.list.clone()
}

async fn search(
    Path(query): Path<String>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Reply {
    let mut state = state.lock().await;
    state.last_search = Some(query);
    state.search.clone()
}
