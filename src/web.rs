use crate::client::{DEFAULT_UPSTREAM, DirectoryClient};
use crate::error::UpstreamError;
use crate::pages;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, warn};

type SharedState = Arc<AppState>;

const UNAVAILABLE_MESSAGE: &str = "The dictionary service could not be reached. Please try again later.";
const MALFORMED_MESSAGE: &str = "The dictionary service sent data that could not be read.";

pub struct AppState {
    pub client: DirectoryClient,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub upstream: String,
    pub public_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upstream: DEFAULT_UPSTREAM.to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        client: DirectoryClient::new(config.upstream.as_str())?,
    });
    let router = build_router(state, &config.public_dir);
    info!(
        %config.addr,
        upstream = %config.upstream,
        public_dir = %config.public_dir.display(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

/// Page routes first, then static files from `public_dir` for anything else.
pub fn build_router(state: SharedState, public_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/term/:term", get(term_html))
        .route("/search", get(search_html))
        .route("/healthz", get(health))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Everything a page handler can fail with. Both variants still answer with
/// an HTML page.
#[derive(Debug, Error)]
enum PageError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("no term matches {requested:?}")]
    NotFound { requested: String },
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound { requested } => (
                StatusCode::NOT_FOUND,
                Html(pages::not_found_page(&requested)),
            )
                .into_response(),
            PageError::Upstream(err) => {
                warn!(error = %err, "Dictionary request failed");
                let message = if err.is_malformed() {
                    MALFORMED_MESSAGE
                } else {
                    UNAVAILABLE_MESSAGE
                };
                (StatusCode::BAD_GATEWAY, Html(pages::error_page(message))).into_response()
            }
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "termgloss-web" }))
}

async fn index_html(State(state): State<SharedState>) -> Result<Html<String>, PageError> {
    let directory = state.client.fetch_all().await?;
    Ok(Html(pages::index_page(&directory)))
}

async fn term_html(
    State(state): State<SharedState>,
    Path(term): Path<String>,
) -> Result<Html<String>, PageError> {
    let requested = term.to_lowercase();
    let directory = state.client.fetch_all().await?;
    match directory.resolve(&requested) {
        Some(found) => Ok(Html(pages::term_page(found))),
        None => {
            debug!(%requested, terms = directory.len(), "No term matched");
            Err(PageError::NotFound { requested })
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_html(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, PageError> {
    let Some(query) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(Html(pages::no_query_page()));
    };
    let results = state.client.search(query).await?;
    debug!(%query, hits = results.len(), "Search finished");
    Ok(Html(pages::search_page(query, &results)))
}
