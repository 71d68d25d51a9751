//! HTTP front-end: upload a video, get a thumbnail back.

mod error;
mod handlers;

use crate::config::Options;
use crate::media::MediaOperations;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{AppError, AppResult};
pub use handlers::{PulseResponse, ThumbnailParams};

/// Cumulative request counters reported by `/pulse`.
#[derive(Debug, Default)]
pub struct Stats {
    pub requests: AtomicU64,
    pub errors: AtomicU64,
}

/// Shared state of all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub options: Arc<Options>,
    pub media: Arc<dyn MediaOperations>,
    pub stats: Arc<Stats>,
}

impl AppState {
    pub fn new(options: Arc<Options>, media: Arc<dyn MediaOperations>) -> Self {
        Self {
            options,
            media,
            stats: Arc::new(Stats::default()),
        }
    }
}

async fn count_requests(State(stats): State<Arc<Stats>>, request: Request, next: Next) -> Response {
    stats.requests.fetch_add(1, Ordering::Relaxed);
    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        stats.errors.fetch_add(1, Ordering::Relaxed);
    }
    response
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/thumbnail/simple", post(handlers::simple_thumbnail))
        .route("/thumbnail/sprite", post(handlers::sprite_thumbnail))
        .route("/help", get(handlers::help))
        .route("/pulse", get(handlers::pulse))
        .layer(DefaultBodyLimit::max(state.options.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.stats.clone(),
            count_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Serves the thumbnail endpoints on `options.host:options.port` until Ctrl-C.
pub async fn serve(
    options: Arc<Options>,
    media: Arc<dyn MediaOperations>,
) -> color_eyre::Result<()> {
    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("Listening for requests on {}", listener.local_addr()?);

    let app = build_router(AppState::new(options, media));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
