//! Development backend speaking the floor-plan editor wire contract.
//!
//! No inference happens here: `/upload` replays a configured response body
//! and `/edit` echoes the current walls back unless a scripted response is set.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub mod routes;

/// Uploaded images larger than this are rejected by the extractor
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Default)]
pub struct AppState {
    /// Body returned by `/upload`; `None` answers `{"walls": []}`
    pub upload_response: Option<Arc<Value>>,
    /// Body returned by `/edit`; `None` echoes `current_walls`
    pub edit_response: Option<Arc<Value>>,
}

impl AppState {
    pub fn with_upload_response(mut self, body: Value) -> Self {
        self.upload_response = Some(Arc::new(body));
        self
    }

    pub fn with_edit_response(mut self, body: Value) -> Self {
        self.edit_response = Some(Arc::new(body));
        self
    }

    /// Read scripted responses from `FLOORPLAN_FIXTURE` / `FLOORPLAN_EDIT_FIXTURE`
    pub fn from_env() -> Self {
        Self {
            upload_response: load_fixture("FLOORPLAN_FIXTURE"),
            edit_response: load_fixture("FLOORPLAN_EDIT_FIXTURE"),
        }
    }
}

fn load_fixture(var: &str) -> Option<Arc<Value>> {
    let path = std::env::var(var).ok()?;
    match std::fs::read_to_string(&path) {
        Ok(json) => match serde_json::from_str::<Value>(&json) {
            Ok(value) => {
                tracing::info!("Loaded {var} from {path}");
                Some(Arc::new(value))
            }
            Err(e) => {
                tracing::error!("Failed to parse {var} JSON from {path}: {e}");
                None
            }
        },
        Err(e) => {
            tracing::error!("Failed to read {var} file {path}: {e}");
            None
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/upload", post(routes::upload))
        .route("/edit", post(routes::edit))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already-bound listener until the task is dropped
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
