use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ServerError;
use crate::notes::{BlockIngestService, BlockSubmission};
use crate::store::NoteStore;

/// Application state shared across handlers
pub struct AppState {
    pub ingest: BlockIngestService,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            ingest: BlockIngestService::new(store),
        }
    }
}

/// GET /api/check - Health check
pub async fn check_health() -> &'static str {
    "ok"
}

/// POST /api/add-block - Store a new annotation
pub async fn add_block(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BlockSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("add_block: rejected body: {}", rejection.body_text());
            return ServerError::Validation(rejection.body_text()).into_response();
        }
    };

    tracing::debug!(
        "add_block: project={} file={} lines={}",
        submission.project,
        submission.file,
        submission.line_nums
    );

    match state.ingest.ingest(submission).await {
        Ok(block) => (StatusCode::OK, Json(block)).into_response(),
        Err(e) => e.into_response(),
    }
}
