pub mod handlers;

use std::sync::Arc;
use axum::{routing::{get, post}, Router};

pub use handlers::{add_block, check_health, AppState};

/// Create the note API router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/check", get(check_health))
        .route("/api/add-block", post(add_block))
}
