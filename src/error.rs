use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::manifest::ManifestError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("not support such type of package {0}")]
    Unsupported(String),

    #[error("Malformed manifest: {0}")]
    ManifestMalformed(#[from] ManifestError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Unsupported(_) => StatusCode::BAD_REQUEST,
            ServerError::ManifestMalformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Storage(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
