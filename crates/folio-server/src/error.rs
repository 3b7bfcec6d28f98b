use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use folio_media::MediaError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("admin token required")]
    AuthorizationDenied,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("database error: {0}")]
    Database(#[from] folio_db::DbError),

    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AuthFailed(_) | Self::AuthorizationDenied => StatusCode::UNAUTHORIZED,
            Self::Media(err) => match err {
                MediaError::Validation(_) | MediaError::UnsupportedContent { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MediaError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
                MediaError::Storage { .. } | MediaError::Database { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(_)
            | Self::Store(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
