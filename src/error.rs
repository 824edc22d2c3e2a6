use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Request-scoped failures of the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("failed to decode item {index}: {reason}")]
    DecodeFailure { index: usize, reason: String },
    #[error("{0}")]
    InvalidQuery(String),
}

impl CatalogError {
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::BackendUnavailable(_) => "backend_unavailable",
            CatalogError::DecodeFailure { .. } => "decode_failure",
            CatalogError::InvalidQuery(_) => "invalid_query",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            CatalogError::BackendUnavailable(_) | CatalogError::DecodeFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_string())).into_response()
    }
}
