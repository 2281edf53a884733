use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("state store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error("assistant error: {0}")]
    Assistant(String),

    #[error("discovery error: {0}")]
    Discovery(String),

    #[error("routing error: {0}")]
    Routing(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Assistant(_) => StatusCode::BAD_GATEWAY,
            AppError::Discovery(_) => StatusCode::BAD_GATEWAY,
            AppError::Routing(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
