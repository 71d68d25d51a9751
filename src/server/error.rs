use crate::dispatch::DispatchError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error type for HTTP handlers. The message is sent back as a plain text body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request itself is unusable: bad upload, wrong file count, invalid parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Thumbnail generation failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(err) => {
                tracing::error!(error = %err, "thumbnail generation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
