use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy for the account routes. Everything a handler can raise
/// funnels through here and comes out as a structured JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct FailureBody<'a> {
    status: &'static str,
    message: &'a str,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::Unauthorized(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Validation(m) | Self::Conflict(m) | Self::Unauthorized(m) => m.clone(),
            // Internal detail goes to the log, never to the caller.
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                "Please try again!".to_string()
            }
        };
        (
            self.status_code(),
            Json(FailureBody {
                status: "FAILED",
                message: &message,
            }),
        )
            .into_response()
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};
        // The only unique index is on email, so a duplicate-key write can
        // mean exactly one thing.
        if let ErrorKind::Write(WriteFailure::WriteError(ref write)) = *err.kind {
            if write.code == 11000 {
                return AppError::Conflict("User with the email already exists".into());
            }
        }
        AppError::Internal(err.into())
    }
}
