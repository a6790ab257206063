use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use postgrad_schema::ErrorBody;
use thiserror::Error as ThisError;
use tracing::{debug, error};

use super::MailError;

#[derive(Debug, ThisError)]
pub enum AppError {
    /// A required field is absent/blank or has the wrong shape.
    #[error("{0}")]
    Validation(String),

    /// The unique constraint on `student_email` rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ractor error: {0}")]
    Actor(String),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Actor(_) | AppError::Mail(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected request body");
        AppError::Validation("Request body must be a valid JSON object.".to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected path parameter");
        AppError::Validation("Student id must be an integer.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Database(e) => {
                error!(error = %e, "database operation failed");
                "Database operation failed.".to_string()
            }
            AppError::Actor(e) => {
                error!(error = %e, "store actor unreachable");
                "Database operation failed.".to_string()
            }
            AppError::Mail(e) => {
                error!(error = %e, "mail delivery failed");
                format!("Email could not be sent: {e}")
            }
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
