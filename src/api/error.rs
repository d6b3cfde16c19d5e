use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::PollError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    AlreadyVoted,

    Expired,

    RateLimited { retry_after: u64 },

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::AlreadyVoted => write!(f, "Already voted"),
            ApiError::Expired => write!(f, "Poll has expired"),
            ApiError::RateLimited { retry_after } => {
                write!(f, "Rate limited, retry after {}s", retry_after)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::AlreadyVoted => (
                StatusCode::FORBIDDEN,
                "You have already voted on this poll".to_string(),
            ),
            ApiError::Expired => (StatusCode::FORBIDDEN, "Poll has expired".to_string()),
            ApiError::RateLimited { retry_after } => {
                let body = ApiResponse::<()>::error("Too many requests");
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("Retry-After", retry_after.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::NotFound(id) => ApiError::poll_not_found(&id),
            PollError::Validation(msg) => ApiError::ValidationError(msg),
            PollError::AlreadyVoted => ApiError::AlreadyVoted,
            PollError::Expired => ApiError::Expired,
            PollError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn poll_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Poll {} not found", id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
