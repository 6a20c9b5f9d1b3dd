use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::SIGN_IN_PATH;
use crate::validation::{FieldError, ValidationErrors};

pub type Result<T> = std::result::Result<T, FaithGuidanceError>;

/// Message shown to users when the generative endpoint cannot answer.
pub const GUIDANCE_UNAVAILABLE_NOTICE: &str =
    "Failed to get spiritual guidance. Please try again later.";

#[derive(Debug, Error)]
pub enum FaithGuidanceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Guidance unavailable: {0}")]
    GuidanceUnavailable(String),

    #[error("Failed to save guidance history: {0}")]
    Persistence(String),

    #[error("Please sign in to receive guidance")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Failed to create Redis pool: {0}")]
    PoolCreation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for FaithGuidanceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for FaithGuidanceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
            redirect: None,
        }
    }
}

impl IntoResponse for FaithGuidanceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            FaithGuidanceError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: "Some fields need attention".to_string(),
                    fields: Some(errors.into_fields()),
                    redirect: None,
                },
            ),
            FaithGuidanceError::InvalidBody { status, message } => {
                (status, ErrorBody::message(message))
            }
            FaithGuidanceError::GuidanceUnavailable(detail) => {
                tracing::warn!("guidance unavailable: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody::message(GUIDANCE_UNAVAILABLE_NOTICE),
                )
            }
            FaithGuidanceError::Persistence(detail) => {
                tracing::error!("persistence error: {detail}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody::message("Failed to save your guidance history"),
                )
            }
            FaithGuidanceError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: FaithGuidanceError::Unauthorized.to_string(),
                    fields: None,
                    redirect: Some(SIGN_IN_PATH),
                },
            ),
            FaithGuidanceError::NotFound(what) => {
                (StatusCode::NOT_FOUND, ErrorBody::message(format!("{what} not found")))
            }
            other => {
                tracing::error!("internal error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
