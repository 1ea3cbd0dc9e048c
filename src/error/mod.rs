use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::integration::IntegrationError;
use crate::service::ServiceError;
use crate::template::{TemplateError, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Template rejected: {message}")]
    Rejected { message: String, code: Option<i64> },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ErrorDetail>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn hidden(log_msg: &str, production_msg: &str) -> String {
    if is_production() {
        production_msg.to_string()
    } else {
        log_msg.to_string()
    }
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotFound(id) => AppError::NotFound(format!("Draft not found: {id}")),
            TemplateError::Validation(errors) => AppError::Validation(errors),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<IntegrationError> for AppError {
    fn from(e: IntegrationError) -> Self {
        match e {
            IntegrationError::Rejected { message, code } => AppError::Rejected { message, code },
            IntegrationError::FlowNotFound(_) => AppError::BadRequest(e.to_string()),
            IntegrationError::RecordNotFound(_) => AppError::NotFound(e.to_string()),
            IntegrationError::NotConfigured(_) => AppError::Internal(e.to_string()),
            IntegrationError::Upload(_)
            | IntegrationError::UnexpectedResponse(_)
            | IntegrationError::Http(_) => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Template(e) => e.into(),
            ServiceError::Integration(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = Vec::new();
        let (status, code, client_message, log_message) = match &self {
            AppError::Validation(errors) => {
                details = errors
                    .iter()
                    .map(|e| ErrorDetail {
                        code: e.code(),
                        message: e.to_string(),
                    })
                    .collect();
                let msg = self.to_string();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    msg,
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                msg.clone(),
            ),
            // The vendor's user message is meant to be shown
            AppError::Rejected { message, code } => (
                StatusCode::BAD_GATEWAY,
                "TEMPLATE_REJECTED",
                message.clone(),
                format!("{message} (vendor code {code:?})"),
            ),
            AppError::Upstream(e) => {
                let client_msg = hidden(e, "Upstream service error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", client_msg, e.clone())
            }
            AppError::Internal(e) => {
                let client_msg = hidden(e, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    client_msg,
                    e.clone(),
                )
            }
        };

        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
