//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use planner::{
    builder::BuilderError, calendar::CalendarError, export::ExportError, projection::WindowError,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{stripe::StripeError, supabase::SupabaseError};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body or parameters failed validation
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session
    #[error("Unauthorized")]
    Unauthorized,

    /// The caller has not paid
    #[error("Payment required")]
    PaymentRequired,

    /// Authenticated but acting on someone else's behalf
    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// A hosted provider rejected the call or could not be reached
    #[error("{provider} error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Internal server error
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                "Database error".to_string()
            }
            ApiError::Upstream { provider, message } => {
                error!("{} call failed: {}", provider, message);
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<SupabaseError> for ApiError {
    fn from(e: SupabaseError) -> Self {
        ApiError::Upstream {
            provider: "supabase",
            message: e.to_string(),
        }
    }
}

impl From<StripeError> for ApiError {
    fn from(e: StripeError) -> Self {
        ApiError::Upstream {
            provider: "stripe",
            message: e.to_string(),
        }
    }
}

impl From<BuilderError> for ApiError {
    fn from(e: BuilderError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<WindowError> for ApiError {
    fn from(e: WindowError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(e: CalendarError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        error!("Failed to render export: {}", e);
        ApiError::Internal
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
