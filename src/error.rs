// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every failure that crosses the request boundary is one of these variants;
/// internal detail (SQL text, driver messages) is logged but never surfaced.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    /// Tenant code at register/login does not match any tenant
    InvalidTenant,
    /// A referenced branch does not belong to the caller's tenant
    InvalidReference(String),

    // 401 Unauthorized
    /// Missing, malformed, expired or signature-invalid token
    Unauthenticated(String),
    /// Login failure; deliberately does not distinguish unknown user from
    /// wrong password
    InvalidCredentials,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    UsernameExists,
    DuplicatePatient,

    // 500 Internal Server Error
    InternalServerError(String),
    Database(sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidTenant => StatusCode::BAD_REQUEST,
            ApiError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UsernameExists => StatusCode::CONFLICT,
            ApiError::DuplicatePatient => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::InvalidTenant => "Invalid tenant code".to_string(),
            ApiError::InvalidReference(msg) => msg.clone(),
            ApiError::Unauthenticated(msg) => msg.clone(),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::UsernameExists => "Username already exists".to_string(),
            ApiError::DuplicatePatient => {
                "A patient with this phone number already exists in this tenant".to_string()
            }
            // Internal detail is logged, not returned
            ApiError::InternalServerError(_) | ApiError::Database(_) => {
                "An error occurred while processing your request".to_string()
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidTenant => "INVALID_TENANT",
            ApiError::InvalidReference(_) => "INVALID_REFERENCE",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UsernameExists => "USERNAME_EXISTS",
            ApiError::DuplicatePatient => "DUPLICATE_PATIENT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods for the variants that carry a message
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_reference(message: impl Into<String>) -> Self {
        ApiError::InvalidReference(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
            }
            ApiError::InternalServerError(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            _ => {}
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
