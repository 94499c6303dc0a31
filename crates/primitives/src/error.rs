use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use http::StatusCode;
use serde_json::json;
use std::fmt;
use uuid::Uuid;

#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidFormat,
    InvalidToken(String),
    InvalidCredentials,
    DuplicateUsername,
    InternalError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "Authorization header required"),
            AuthError::InvalidFormat => write!(f, "Invalid Authorization format"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::DuplicateUsername => write!(f, "Username already taken"),
            AuthError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug)]
pub enum ApiError {
    Database(diesel::result::Error),
    DatabaseConnection(String),
    Validation(validator::ValidationErrors),
    BadRequest(String),
    NotFound(String),
    InsufficientFunds { available: i64, requested: i64 },
    AlreadyPaid(Uuid),
    Conflict(String),
    DuplicateToken,
    TokenGeneration(String),
    Auth(AuthError),
    Token(String),
    Payment(String),
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Database(_) | ApiError::DatabaseConnection(_) => "storage_error",
            ApiError::Validation(_) | ApiError::BadRequest(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::InsufficientFunds { .. } => "insufficient_funds",
            ApiError::AlreadyPaid(_) => "already_paid",
            ApiError::Conflict(_) | ApiError::DuplicateToken => "conflict",
            ApiError::TokenGeneration(_) => "token_generation_failed",
            ApiError::Auth(_) | ApiError::Token(_) => "unauthorized",
            ApiError::Payment(_) => "payment_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::DatabaseConnection(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AlreadyPaid(_) | ApiError::Conflict(_) | ApiError::DuplicateToken => {
                StatusCode::CONFLICT
            }
            ApiError::Auth(AuthError::InvalidFormat) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::DuplicateUsername) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::InternalError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Token(_)
            | ApiError::TokenGeneration(_)
            | ApiError::Payment(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Validation(e) => write!(f, "Validation error: {}", e),
            ApiError::BadRequest(e) => write!(f, "Bad request: {}", e),
            ApiError::NotFound(e) => write!(f, "Not found: {}", e),
            ApiError::InsufficientFunds {
                available,
                requested,
            } => write!(
                f,
                "Insufficient funds: available={}, requested={}",
                available, requested
            ),
            ApiError::AlreadyPaid(id) => write!(f, "Debt {} is already paid", id),
            ApiError::Conflict(e) => write!(f, "Conflict: {}", e),
            ApiError::DuplicateToken => write!(f, "Recharge token already issued"),
            ApiError::TokenGeneration(e) => write!(f, "Token generation error: {}", e),
            ApiError::Auth(e) => write!(f, "Authentication error: {}", e),
            ApiError::Token(e) => write!(f, "Token error: {}", e),
            ApiError::Payment(e) => write!(f, "Payment error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            ApiError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<r2d2::PoolError> for ApiError {
    fn from(err: r2d2::PoolError) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        (err.status(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // storage and internal details stay in the logs
        let message = match &self {
            ApiError::Database(diesel::result::Error::NotFound) => "Record not found".to_string(),
            ApiError::Database(_) | ApiError::DatabaseConnection(_) => {
                tracing::error!("storage failure: {}", self);
                "Storage unavailable".to_string()
            }
            ApiError::Internal(_) | ApiError::Token(_) => {
                tracing::error!("internal failure: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut body = json!({
            "error": self.code(),
            "message": message,
        });

        if let ApiError::InsufficientFunds {
            available,
            requested,
        } = &self
        {
            body["available"] = json!(available);
            body["requested"] = json!(requested);
        }

        (status, Json(body)).into_response()
    }
}
