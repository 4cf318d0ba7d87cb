use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use crate::infrastructure::security::PasswordHashing;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, instrument, trace, warn};

pub type SharedAuthService = Arc<AuthService<dyn AccountRepository>>;

// AppState holding the auth service and, through it, the account store
#[derive(Clone)]
pub struct AppState {
    pub auth_service: SharedAuthService,
}

impl AppState {
    pub fn new(accounts: Arc<dyn AccountRepository>, hashing: PasswordHashing) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(accounts, hashing)),
        }
    }
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    msg: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Account already exists, please login instead")]
    DuplicateAccount,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Credential store unavailable")]
    StoreUnavailable(String),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable kind, sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::DuplicateAccount => "duplicate_account",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::StoreUnavailable(_) => "store_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateAccount => StatusCode::CONFLICT,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Details of 5xx errors stay in the log
        match self {
            ApiError::StoreUnavailable(detail) => {
                error!(detail = %detail, status = %status, "Credential store error")
            }
            ApiError::Internal(detail) => {
                error!(detail = %detail, status = %status, "Internal error")
            }
            other => warn!(error = %other, status = %status, "Request rejected"),
        }

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: self.kind(),
            msg: self.to_string(),
        })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::DuplicateAccount => ApiError::DuplicateAccount,
            DomainError::InvalidCredentials => ApiError::InvalidCredentials,
            DomainError::StoreUnavailable(msg) => ApiError::StoreUnavailable(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => domain.into(),
            // anything else came out of the store driver
            Err(other) => ApiError::StoreUnavailable(format!("{:#}", other)),
        }
    }
}

/// Liveness probe.
#[instrument]
pub async fn ping() -> HttpResponse {
    trace!("Ping requested");
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("PONG")
}
