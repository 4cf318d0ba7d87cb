use crate::domain::account::{AccountProfile, LoginRequest, SignupRequest};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::validation::Validated;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub msg: String,
    pub account: AccountProfile,
}

#[instrument(skip(state, req))]
pub async fn signup(
    state: web::Data<AppState>,
    Validated(req): Validated<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %req.email, "Signup request received");

    let account = state.auth_service.signup(req).await.map_err(|e| {
        error!(error = %e, "Failed to sign up");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        msg: format!("Welcome, {}! Signed up successfully", account.name),
        account: account.profile(),
    }))
}

#[instrument(skip(state, req))]
pub async fn login(
    state: web::Data<AppState>,
    Validated(req): Validated<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(email = %req.email, "Login request received");

    let account = state.auth_service.login(req).await.map_err(|e| {
        error!(error = %e, "Failed to log in");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        msg: format!("Welcome back, {}! Logged in successfully", account.name),
        account: account.profile(),
    }))
}
