//! Account and session endpoints.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::middleware::{authorization_header, ApiError, AppState};
use super::responses::{SignedInResponse, UserResponse};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/users
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .auth_service
        .sign_up(&body.email, &body.password, &body.password_confirmation)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/sign_in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SignedInResponse>, ApiError> {
    let signed_in = state.auth_service.sign_in(&body.email, &body.password).await?;
    Ok(Json(SignedInResponse {
        id: signed_in.user.id,
        email: signed_in.user.email,
        authentication_token: signed_in.authentication_token,
    }))
}

/// DELETE /api/auth/sign_out
///
/// Takes the raw request so the Authorization header can be forwarded
/// verbatim; the service does its own bearer parsing.
pub async fn sign_out(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let header = authorization_header(&request);
    state.auth_service.sign_out(header.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/forgot_password
///
/// Always answers with the same message so the endpoint cannot be used
/// to probe which addresses are registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.forgot_password(&body.email).await?;
    Ok(Json(MessageResponse {
        message: "If your email is registered, a reset link has been sent".to_string(),
    }))
}

/// POST /api/auth/reset_password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .reset_password(
            &body.token,
            &body.email,
            &body.password,
            &body.password_confirmation,
        )
        .await?;
    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
