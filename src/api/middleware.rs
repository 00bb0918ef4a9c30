//! API middleware
//!
//! Bearer-token authentication for protected routes and the shared
//! error envelope returned by every handler.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::services::{
    ArticleService, ArticleServiceError, AuthService, AuthServiceError, FileStorageError,
    FileStorageService, LanguageService, LanguageServiceError, TokenCodec,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub auth_service: Arc<AuthService>,
    pub article_service: Arc<ArticleService>,
    pub language_service: Arc<LanguageService>,
    pub file_service: Arc<FileStorageService>,
    pub token_codec: Arc<TokenCodec>,
    /// Public base URL used when building absolute image links
    pub public_url: Option<String>,
}

/// Authenticated principal extracted from a validated bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Internal error: the detail goes to the logs, the client gets a
    /// generic message plus a trace id to quote when reporting the problem.
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        let trace_id = Uuid::new_v4().to_string();
        tracing::error!(trace_id = %trace_id, "Internal error: {}", detail);
        Self::with_details(
            "INTERNAL_ERROR",
            "An internal error occurred",
            serde_json::json!({ "trace_id": trace_id }),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            AuthServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AuthServiceError::UserExists(msg) => ApiError::new("CONFLICT", msg),
            AuthServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(err: ArticleServiceError) -> Self {
        match err {
            ArticleServiceError::NotFound(id) => {
                ApiError::not_found(format!("Article not found: {}", id))
            }
            ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ArticleServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

impl From<LanguageServiceError> for ApiError {
    fn from(err: LanguageServiceError) -> Self {
        match err {
            LanguageServiceError::NotFound(id) => {
                ApiError::not_found(format!("Language not found: {}", id))
            }
            LanguageServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            LanguageServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

impl From<FileStorageError> for ApiError {
    fn from(err: FileStorageError) -> Self {
        match err {
            FileStorageError::NotFound(name) => {
                ApiError::not_found(format!("File not found: {}", name))
            }
            FileStorageError::ValidationError(msg) => ApiError::validation_error(msg),
            FileStorageError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Extract the raw Authorization header value from a request
pub fn authorization_header(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Authentication middleware for protected routes.
///
/// Validates the bearer token (signature, expiry, issuer, audience) and
/// then rejects tokens whose jti sits in the deny list.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = authorization_header(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let token = crate::services::token::strip_bearer(&header_value)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = state
        .token_codec
        .validate(token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    let denied = state
        .auth_service
        .is_token_in_deny_list(Some(&header_value))
        .await?;
    if denied {
        return Err(ApiError::unauthorized("Token has been revoked"));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
    });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_api_error_codes_map_to_statuses() {
        let cases = [
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::validation_error("x"), StatusCode::BAD_REQUEST),
            (ApiError::new("CONFLICT", "x"), StatusCode::CONFLICT),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_error_carries_trace_id() {
        let error = ApiError::internal_error("database exploded");
        assert_eq!(error.error.code, "INTERNAL_ERROR");
        // The detail never reaches the client
        assert!(!error.error.message.contains("database"));
        let details = error.error.details.expect("Trace id details expected");
        assert!(details.get("trace_id").is_some());
    }

    #[test]
    fn test_authorization_header_extraction() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(authorization_header(&request), Some("Bearer abc".to_string()));

        let bare = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(authorization_header(&bare).is_none());
    }

    #[test]
    fn test_service_error_conversion() {
        let err: ApiError = AuthServiceError::AuthenticationError("nope".to_string()).into();
        assert_eq!(err.error.code, "UNAUTHORIZED");

        let err: ApiError = ArticleServiceError::NotFound("a1".to_string()).into();
        assert_eq!(err.error.code, "NOT_FOUND");

        let err: ApiError = LanguageServiceError::ValidationError("dup".to_string()).into();
        assert_eq!(err.error.code, "VALIDATION_ERROR");
    }
}
