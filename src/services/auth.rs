//! Authorization service
//!
//! Implements the account and token lifecycle:
//! - sign-up with confirmation check and email uniqueness
//! - sign-in issuing HS512 bearer tokens with a uniform failure message
//! - sign-out through the JWT deny list, purging expired records first
//! - forgot/reset password with single-use, short-lived tokens

use crate::db::repositories::{DenyListRepository, ResetTokenRepository, UserRepository};
use crate::models::{JwtDenyRecord, PasswordResetToken, User};
use crate::services::email::EmailSender;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{strip_bearer, TokenCodec};
use anyhow::Context;
use std::sync::Arc;

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Uniform message for any bad credential pair. Never reveals whether the
/// email exists.
const BAD_CREDENTIALS: &str = "Email or password is incorrect";

/// Error types for authorization operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Authentication failed (invalid credentials or token)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A successful sign-in: the user plus their bearer token
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub authentication_token: String,
}

/// Authorization service
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    deny_repo: Arc<dyn DenyListRepository>,
    reset_repo: Arc<dyn ResetTokenRepository>,
    email_sender: Arc<dyn EmailSender>,
    token_codec: Arc<TokenCodec>,
}

impl AuthService {
    /// Create a new authorization service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        deny_repo: Arc<dyn DenyListRepository>,
        reset_repo: Arc<dyn ResetTokenRepository>,
        email_sender: Arc<dyn EmailSender>,
        token_codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            user_repo,
            deny_repo,
            reset_repo,
            email_sender,
            token_codec,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for a bad email, short password or confirmation
    ///   mismatch; no user is created in any of these cases
    /// - `UserExists` when the email is already registered
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthServiceError> {
        let email = email.trim();
        validate_email(email)?;
        validate_password(password)?;
        if password != password_confirmation {
            return Err(AuthServiceError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(AuthServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let password_hash = hash_password(password)?;
        let user = User::new(email.to_string(), password_hash);
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Authenticate and issue a bearer token.
    ///
    /// # Errors
    ///
    /// `AuthenticationError` with a uniform message for an unknown email or
    /// a wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthServiceError> {
        let user = self
            .user_repo
            .get_by_email(email.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                AuthServiceError::AuthenticationError(BAD_CREDENTIALS.to_string())
            })?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthServiceError::AuthenticationError(
                BAD_CREDENTIALS.to_string(),
            ));
        }

        let authentication_token = self.token_codec.issue(&user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(SignedIn {
            user,
            authentication_token,
        })
    }

    /// Revoke the presented token by adding it to the deny list.
    ///
    /// Expired deny records are purged first, so the table only ever grows
    /// by live tokens. Signing out an already-revoked token succeeds.
    ///
    /// # Errors
    ///
    /// `AuthenticationError` when the Authorization header is missing or
    /// not a well-formed bearer token.
    pub async fn sign_out(
        &self,
        authorization_header: Option<&str>,
    ) -> Result<(), AuthServiceError> {
        let token = authorization_header
            .and_then(strip_bearer)
            .ok_or_else(|| {
                AuthServiceError::AuthenticationError(
                    "Missing or malformed Authorization header".to_string(),
                )
            })?;

        let claims = self.token_codec.parse_claims(token).map_err(|_| {
            AuthServiceError::AuthenticationError("Invalid bearer token".to_string())
        })?;

        let now = chrono::Utc::now().timestamp();
        let purged = self.deny_repo.delete_expired(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired deny records");
        }

        self.deny_repo
            .create(&JwtDenyRecord {
                jti: claims.jti.clone(),
                iat: claims.iat,
                exp: claims.exp,
            })
            .await?;

        tracing::info!(user_id = %claims.sub, "User signed out");
        Ok(())
    }

    /// Whether the presented token has been revoked.
    ///
    /// An absent or malformed token is reported as not denied; standard
    /// bearer validation rejects it separately.
    pub async fn is_token_in_deny_list(
        &self,
        authorization_header: Option<&str>,
    ) -> Result<bool, AuthServiceError> {
        let Some(token) = authorization_header.and_then(strip_bearer) else {
            return Ok(false);
        };
        let Ok(claims) = self.token_codec.parse_claims(token) else {
            return Ok(false);
        };

        let denied = self.deny_repo.get_by_jti(&claims.jti).await?.is_some();
        Ok(denied)
    }

    /// Start a password reset.
    ///
    /// An unknown email succeeds without sending anything, so the endpoint
    /// never leaks which addresses are registered.
    ///
    /// # Errors
    ///
    /// `ValidationError` when an unexpired token is already outstanding, or
    /// when the reset mail could not be sent. A failed send removes the
    /// stored token so the user can retry immediately.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthServiceError> {
        let Some(user) = self
            .user_repo
            .get_by_email(email.trim())
            .await
            .context("Failed to look up user")?
        else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        if let Some(existing) = self.reset_repo.get_by_user_id(&user.id).await? {
            if !existing.is_expired() {
                return Err(AuthServiceError::ValidationError(
                    "A reset link was recently sent. Please check your inbox.".to_string(),
                ));
            }
            // Expired token is replaced silently below
        }

        let token = PasswordResetToken::issue(user.id.clone());
        self.reset_repo.save(&token).await?;

        if let Err(e) = self
            .email_sender
            .send_password_reset(&user.email, &token.token)
            .await
        {
            // A failed send must not leave the stored token behind, or the
            // user would be locked out of retrying until it expires
            self.reset_repo.delete(&user.id).await?;
            tracing::error!(user_id = %user.id, "Failed to send reset email: {:#}", e);
            return Err(AuthServiceError::ValidationError(
                "Could not send the reset email. Please try again later.".to_string(),
            ));
        }

        tracing::info!(user_id = %user.id, "Password reset issued");
        Ok(())
    }

    /// Finish a password reset.
    ///
    /// The presented token must equal the stored one, be unexpired, and the
    /// new password must pass policy with a matching confirmation. The token
    /// is deleted on success.
    pub async fn reset_password(
        &self,
        token: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), AuthServiceError> {
        validate_password(password)?;
        if password != password_confirmation {
            return Err(AuthServiceError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        let invalid = || {
            AuthServiceError::ValidationError("Invalid or expired reset token".to_string())
        };

        let user = self
            .user_repo
            .get_by_email(email.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(invalid)?;

        let stored = self
            .reset_repo
            .get_by_user_id(&user.id)
            .await?
            .ok_or_else(invalid)?;

        if stored.token != token || stored.is_expired() {
            return Err(invalid());
        }

        let password_hash = hash_password(password)?;
        self.user_repo.update_password(&user.id, &password_hash).await?;
        self.reset_repo.delete(&user.id).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AuthServiceError> {
    if email.is_empty() || !email.contains('@') {
        return Err(AuthServiceError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthServiceError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
