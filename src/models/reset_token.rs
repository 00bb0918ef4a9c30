//! Password reset token model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a reset token stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Purpose label stored alongside the token
pub const PASSWORD_RESET_PURPOSE: &str = "password_reset";

/// Single-use password reset token.
///
/// Keyed by user id, so a user can hold at most one outstanding token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// Owning user id (primary key)
    pub user_id: String,
    /// Opaque token value mailed to the user
    pub token: String,
    /// Purpose label
    pub purpose: String,
    /// When the token was issued
    pub created_at: DateTime<Utc>,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Issue a fresh token for the given user
    pub fn issue(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            token: Uuid::new_v4().to_string(),
            purpose: PASSWORD_RESET_PURPOSE.to_string(),
            created_at: now,
            expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_not_expired() {
        let token = PasswordResetToken::issue("user-1".to_string());
        assert!(!token.is_expired());
        assert_eq!(token.purpose, PASSWORD_RESET_PURPOSE);
    }

    #[test]
    fn test_expired_token_detected() {
        let mut token = PasswordResetToken::issue("user-1".to_string());
        token.expires_at = Utc::now() - Duration::minutes(1);
        assert!(token.is_expired());
    }
}
