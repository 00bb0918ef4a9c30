//! JWT deny-list record

use serde::{Deserialize, Serialize};

/// A revoked token, keyed by its jti claim.
///
/// iat/exp are unix timestamps copied from the token so expired records can
/// be purged without re-parsing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtDenyRecord {
    /// Token id (jti claim)
    pub jti: String,
    /// Issued-at unix timestamp
    pub iat: i64,
    /// Expiry unix timestamp
    pub exp: i64,
}

impl JwtDenyRecord {
    /// Whether the underlying token has already expired at `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let record = JwtDenyRecord {
            jti: "abc".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        assert!(record.is_expired(2_001));
        assert!(!record.is_expired(2_000));
        assert!(!record.is_expired(1_500));
    }
}
