use chrono::Duration;
use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenPair;
use crate::jwt::TokenSubject;
use crate::jwt::TokenType;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

const BEARER_PREFIX: &str = "Bearer ";

/// Validity windows for the two tokens of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWindows {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenWindows {
    fn default() -> Self {
        Self {
            access: Duration::hours(24),
            refresh: Duration::hours(168),
        }
    }
}

/// Why a request failed to authenticate.
///
/// Callers must surface all variants identically to clients; the distinction
/// exists for logs and tests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,
}

impl TokenRejection {
    /// Stable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            TokenRejection::MissingToken => "missing_token",
            TokenRejection::InvalidSignature => "invalid_signature",
            TokenRejection::Expired => "expired",
            TokenRejection::Malformed => "malformed",
        }
    }
}

impl From<JwtError> for TokenRejection {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidSignature => TokenRejection::InvalidSignature,
            JwtError::Expired => TokenRejection::Expired,
            JwtError::Malformed(_) | JwtError::EncodingFailed(_) | JwtError::InvalidWindow(_) => {
                TokenRejection::Malformed
            }
        }
    }
}

/// Authentication coordinator combining password hashing and token handling.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: TokenCodec,
    windows: TokenWindows,
}

impl Authenticator {
    /// Create a new authenticator with default hashing costs and windows.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_parts(
            PasswordHasher::new(),
            TokenCodec::new(jwt_secret),
            TokenWindows::default(),
        )
    }

    /// Assemble an authenticator from configured parts.
    pub fn with_parts(
        password_hasher: PasswordHasher,
        codec: TokenCodec,
        windows: TokenWindows,
    ) -> Self {
        Self {
            password_hasher,
            codec,
            windows,
        }
    }

    /// Hasher handle, for callers that move hashing onto another thread.
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    pub fn windows(&self) -> TokenWindows {
        self.windows
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a candidate password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Sign an access and a refresh token for the same subject.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_pair(&self, subject: &TokenSubject) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self
                .codec
                .sign(subject, TokenType::Access, self.windows.access)?,
            refresh_token: self
                .codec
                .sign(subject, TokenType::Refresh, self.windows.refresh)?,
        })
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.codec.parse(token)
    }

    /// Authenticate a request from the raw value of its `Authorization` header.
    ///
    /// Absent, empty or non-bearer values are `MissingToken`; everything else
    /// is decided by the codec. Only access tokens are accepted: a refresh
    /// token presented here is rejected as `Malformed`.
    pub fn authenticate_bearer(&self, header: Option<&str>) -> Result<Claims, TokenRejection> {
        let token = header
            .map(str::trim)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(TokenRejection::MissingToken)?;

        let claims = self.codec.parse(token)?;
        if claims.token_type != TokenType::Access {
            return Err(TokenRejection::Malformed);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::jwt::FixedClock;
    use crate::role::Role;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn subject() -> TokenSubject {
        TokenSubject {
            id: "user123".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_issue_pair_uses_both_windows() {
        let authenticator = Authenticator::new(SECRET);

        let pair = authenticator
            .issue_pair(&subject())
            .expect("Failed to issue pair");
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = authenticator
            .validate_token(&pair.access_token)
            .expect("Access token validation failed");
        let refresh = authenticator
            .validate_token(&pair.refresh_token)
            .expect("Refresh token validation failed");

        assert_eq!(access.sub, "user123");
        assert_eq!(refresh.sub, "user123");
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(access.exp - access.iat, 24 * 3600);
        assert_eq!(refresh.exp - refresh.iat, 168 * 3600);
    }

    #[test]
    fn test_hash_and_verify_password() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash));
        assert!(!authenticator.verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_authenticate_bearer_success() {
        let authenticator = Authenticator::new(SECRET);
        let pair = authenticator.issue_pair(&subject()).unwrap();

        let header = format!("Bearer {}", pair.access_token);
        let claims = authenticator
            .authenticate_bearer(Some(&header))
            .expect("Bearer authentication failed");

        assert_eq!(claims.subject(), subject());
    }

    #[test]
    fn test_authenticate_bearer_missing() {
        let authenticator = Authenticator::new(SECRET);

        for header in [None, Some(""), Some("   "), Some("Bearer "), Some("Basic abc")] {
            assert_eq!(
                authenticator.authenticate_bearer(header),
                Err(TokenRejection::MissingToken),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_authenticate_bearer_maps_codec_failures() {
        let authenticator = Authenticator::new(SECRET);
        let foreign = Authenticator::new(b"another_secret_key_at_least_32_bytes!")
            .issue_pair(&subject())
            .unwrap();

        assert_eq!(
            authenticator.authenticate_bearer(Some("Bearer invalid.token.here")),
            Err(TokenRejection::Malformed)
        );
        assert_eq!(
            authenticator.authenticate_bearer(Some(&format!("Bearer {}", foreign.access_token))),
            Err(TokenRejection::InvalidSignature)
        );
    }

    #[test]
    fn test_authenticate_bearer_expired() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = issued + Duration::hours(25);

        let issuing = Authenticator::with_parts(
            PasswordHasher::new(),
            TokenCodec::with_clock(SECRET, Arc::new(FixedClock(issued))),
            TokenWindows::default(),
        );
        let checking = Authenticator::with_parts(
            PasswordHasher::new(),
            TokenCodec::with_clock(SECRET, Arc::new(FixedClock(later))),
            TokenWindows::default(),
        );

        let pair = issuing.issue_pair(&subject()).unwrap();

        // Access window (24h) has passed; the live refresh token must not stand in for it
        assert_eq!(
            checking.authenticate_bearer(Some(&format!("Bearer {}", pair.access_token))),
            Err(TokenRejection::Expired)
        );
        assert_eq!(
            checking.authenticate_bearer(Some(&format!("Bearer {}", pair.refresh_token))),
            Err(TokenRejection::Malformed)
        );
    }

    #[test]
    fn test_authenticate_bearer_rejects_fresh_refresh_token() {
        let authenticator = Authenticator::new(SECRET);
        let pair = authenticator.issue_pair(&subject()).unwrap();

        assert_eq!(
            authenticator.authenticate_bearer(Some(&format!("Bearer {}", pair.refresh_token))),
            Err(TokenRejection::Malformed)
        );
    }

    #[test]
    fn test_rejection_codes_are_distinct() {
        let codes = [
            TokenRejection::MissingToken.code(),
            TokenRejection::InvalidSignature.code(),
            TokenRejection::Expired.code(),
            TokenRejection::Malformed.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
