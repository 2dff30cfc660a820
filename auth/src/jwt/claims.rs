use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use crate::role::Role;

/// Identity facts a token is minted for, without any timing information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Which half of a [`TokenPair`](super::TokenPair) a token is.
///
/// Only access tokens authenticate requests. Refresh tokens share the
/// identity claims but outlive the access window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Decoded content of a signed token.
///
/// Timestamps are Unix seconds. A well-formed value always has `exp > iat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub token_type: TokenType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Mint claims for a subject valid for `window` starting at `issued_at`.
    ///
    /// # Errors
    /// * `InvalidWindow` - Window is zero or negative
    pub fn for_subject(
        subject: &TokenSubject,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Self, JwtError> {
        if window.num_seconds() <= 0 {
            return Err(JwtError::InvalidWindow(window.num_seconds()));
        }

        let iat = issued_at.timestamp();

        Ok(Self {
            sub: subject.id.clone(),
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            last_name: subject.last_name.clone(),
            role: subject.role,
            token_type,
            iat,
            exp: iat + window.num_seconds(),
        })
    }

    /// Identity part of the claims.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.sub.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }

    /// Check if token is expired. Expiry is inclusive: at `exp` the token is dead.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub(crate) fn has_valid_window(&self) -> bool {
        self.exp > self.iat
    }
}
