use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::TokenPair;
use auth::TokenSubject;

use crate::domain::user::models::timestamp_now;
use crate::domain::user::models::User;
use crate::domain::user::service::with_deadline;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Mints token pairs and writes them onto the user record.
///
/// Stored tokens are overwritten on every issue. Tokens handed out earlier
/// stay valid until their own expiry since requests never consult the store.
pub struct TokenIssuer<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    deadline: Duration,
}

impl<UR> TokenIssuer<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>, deadline: Duration) -> Self {
        Self {
            repository,
            authenticator,
            deadline,
        }
    }

    /// Sign a pair for `subject` without touching the store.
    ///
    /// # Errors
    /// * `TokenSigning` - Encoding failed
    pub fn mint(&self, subject: &TokenSubject) -> Result<TokenPair, UserError> {
        self.authenticator
            .issue_pair(subject)
            .map_err(|e| UserError::TokenSigning(e.to_string()))
    }

    /// Sign a pair for `user` and persist it on the user's record.
    ///
    /// The pair is returned only once the write has succeeded.
    ///
    /// # Errors
    /// * `TokenSigning` - Encoding failed
    /// * `TokenPersistenceError` - Update failed, timed out, or the user is gone
    pub async fn issue_pair(&self, user: &User) -> Result<TokenPair, UserError> {
        let tokens = self.mint(&user.token_subject())?;

        with_deadline(
            self.deadline,
            "update tokens",
            self.repository
                .update_tokens(&user.id, &tokens, timestamp_now()),
        )
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Failed to persist token pair");
            UserError::TokenPersistenceError(e.to_string())
        })?;

        tracing::debug!(user_id = %user.id, "Token pair issued");

        Ok(tokens)
    }
}
