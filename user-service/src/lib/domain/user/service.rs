use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenSubject;

use crate::domain::user::issuer::TokenIssuer;
use crate::domain::user::models::timestamp_now;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::Password;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Run a request-scoped operation, failing with `Timeout` once `deadline` passes.
pub(crate) async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, UserError>
where
    F: Future<Output = Result<T, UserError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, deadline_ms = deadline.as_millis() as u64, "Deadline exceeded");
            Err(UserError::Timeout(operation))
        }
    }
}

/// Domain service implementation for signup, login and user lookups.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    issuer: TokenIssuer<UR>,
    deadline: Duration,
    decoy_hash: String,
}

const DECOY_PASSWORD: &str = "decoy-password-never-assigned-to-a-user";

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Hashing and token signing
    /// * `deadline` - Upper bound for each store call and hashing operation
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>, deadline: Duration) -> Self {
        let issuer = TokenIssuer::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
            deadline,
        );

        // Unknown emails are verified against this so they cost the same as a wrong password
        let decoy_hash = authenticator
            .hash_password(DECOY_PASSWORD)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to prepare decoy hash");
                String::new()
            });

        Self {
            repository,
            authenticator,
            issuer,
            deadline,
            decoy_hash,
        }
    }

    /// Argon2 is CPU-bound, so it runs on the blocking pool.
    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let hasher = self.authenticator.password_hasher().clone();
        let task = tokio::task::spawn_blocking(move || hasher.hash(password.expose()));

        match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(Ok(hash))) => Ok(hash),
            Ok(Ok(Err(e))) => {
                tracing::error!(error = %e, "Password hashing failed; entropy source may be broken");
                Err(UserError::Credential(e.to_string()))
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Password hashing task failed");
                Err(UserError::Credential(e.to_string()))
            }
            Err(_) => Err(UserError::Timeout("password hashing")),
        }
    }

    async fn verify_password(&self, password: Password, stored_hash: String) -> Result<bool, UserError> {
        let hasher = self.authenticator.password_hasher().clone();
        let task =
            tokio::task::spawn_blocking(move || hasher.verify(password.expose(), &stored_hash));

        match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(valid)) => Ok(valid),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Password verification task failed");
                Err(UserError::Credential(e.to_string()))
            }
            Err(_) => Err(UserError::Timeout("password verification")),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn signup(&self, command: SignupCommand) -> Result<UserId, UserError> {
        // Both uniqueness checks run before the (expensive) hash
        let email_count = with_deadline(
            self.deadline,
            "count users by email",
            self.repository.count_by_email(&command.email),
        )
        .await?;
        let phone_count = with_deadline(
            self.deadline,
            "count users by phone",
            self.repository.count_by_phone(&command.phone),
        )
        .await?;

        if email_count > 0 || phone_count > 0 {
            tracing::info!(
                email_taken = email_count > 0,
                phone_taken = phone_count > 0,
                "Signup rejected for duplicate user"
            );
            return Err(UserError::DuplicateUser);
        }

        let password_hash = self.hash_password(command.password).await?;

        let id = UserId::new();
        let now = timestamp_now();
        let tokens = self.issuer.mint(&TokenSubject {
            id: id.to_string(),
            email: command.email.as_str().to_string(),
            first_name: command.first_name.as_str().to_string(),
            last_name: command.last_name.as_str().to_string(),
            role: command.role,
        })?;

        let user = User {
            id,
            email: command.email,
            phone: command.phone,
            role: command.role,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            tokens,
            created_at: now,
            updated_at: now,
        };

        let created_user =
            with_deadline(self.deadline, "insert user", self.repository.create(user)).await?;

        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User signed up");

        Ok(created_user.id)
    }

    async fn login(&self, command: LoginCommand) -> Result<User, UserError> {
        let found = with_deadline(
            self.deadline,
            "find user by email",
            self.repository.find_by_email(&command.email),
        )
        .await?;

        let Some(user) = found else {
            self.verify_password(command.password, self.decoy_hash.clone())
                .await?;
            tracing::info!("Login rejected for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        let valid = self
            .verify_password(command.password, user.password_hash.clone())
            .await?;
        if !valid {
            tracing::info!(user_id = %user.id, "Login rejected");
            return Err(UserError::InvalidCredentials);
        }

        self.issuer.issue_pair(&user).await?;

        let refreshed = with_deadline(
            self.deadline,
            "find user by id",
            self.repository.find_by_id(&user.id),
        )
        .await?
        .ok_or_else(|| {
            UserError::PersistenceError(format!("user {} missing after token update", user.id))
        })?;

        tracing::info!(user_id = %refreshed.id, "User logged in");

        Ok(refreshed)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        with_deadline(
            self.deadline,
            "find user by id",
            self.repository.find_by_id(id),
        )
        .await?
        .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self, page: PageRequest) -> Result<UserPage, UserError> {
        with_deadline(
            self.deadline,
            "list users",
            self.repository
                .list_page(page.start_index, page.record_per_page),
        )
        .await
    }
}
