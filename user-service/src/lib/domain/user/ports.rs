use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user and mint its first token pair.
    ///
    /// # Arguments
    /// * `command` - Validated signup fields
    ///
    /// # Returns
    /// Identifier of the inserted user
    ///
    /// # Errors
    /// * `DuplicateUser` - Email or phone is already registered
    /// * `PersistenceError` - Insert failed
    /// * `Credential` - Password hashing failed
    /// * `Timeout` - A store call or hashing exceeded the deadline
    async fn signup(&self, command: SignupCommand) -> Result<UserId, UserError>;

    /// Verify credentials, rotate the stored token pair and return the fresh record.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `TokenPersistenceError` - New tokens could not be stored
    /// * `PersistenceError` - Store lookup failed
    async fn login(&self, command: LoginCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `PersistenceError` - Store lookup failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve one page of users and the total count.
    ///
    /// # Errors
    /// * `PersistenceError` - Store lookup failed
    async fn list_users(&self, page: PageRequest) -> Result<UserPage, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Implementations must provide atomic per-record reads and updates.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateUser` - Email or phone uniqueness violated
    /// * `PersistenceError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Number of users registered with this email.
    async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, UserError>;

    /// Number of users registered with this phone number.
    async fn count_by_phone(&self, phone: &PhoneNumber) -> Result<u64, UserError>;

    /// Overwrite the stored token pair of a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `PersistenceError` - Database operation failed
    async fn update_tokens(
        &self,
        id: &UserId,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError>;

    /// Users ordered by creation time, skipping `offset` and returning at most `limit`.
    async fn list_page(&self, offset: u64, limit: u64) -> Result<UserPage, UserError>;
}
