//! Authentication utilities library
//!
//! Provides the transport- and storage-agnostic parts of identity handling:
//! - Password hashing (Argon2id)
//! - Signed token issuance and validation (HS256 JWT)
//! - Role-based access decisions
//! - Bearer header authentication
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Role, TokenCodec, TokenSubject, TokenType};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let subject = TokenSubject {
//!     id: "user123".to_string(),
//!     email: "alice@example.com".to_string(),
//!     first_name: "Alice".to_string(),
//!     last_name: "Liddell".to_string(),
//!     role: Role::User,
//! };
//! let token = codec.sign(&subject, TokenType::Access, chrono::Duration::hours(1)).unwrap();
//! let claims = codec.parse(&token).unwrap();
//! assert_eq!(claims.subject(), subject);
//! ```
//!
//! ## Access Decisions
//! ```
//! use auth::{policy, Authenticator, Role, TokenSubject};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//! let subject = TokenSubject {
//!     id: "user123".to_string(),
//!     email: "alice@example.com".to_string(),
//!     first_name: "Alice".to_string(),
//!     last_name: "Liddell".to_string(),
//!     role: Role::User,
//! };
//! let pair = auth.issue_pair(&subject).unwrap();
//!
//! let header = format!("Bearer {}", pair.access_token);
//! let claims = auth.authenticate_bearer(Some(&header)).unwrap();
//! assert!(policy::require_self_or_admin(&claims, "user123").is_ok());
//! assert!(policy::require_role(&claims, Role::Admin).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod role;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::TokenRejection;
pub use authenticator::TokenWindows;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::FixedClock;
pub use jwt::JwtError;
pub use jwt::SystemClock;
pub use jwt::TokenCodec;
pub use jwt::TokenPair;
pub use jwt::TokenSubject;
pub use jwt::TokenType;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use policy::PolicyError;
pub use role::Role;
