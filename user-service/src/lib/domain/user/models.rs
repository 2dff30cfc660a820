use std::fmt;
use std::str::FromStr;

use auth::Role;
use auth::TokenPair;
use auth::TokenSubject;
use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PhoneError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered identity together with its current token pair.
/// `password_hash` never leaves the service; outward representations are
/// built from the other fields.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub role: Role,
    pub password_hash: String,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub tokens: TokenPair,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity facts embedded into this user's tokens.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id.to_string(),
            email: self.email.as_str().to_string(),
            first_name: self.first_name.as_str().to_string(),
            last_name: self.last_name.as_str().to_string(),
            role: self.role,
        }
    }
}

/// Current time truncated to whole seconds, as stored on user records.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Phone number value type
///
/// 7-20 characters: digits, spaces and dashes, with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_LENGTH: usize = 7;
    const MAX_LENGTH: usize = 20;

    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let length = phone.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        let digits = phone.strip_prefix('+').unwrap_or(&phone);
        let well_formed = digits.starts_with(|c: char| c.is_ascii_digit())
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');

        if well_formed {
            Ok(Self(phone))
        } else {
            Err(PhoneError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// First or last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 100;

    /// # Errors
    /// * `TooShort` - Fewer than 2 characters after trimming
    /// * `TooLong` - More than 100 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(NameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Clear-text password, held only until it is hashed or verified.
///
/// `Debug` never prints the value.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    /// Password chosen at signup, checked against the length policy.
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    /// Password presented at login. Not checked against the policy so that a
    /// short guess fails exactly like any other wrong password.
    pub fn presented(password: String) -> Self {
        Self(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct SignupCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub phone: PhoneNumber,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
}

/// Command to log in with an email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: Password,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self {
            email,
            password: Password::presented(password),
        }
    }
}

/// Slice of the user listing to return.
///
/// Built from untrusted query values; anything missing or invalid falls back
/// to a default instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub record_per_page: u64,
    pub page: u64,
    pub start_index: u64,
}

impl PageRequest {
    pub const DEFAULT_RECORD_PER_PAGE: u64 = 10;
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_START_INDEX: u64 = 0;

    pub fn from_query(
        record_per_page: Option<&str>,
        page: Option<&str>,
        start_index: Option<&str>,
    ) -> Self {
        let record_per_page = parse_at_least(record_per_page, 1)
            .unwrap_or(Self::DEFAULT_RECORD_PER_PAGE);
        let page = parse_at_least(page, 1).unwrap_or(Self::DEFAULT_PAGE);
        let start_index = parse_at_least(start_index, 0).unwrap_or(Self::DEFAULT_START_INDEX);

        Self {
            record_per_page,
            page,
            start_index,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_query(None, None, None)
    }
}

fn parse_at_least(raw: Option<&str>, min: i64) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value >= min)
        .map(|value| value as u64)
}

/// One page of users plus the size of the whole collection.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub total_count: u64,
    pub users: Vec<User>,
}
