use thiserror::Error;

/// Error type for JWT operations.
///
/// `InvalidSignature`, `Expired` and `Malformed` are the three ways a
/// presented token can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Validity window must be positive, got {0} seconds")]
    InvalidWindow(i64),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
