use serde::Deserialize;
use serde::Serialize;

/// Access and refresh tokens minted together for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token presented on ordinary requests
    pub access_token: String,

    /// Long-lived token, bound to the same subject
    pub refresh_token: String,
}
