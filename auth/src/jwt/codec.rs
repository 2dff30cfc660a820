use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::claims::TokenType;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::JwtError;

/// Signs and parses bearer tokens.
///
/// Uses HS256 (HMAC with SHA-256). The key is fixed at construction and never
/// leaves this struct. Expiry is checked against the injected [`Clock`] rather
/// than by `jsonwebtoken`, so there is no leeway.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a new codec with a secret key and the system clock.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a codec that reads time from `clock`.
    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            clock,
        }
    }

    /// Sign a token of kind `token_type` for `subject`, valid for `window` from now.
    ///
    /// # Errors
    /// * `InvalidWindow` - Window is zero or negative
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(
        &self,
        subject: &TokenSubject,
        token_type: TokenType,
        window: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, token_type, self.clock.now(), window)?;
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify and decode a token.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature or algorithm does not match the server key
    /// * `Expired` - Current time is at or past `exp`
    /// * `Malformed` - Token structure or claims cannot be decoded
    pub fn parse(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        if !claims.has_valid_window() {
            return Err(JwtError::Malformed(
                "expiry does not follow issue time".to_string(),
            ));
        }

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::jwt::clock::FixedClock;
    use crate::role::Role;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn subject() -> TokenSubject {
        TokenSubject {
            id: "user123".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            role: Role::Admin,
        }
    }

    fn codec_at(timestamp: i64) -> TokenCodec {
        let now = Utc.timestamp_opt(timestamp, 0).unwrap();
        TokenCodec::with_clock(SECRET, Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_sign_and_parse() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .sign(&subject(), TokenType::Access, Duration::hours(1))
            .expect("Failed to sign token");
        assert!(!token.is_empty());

        let claims = codec.parse(&token).expect("Failed to parse token");
        assert_eq!(claims.subject(), subject());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET);

        assert!(matches!(
            codec.parse("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(codec.parse(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_parse_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1
            .sign(&subject(), TokenType::Access, Duration::hours(1))
            .expect("Failed to sign token");

        assert_eq!(codec2.parse(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_parse_tampered_payload() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .sign(&subject(), TokenType::Access, Duration::hours(1))
            .expect("Failed to sign token");

        let other = TokenCodec::new(SECRET)
            .sign(
                &TokenSubject {
                    role: Role::User,
                    ..subject()
                },
                TokenType::Access,
                Duration::hours(2),
            )
            .expect("Failed to sign token");

        // Header and signature of the first token, payload of the second
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(codec.parse(&forged), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_parse_rejects_other_algorithm() {
        let claims = Claims::for_subject(&subject(), TokenType::Access, Utc::now(), Duration::hours(1)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            TokenCodec::new(SECRET).parse(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_expiry_uses_injected_clock() {
        let token = codec_at(1_000_000)
            .sign(&subject(), TokenType::Access, Duration::seconds(60))
            .expect("Failed to sign token");

        assert!(codec_at(1_000_059).parse(&token).is_ok());
        assert_eq!(codec_at(1_000_060).parse(&token), Err(JwtError::Expired));
        assert_eq!(codec_at(2_000_000).parse(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_parse_rejects_inverted_window() {
        let mut claims = Claims::for_subject(&subject(), TokenType::Access, Utc::now(), Duration::hours(1)).unwrap();
        claims.exp = claims.iat;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            TokenCodec::new(SECRET).parse(&token),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_claims() {
        let payload = serde_json::json!({ "sub": "user123", "exp": 9_999_999_999_i64 });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            TokenCodec::new(SECRET).parse(&token),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_sign_rejects_non_positive_window() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(
            codec.sign(&subject(), TokenType::Access, Duration::zero()),
            Err(JwtError::InvalidWindow(0))
        );
    }
}
