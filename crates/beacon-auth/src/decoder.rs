//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use beacon_core::config::AuthConfig;
use beacon_core::error::AppError;

use crate::claims::Claims;

/// Validates JWT tokens signed with the shared HMAC secret.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token, returning its claims.
    ///
    /// Checks signature validity and expiration, and requires a
    /// non-empty user id claim.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    _ => AppError::unauthorized("Invalid or expired token"),
                }
            })?;

        if token_data.claims.id.is_empty() {
            return Err(AppError::unauthorized("User id not found in token"));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn decoder(secret: &str) -> JwtDecoder {
        JwtDecoder::new(&AuthConfig {
            jwt_secret: secret.to_string(),
        })
    }

    fn token(secret: &str, id: &str, exp_offset_secs: i64) -> String {
        let claims = Claims {
            id: id.to_string(),
            exp: Utc::now().timestamp() + exp_offset_secs,
            iat: Some(Utc::now().timestamp()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let decoder = decoder("test-secret");
        let claims = decoder.decode(&token("test-secret", "u1", 3600)).unwrap();
        assert_eq!(claims.user_id(), "u1");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let decoder = decoder("test-secret");
        let err = decoder
            .decode(&token("other-secret", "u1", 3600))
            .unwrap_err();
        assert_eq!(err.kind, beacon_core::ErrorKind::Unauthorized);
    }

    #[test]
    fn test_rejects_expired_token() {
        let decoder = decoder("test-secret");
        let err = decoder.decode(&token("test-secret", "u1", -600)).unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_rejects_empty_user_id() {
        let decoder = decoder("test-secret");
        let err = decoder.decode(&token("test-secret", "", 3600)).unwrap_err();
        assert_eq!(err.message, "User id not found in token");
    }

    #[test]
    fn test_rejects_garbage() {
        let decoder = decoder("test-secret");
        assert!(decoder.decode("not-a-jwt").is_err());
    }
}
