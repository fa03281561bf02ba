//! Authentication configuration.

/// JWT verification configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
}

pub(crate) fn default_jwt_secret() -> String {
    "your-secret-key".to_string()
}
