//! JWT claims structure shared with the upstream token issuer.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Claims payload embedded in every access token.
///
/// Issued upstream; only the fields this service consumes are modeled.
/// Unknown claims are ignored during decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub id: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Returns the user id this token authenticates.
    pub fn user_id(&self) -> &str {
        &self.id
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
