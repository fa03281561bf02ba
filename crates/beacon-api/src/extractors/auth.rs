//! `AuthUser` extractor — pulls the JWT from the Authorization header,
//! validates it, and exposes the authenticated user id.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use beacon_core::error::AppError;

use crate::state::AppState;

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id from the token's `id` claim.
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.jwt.decode(token)?;

        Ok(AuthUser {
            user_id: claims.id,
        })
    }
}
