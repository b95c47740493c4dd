use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{jwt::JwtKeys, repo_types::Principal};
use crate::{error::AppError, state::AppState};

/// Validates the bearer token and resolves it to the caller's `Principal`.
pub struct AuthUser(pub Principal);

/// Token part of an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthenticated("missing Authorization header".into()))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::Unauthenticated("invalid auth scheme".into()))?;

        let keys = JwtKeys::from_ref(state);
        let email = keys.extract_subject(token)?;

        let user = state.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!(%email, "token subject has no account");
            AppError::InvalidToken
        })?;

        if !user.active {
            warn!(user_id = user.id, "token for inactive account");
            return Err(AppError::InvalidToken);
        }

        if !keys.validate(token, &user) {
            return Err(AppError::InvalidToken);
        }

        Ok(AuthUser(Principal::from(user)))
    }
}
