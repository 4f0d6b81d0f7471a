//! Bearer-token authentication extractors.
//!
//! Tokens are issued by the identity service; the storefront never sees
//! passwords. A token is resolved to its identity user on every request.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use shopfront_core::AdminUser;

use crate::error::{AppError, set_sentry_user};
use crate::services::IdentityUser;
use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> String {
///     user.id.to_string()
/// }
/// ```
pub struct RequireUser(pub IdentityUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let user = state
            .identity()
            .user_for_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;

        set_sentry_user(&user.id, user.email.as_deref());
        Ok(Self(user))
    }
}

/// Extractor that requires a bearer token belonging to an active admin.
///
/// Rejects with 401 for a missing or invalid token and 403 when the user has
/// no active admin row.
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        let admin = state
            .admin_users()
            .find_by_user_id(user.id)
            .await?
            .filter(|admin| admin.is_active)
            .ok_or_else(|| AppError::Forbidden("admin access required".to_string()))?;

        Ok(Self(admin))
    }
}
