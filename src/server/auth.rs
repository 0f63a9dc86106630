use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::server::errors::AppError;

/// Identity of the caller. Token verification lives in an upstream gateway;
/// this service trusts the `X-User-Id` header it forwards.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        Ok(UserId(user_id))
    }
}
