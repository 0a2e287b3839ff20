//! Caller identity.
//!
//! Sessions are handled in front of this service; the resolved user arrives
//! as the `X-Actor-Id` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use lectern_model::UserId;

use super::errors::AppError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user on whose behalf a request acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| AppError::unauthorized("missing X-Actor-Id header"))?
            .to_str()
            .map_err(|_| AppError::unauthorized("X-Actor-Id header is not valid text"))?;

        raw.trim()
            .parse::<UserId>()
            .map(Actor)
            .map_err(|_| AppError::unauthorized("X-Actor-Id header is not a valid id"))
    }
}
