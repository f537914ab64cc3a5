//! Caller identity. Session management lives upstream; this module only turns an
//! already-authenticated request into a user id.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const USER_ID_HEADER: &str = "x-user-id";

#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `None` when the request carries no usable session.
    async fn resolve(&self, headers: &HeaderMap) -> Option<Uuid>;
}

/// Trusts the `x-user-id` header set by the authenticating proxy in front of the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSessionResolver;

#[async_trait]
impl SessionResolver for HeaderSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Uuid> {
        let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "Malformed {} header", USER_ID_HEADER);
                None
            }
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .sessions()
            .resolve(&parts.headers)
            .await
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}
