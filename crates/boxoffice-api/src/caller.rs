//! Caller identity extraction.
//!
//! There is no authentication layer: the caller simply names its account
//! in the [`CALLER_HEADER`] header. The owner role is enforced by the
//! registry, not here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use boxoffice_types::AccountId;

use crate::error::ApiError;

/// Header carrying the caller's account identifier.
pub const CALLER_HEADER: &str = "x-caller-id";

/// The account making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub AccountId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or(ApiError::MissingCaller)?;

        let text = value
            .to_str()
            .map_err(|e| ApiError::InvalidCaller(e.to_string()))?;

        let account = text
            .trim()
            .parse::<AccountId>()
            .map_err(|e| ApiError::InvalidCaller(e.to_string()))?;

        Ok(Self(account))
    }
}
