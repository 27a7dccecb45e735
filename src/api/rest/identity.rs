//! The authenticated identity, as reported by the external auth provider.
//!
//! The auth front end is out of scope here; it forwards the session's email
//! in the `x-user-email` header. Identities are keyed by email, normalized
//! to trimmed lowercase before anything else sees them.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const IDENTITY_HEADER: &str = "x-user-email";

#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if email.is_empty() {
            return Err(AppError::Unauthorized(format!(
                "missing {IDENTITY_HEADER} header"
            )));
        }

        Ok(Identity { email })
    }
}
