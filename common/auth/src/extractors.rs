use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::locator::TokenSource;

/// Identity attached by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub source: TokenSource,
}

impl AuthContext {
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)?;
        let source = parts
            .extensions
            .get::<TokenSource>()
            .copied()
            .ok_or(AuthError::Unauthenticated)?;

        Ok(Self { claims, source })
    }
}
