//! Strategies for finding a bearer token in an inbound request.

use axum::http::{header::AUTHORIZATION, HeaderMap, Uri};

use crate::error::{AuthError, AuthResult};

/// Query parameter that carries the token when headers are impractical.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Where an accepted token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Query,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Header => "header",
            TokenSource::Query => "query",
        }
    }
}

/// Read the token from the `Authorization` header. Accepts `<scheme> <token>`
/// as well as a bare token with no scheme.
pub fn token_from_headers(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingAuthorization)?;

    let raw = value.to_str().map_err(|_| AuthError::MissingToken)?;

    let mut segments = raw.split(' ');
    let first = segments.next().unwrap_or_default();
    let token = match segments.next() {
        Some(second) if !second.is_empty() => second,
        _ => first,
    };

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Read the token from the `token` query parameter. Only an exact parameter
/// name matches; `nottoken=...` or `token_hint=...` are ignored.
pub fn token_from_query(uri: &Uri) -> AuthResult<&str> {
    let query = uri.query().ok_or(AuthError::MissingToken)?;

    let token = query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(name, _)| *name == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
