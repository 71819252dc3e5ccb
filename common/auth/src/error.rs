use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("secret is required")]
    MissingSecret,
    #[error("authorization is required")]
    MissingAuthorization,
    #[error("token missing")]
    MissingToken,
    #[error("token is required")]
    TokenRequired,
    #[error("token is invalid: {0}")]
    InvalidToken(String),
    /// Both the header and the query flow failed. The causes are kept for
    /// logging; the rendered message never includes them.
    #[error("token is invalid")]
    Rejected {
        header: Box<AuthError>,
        #[source]
        query: Box<AuthError>,
    },
    #[error("request has not been authenticated")]
    Unauthenticated,
}

impl AuthError {
    /// Construction-time failures. These are fatal and never produced per request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AuthError::MissingSecret)
    }

    pub fn status(&self) -> StatusCode {
        if self.is_configuration() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::UNAUTHORIZED
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingSecret => "AUTH_CONFIG",
            AuthError::MissingAuthorization | AuthError::Unauthenticated => "AUTH_HEADER",
            AuthError::MissingToken
            | AuthError::TokenRequired
            | AuthError::InvalidToken(_)
            | AuthError::Rejected { .. } => "AUTH_TOKEN",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_map_to_500() {
        assert!(AuthError::MissingSecret.is_configuration());
        assert_eq!(
            AuthError::MissingSecret.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::MissingSecret.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn request_errors_map_to_401() {
        let rejected = AuthError::Rejected {
            header: Box::new(AuthError::MissingAuthorization),
            query: Box::new(AuthError::TokenRequired),
        };
        assert!(!rejected.is_configuration());
        assert_eq!(rejected.to_string(), "token is invalid");
        assert_eq!(rejected.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
