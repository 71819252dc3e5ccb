use std::collections::HashMap;

use axum::http::{response, Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::config::{resolve_config, InterceptorConfig, PartialConfig, Secret};
use crate::error::{AuthError, AuthResult};
use crate::locator::{token_from_headers, token_from_query, TokenSource};
use crate::verifier::{HmacVerifier, TokenVerifier};

/// Anything that carries a mutable HTTP status code.
pub trait StatusSink {
    fn set_status(&mut self, status: StatusCode);
}

impl<B> StatusSink for Response<B> {
    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }
}

impl StatusSink for response::Parts {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}

/// `None` stands for a status that has not been set yet.
impl StatusSink for Option<StatusCode> {
    fn set_status(&mut self, status: StatusCode) {
        *self = Some(status);
    }
}

/// Authenticates requests carrying a bearer JWT, either in the
/// `Authorization` header or, as a fallback, in the `token` query parameter.
///
/// On success the decoded [`Claims`] and the [`TokenSource`] are stored in the
/// request extensions. On failure the response status is set to 401 and the
/// error is returned; no claims are attached.
#[derive(Debug, Clone)]
pub struct JwtHttpInterceptor<V = HmacVerifier> {
    verifier: V,
}

impl JwtHttpInterceptor<HmacVerifier> {
    pub fn new(secret: impl Into<Vec<u8>>, config: Option<PartialConfig>) -> AuthResult<Self> {
        let secret = Secret::new(secret)?;
        let config = config.unwrap_or_default().resolve();
        Ok(Self::with_verifier(HmacVerifier::new(&secret, config)))
    }

    /// Build from an explicit config or, when none is given, from an
    /// environment snapshot captured by the caller.
    pub fn from_env(
        secret: impl Into<Vec<u8>>,
        explicit: Option<PartialConfig>,
        env: &HashMap<String, String>,
    ) -> AuthResult<Self> {
        let secret = Secret::new(secret)?;
        let config = resolve_config(explicit, env);
        Ok(Self::with_verifier(HmacVerifier::new(&secret, config)))
    }

    pub fn config(&self) -> &InterceptorConfig {
        self.verifier.config()
    }
}

impl<V: TokenVerifier> JwtHttpInterceptor<V> {
    pub fn with_verifier(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verifier.verify(token).await
    }

    /// Header first, then query parameter. The query flow only starts once the
    /// header flow has fully settled.
    pub async fn authenticate<B>(&self, req: &mut Request<B>) -> AuthResult<TokenSource> {
        let header_err = match self.header_flow(req).await {
            Ok(()) => return Ok(TokenSource::Header),
            Err(err) => err,
        };
        debug!(error = %header_err, "header token unusable, trying query parameter");

        match self.query_flow(req).await {
            Ok(()) => Ok(TokenSource::Query),
            Err(query_err) => Err(AuthError::Rejected {
                header: Box::new(header_err),
                query: Box::new(query_err),
            }),
        }
    }

    pub async fn verify_request<B, S>(&self, req: &mut Request<B>, res: &mut S) -> AuthResult<()>
    where
        S: StatusSink,
    {
        match self.authenticate(req).await {
            Ok(source) => {
                debug!(source = source.as_str(), "request authenticated");
                Ok(())
            }
            Err(err) => Err(reject(res, err)),
        }
    }

    /// Header strategy alone.
    pub async fn verify_header<B, S>(&self, req: &mut Request<B>, res: &mut S) -> AuthResult<()>
    where
        S: StatusSink,
    {
        self.header_flow(req).await.map_err(|err| reject(res, err))
    }

    /// Query-parameter strategy alone.
    pub async fn verify_query<B, S>(&self, req: &mut Request<B>, res: &mut S) -> AuthResult<()>
    where
        S: StatusSink,
    {
        self.query_flow(req).await.map_err(|err| reject(res, err))
    }

    async fn header_flow<B>(&self, req: &mut Request<B>) -> AuthResult<()> {
        let token = token_from_headers(req.headers())?;
        let claims = self.verifier.verify(token).await?;
        attach(req, claims, TokenSource::Header);
        Ok(())
    }

    async fn query_flow<B>(&self, req: &mut Request<B>) -> AuthResult<()> {
        let token = token_from_query(req.uri()).map_err(|_| AuthError::TokenRequired)?;
        let claims = self.verifier.verify(token).await?;
        attach(req, claims, TokenSource::Query);
        Ok(())
    }
}

fn attach<B>(req: &mut Request<B>, claims: Claims, source: TokenSource) {
    let extensions = req.extensions_mut();
    extensions.insert(claims);
    extensions.insert(source);
}

fn reject<S: StatusSink>(res: &mut S, err: AuthError) -> AuthError {
    log_rejection(&err, None);
    res.set_status(StatusCode::UNAUTHORIZED);
    err
}

/// Both strategy causes go to the log as fields; the client only sees the
/// final outcome.
pub(crate) fn log_rejection(err: &AuthError, path: Option<&str>) {
    match err {
        AuthError::Rejected { header, query } => warn!(
            header = %header,
            query = %query,
            path,
            "rejecting unauthenticated request"
        ),
        other => warn!(error = %other, path, "rejecting unauthenticated request"),
    }
}
