use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::{InterceptorConfig, Secret};
use crate::error::{AuthError, AuthResult};

/// Signature and claim verification for a located token.
///
/// Every failure (bad signature, expiry, issuer/audience mismatch, malformed
/// token) is reported as [`AuthError::InvalidToken`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AuthResult<Claims>;
}

/// Verifies HS256/HS384/HS512 tokens signed with a shared secret.
#[derive(Clone)]
pub struct HmacVerifier {
    config: InterceptorConfig,
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for HmacVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("HmacVerifier")
            .field("config", &self.config)
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl HmacVerifier {
    pub fn new(secret: &Secret, config: InterceptorConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        // exp is checked when present but not demanded
        validation.set_required_spec_claims(&["iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn verify_sync(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Value>(token, &self.key, &self.validation)?;
        let claims = Claims::try_from(data.claims)?;
        self.check_max_age(&claims)?;
        debug!(sub = claims.subject(), "verified JWT successfully");
        Ok(claims)
    }

    /// Tokens carrying `iat` may not be older than the configured window.
    fn check_max_age(&self, claims: &Claims) -> AuthResult<()> {
        let Some(iat) = claims.get("iat") else {
            return Ok(());
        };
        let issued_at = iat
            .as_i64()
            .or_else(|| iat.as_f64().map(|seconds| seconds as i64))
            .ok_or_else(|| AuthError::InvalidToken("iat claim is not a timestamp".into()))?;

        let window = self
            .config
            .expires_in_seconds
            .saturating_add(self.config.leeway_seconds);
        let window = i64::try_from(window).unwrap_or(i64::MAX);
        let age = Utc::now().timestamp().saturating_sub(issued_at);

        if age > window {
            return Err(AuthError::InvalidToken(format!(
                "token age {age}s exceeds maximum of {}s",
                self.config.expires_in_seconds
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for HmacVerifier {
    async fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_sync(token)
    }
}
