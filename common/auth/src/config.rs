use std::collections::HashMap;
use std::fmt;

use crate::error::{AuthError, AuthResult};

pub const DEFAULT_EXPIRES_IN_SECONDS: u64 = 60 * 60 * 24 * 7;
pub const DEFAULT_ISSUER: &str = "localhost";
pub const DEFAULT_AUDIENCE: &str = "localhost";

pub const ENV_EXPIRES_IN: &str = "TOKENEXPIRESINSECONDS";
pub const ENV_ISSUER: &str = "ISSUER";
pub const ENV_AUDIENCE: &str = "AUDIENCE";

/// Shared HMAC secret used to validate token signatures.
#[derive(Clone)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(value: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let bytes = value.into();
        if bytes.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Resolved claim policy applied to every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorConfig {
    /// Maximum token age, measured from the `iat` claim.
    pub expires_in_seconds: u64,
    /// Expected issuer claim (iss).
    pub issuer: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Allowable clock skew in seconds when validating exp/nbf/iat.
    pub leeway_seconds: u64,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            expires_in_seconds: DEFAULT_EXPIRES_IN_SECONDS,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            leeway_seconds: 0,
        }
    }
}

/// Caller-supplied policy. Unset fields fall back to their defaults
/// independently of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub expires_in_seconds: Option<u64>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: Option<u64>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in_seconds = Some(seconds);
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = Some(seconds);
        self
    }

    /// Fill every unset field with its default. Zero and empty values count as unset.
    pub fn resolve(self) -> InterceptorConfig {
        let defaults = InterceptorConfig::default();
        InterceptorConfig {
            expires_in_seconds: self
                .expires_in_seconds
                .filter(|seconds| *seconds > 0)
                .unwrap_or(defaults.expires_in_seconds),
            issuer: non_empty(self.issuer).unwrap_or(defaults.issuer),
            audience: non_empty(self.audience).unwrap_or(defaults.audience),
            leeway_seconds: self.leeway_seconds.unwrap_or(defaults.leeway_seconds),
        }
    }

    /// Read `TOKENEXPIRESINSECONDS`, `ISSUER` and `AUDIENCE` from an environment
    /// snapshot. Returns `None` when none of them is set.
    pub fn from_env_snapshot(env: &HashMap<String, String>) -> Option<Self> {
        let lookup = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let expires_in = lookup(ENV_EXPIRES_IN);
        let issuer = lookup(ENV_ISSUER);
        let audience = lookup(ENV_AUDIENCE);

        if expires_in.is_none() && issuer.is_none() && audience.is_none() {
            return None;
        }

        Some(Self {
            expires_in_seconds: expires_in.and_then(parse_seconds),
            issuer: issuer.map(str::to_string),
            audience: audience.map(str::to_string),
            leeway_seconds: None,
        })
    }
}

/// Numeric seconds, exponent notation allowed (`1e3`). Anything that is not a
/// positive finite number is treated as unset so the default applies.
fn parse_seconds(raw: &str) -> Option<u64> {
    raw.parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 1.0)
        .map(|seconds| seconds.trunc() as u64)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Capture the process environment once, at startup.
pub fn env_snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// An explicit config wins outright; otherwise the environment snapshot is
/// consulted; otherwise the built-in defaults apply.
pub fn resolve_config(
    explicit: Option<PartialConfig>,
    env: &HashMap<String, String>,
) -> InterceptorConfig {
    explicit
        .or_else(|| PartialConfig::from_env_snapshot(env))
        .unwrap_or_default()
        .resolve()
}
