use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AuthError, AuthResult};

/// Decoded payload of a verified token. The shape is defined by the issuer,
/// so the full claim set is kept and typed accessors read from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims {
    raw: Map<String, Value>,
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.raw.get("sub").and_then(Value::as_str)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.raw.get("iss").and_then(Value::as_str)
    }

    /// `aud` may be a single string or an array of strings.
    pub fn audience(&self) -> Vec<&str> {
        match self.raw.get("aud") {
            Some(Value::String(item)) => vec![item.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }

    /// Deserialize the claim set into an application-specific type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> AuthResult<T> {
        serde_json::from_value(Value::Object(self.raw.clone()))
            .map_err(|err| AuthError::InvalidToken(format!("malformed claim payload: {err}")))
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.raw.get(name)?.as_i64()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}

impl TryFrom<Value> for Claims {
    type Error = AuthError;

    fn try_from(value: Value) -> AuthResult<Self> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            other => Err(AuthError::InvalidToken(format!(
                "claim payload must be an object, got {other}"
            ))),
        }
    }
}
