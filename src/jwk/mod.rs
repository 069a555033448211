//! JSON Web Key (JWK) support — input only (spec.md §3).

mod keys;

pub use keys::{EcCurve, EcKeyMaterial, RsaKeyMaterial, SymmetricKey};

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use anyhow::bail;
use serde_json::{Map, Value};

use crate::error::JoseError;

/// A JSON Web Key: a thin typed wrapper over a JSON object.
///
/// This crate never generates, persists, or discovers keys (spec.md §1's
/// Non-goals); a `Jwk` only exists to be read by the key materializer
/// (component C) and then dropped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Jwk {
    params: Map<String, Value>,
}

impl Jwk {
    /// A new, empty JWK of the given key type (`"oct"`, `"RSA"`, or `"EC"`).
    pub fn new(key_type: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("kty".to_string(), Value::String(key_type.into()));
        Self { params }
    }

    /// Parse a JWK from a JSON object.
    pub fn from_map(map: impl Into<Map<String, Value>>) -> Result<Self, JoseError> {
        let params: Map<String, Value> = map.into();
        Self::check_map(&params).map_err(JoseError::InvalidJwkFormat)?;
        Ok(Self { params })
    }

    /// Parse a JWK from its JSON text form.
    pub fn from_slice(input: impl AsRef<[u8]>) -> Result<Self, JoseError> {
        let map: Map<String, Value> = serde_json::from_slice(input.as_ref())
            .map_err(|err| JoseError::InvalidJson(err.into()))?;
        Self::from_map(map)
    }

    pub(crate) fn check_map(map: &Map<String, Value>) -> anyhow::Result<()> {
        match map.get("kty") {
            Some(Value::String(_)) => {}
            Some(_) => bail!("A parameter kty must be a string."),
            None => bail!("A parameter kty is required."),
        }
        Ok(())
    }

    /// The `kty` (key type) parameter.
    pub fn key_type(&self) -> &str {
        match self.params.get("kty") {
            Some(Value::String(val)) => val,
            _ => "",
        }
    }

    /// The `use` (public key use) parameter, if present.
    pub fn key_use(&self) -> Option<&str> {
        match self.params.get("use") {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }

    pub fn set_key_use(&mut self, value: impl Into<String>) {
        self.params
            .insert("use".to_string(), Value::String(value.into()));
    }

    /// The `key_ops` (key operations) parameter, if present.
    pub fn key_operations(&self) -> Option<Vec<&str>> {
        match self.params.get("key_ops") {
            Some(Value::Array(vals)) => Some(
                vals.iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        }
    }

    pub fn set_key_operations(&mut self, values: Vec<impl Into<String>>) {
        let vals = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self.params.insert("key_ops".to_string(), Value::Array(vals));
    }

    /// True if `key_ops` is absent (unrestricted) or contains `op`.
    pub fn is_for_key_operation(&self, op: &str) -> bool {
        match self.key_operations() {
            Some(ops) => ops.iter().any(|v| *v == op),
            None => true,
        }
    }

    /// The `alg` (algorithm) parameter, if present.
    pub fn algorithm(&self) -> Option<&str> {
        match self.params.get("alg") {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }

    pub fn set_algorithm(&mut self, value: impl Into<String>) {
        self.params
            .insert("alg".to_string(), Value::String(value.into()));
    }

    /// The `kid` (key ID) parameter, if present.
    pub fn key_id(&self) -> Option<&str> {
        match self.params.get("kid") {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }

    pub fn set_key_id(&mut self, value: impl Into<String>) {
        self.params
            .insert("kid".to_string(), Value::String(value.into()));
    }

    /// Read an arbitrary named parameter.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Set (or remove, with `None`) an arbitrary named parameter.
    pub fn set_parameter(&mut self, key: &str, value: Option<Value>) -> Result<(), JoseError> {
        match value {
            Some(val) => {
                self.params.insert(key.to_string(), val);
            }
            None => {
                self.params.remove(key);
            }
        }
        Ok(())
    }
}

impl Display for Jwk {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let val = serde_json::to_string(&self.params).map_err(|_e| std::fmt::Error)?;
        fmt.write_str(&val)
    }
}

impl From<Jwk> for Map<String, Value> {
    fn from(jwk: Jwk) -> Map<String, Value> {
        jwk.params
    }
}

impl AsRef<Map<String, Value>> for Jwk {
    fn as_ref(&self) -> &Map<String, Value> {
        &self.params
    }
}

impl Deref for Jwk {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

impl DerefMut for Jwk {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.params
    }
}
