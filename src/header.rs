//! The JOSE header: `typ`, `alg`, and a handful of passthrough members
//! (spec.md §3, §4.7). Trimmed from the teacher's much larger header type,
//! which also carries `jku`, `jwk`, `x5u`, `x5c`, `x5t`, `crit`, `b64`,
//! `url`, and `nonce` — all out of scope for compact-serialization JWS
//! signing and verification (spec.md §1's Non-goals).

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use anyhow::bail;
use serde_json::{Map, Value};

use crate::error::JoseError;
use crate::jws::Algorithm;

/// The JOSE header: a thin typed wrapper over a JSON object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JoseHeader {
    params: Map<String, Value>,
}

impl JoseHeader {
    /// A new header with `typ` set (defaults to `"JWT"`, spec.md §4.7 `new`).
    pub fn new(typ: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("typ".to_string(), Value::String(typ.into()));
        Self { params }
    }

    pub fn from_map(map: impl Into<Map<String, Value>>) -> Result<Self, JoseError> {
        let params: Map<String, Value> = map.into();
        Self::check_map(&params).map_err(JoseError::InvalidJwtFormat)?;
        Ok(Self { params })
    }

    fn check_map(map: &Map<String, Value>) -> anyhow::Result<()> {
        match map.get("alg") {
            Some(Value::String(_)) | None => {}
            Some(_) => bail!("A parameter alg must be a string."),
        }
        match map.get("typ") {
            Some(Value::String(_)) | None => {}
            Some(_) => bail!("A parameter typ must be a string."),
        }
        Ok(())
    }

    pub fn typ(&self) -> Option<&str> {
        match self.params.get("typ") {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }

    pub fn set_typ(&mut self, value: impl Into<String>) {
        self.params
            .insert("typ".to_string(), Value::String(value.into()));
    }

    /// The `cty` (content type) parameter, if present.
    pub fn content_type(&self) -> Option<&str> {
        match self.params.get("cty") {
            Some(Value::String(val)) => Some(val),
            _ => None,
        }
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.params
            .insert("cty".to_string(), Value::String(value.into()));
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

    /// The `alg` header, mapped through the closed algorithm enumeration.
    ///
    /// An unrecognized or absent `alg` string maps to `Algorithm::None`
    /// (spec.md §6.2); the caller is responsible for rejecting a
    /// `None`-with-signature combination per Invariant I-1.
    pub fn algorithm(&self) -> Algorithm {
        match self.params.get("alg") {
            Some(Value::String(val)) => Algorithm::from_name(val),
            _ => Algorithm::None,
        }
    }

    pub fn set_algorithm(&mut self, alg: Algorithm) {
        self.params
            .insert("alg".to_string(), Value::String(alg.name().to_string()));
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn set_parameter(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(val) => {
                self.params.insert(key.to_string(), val);
            }
            None => {
                self.params.remove(key);
            }
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.params
    }
}

impl Display for JoseHeader {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let val = serde_json::to_string(&self.params).map_err(|_e| std::fmt::Error)?;
        fmt.write_str(&val)
    }
}

impl From<JoseHeader> for Map<String, Value> {
    fn from(header: JoseHeader) -> Map<String, Value> {
        header.params
    }
}

impl Deref for JoseHeader {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

impl DerefMut for JoseHeader {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_header_defaults_typ() {
        let header = JoseHeader::new("JWT");
        assert_eq!(header.typ(), Some("JWT"));
        assert_eq!(header.algorithm(), Algorithm::None);
    }

    #[test]
    fn set_algorithm_round_trips_through_name() {
        let mut header = JoseHeader::new("JWT");
        header.set_algorithm(Algorithm::Hs256);
        assert_eq!(header.algorithm(), Algorithm::Hs256);
        assert_eq!(header.parameter("alg"), Some(&Value::String("HS256".to_string())));
    }

    #[test]
    fn unknown_alg_string_maps_to_none() -> Result<(), JoseError> {
        let mut map = Map::new();
        map.insert("alg".to_string(), Value::String("made-up".to_string()));
        let header = JoseHeader::from_map(map)?;
        assert_eq!(header.algorithm(), Algorithm::None);
        Ok(())
    }

    #[test]
    fn non_string_alg_is_rejected_at_parse() {
        let mut map = Map::new();
        map.insert("alg".to_string(), Value::Bool(true));
        assert!(JoseHeader::from_map(map).is_err());
    }
}
