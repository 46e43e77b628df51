//! Call key derivation
//!
//! A [`CallKey`] is a pure function of an operation name and its canonical
//! arguments. Arguments are restricted to [`ArgValue`], a closed set of
//! primitives with a deterministic JSON encoding.

use crate::error::{GhmError, GhmResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// A canonicalizable call argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<u64> for ArgValue {
    type Error = GhmError;

    fn try_from(value: u64) -> GhmResult<Self> {
        i64::try_from(value)
            .map(Self::Int)
            .map_err(|_| GhmError::unsupported(format!("integer {} exceeds i64", value)))
    }
}

impl TryFrom<usize> for ArgValue {
    type Error = GhmError;

    fn try_from(value: usize) -> GhmResult<Self> {
        Self::try_from(value as u64)
    }
}

impl TryFrom<serde_json::Value> for ArgValue {
    type Error = GhmError;

    fn try_from(value: serde_json::Value) -> GhmResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::Str(s)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .ok_or_else(|| GhmError::unsupported(format!("number {}", n))),
            Value::Array(_) => Err(GhmError::unsupported("array")),
            Value::Object(_) => Err(GhmError::unsupported("object")),
        }
    }
}

/// Ordered positional and named arguments of a wrapped call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    named: BTreeMap<String, ArgValue>,
}

impl CallArgs {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a positional argument that may not be representable
    pub fn try_arg<V>(mut self, value: V) -> GhmResult<Self>
    where
        V: TryInto<ArgValue, Error = GhmError>,
    {
        self.positional.push(value.try_into()?);
        Ok(self)
    }

    /// Set a named argument
    ///
    /// A `Null` value is dropped so that an elided default and an explicit
    /// `None` produce the same key.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        let name = name.into();
        match value.into() {
            ArgValue::Null => {
                self.named.remove(&name);
            }
            value => {
                self.named.insert(name, value);
            }
        }
        self
    }

    /// Set a named argument that may not be representable
    pub fn try_named<V>(self, name: impl Into<String>, value: V) -> GhmResult<Self>
    where
        V: TryInto<ArgValue, Error = GhmError>,
    {
        Ok(self.named(name, value.try_into()?))
    }
}

/// Deterministic cache key for one call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey(String);

impl CallKey {
    /// Separator between operation name, positional and named parts
    pub const SEPARATOR: char = ':';

    /// Derive the key for `operation` called with `args`
    pub fn build(operation: &str, args: &CallArgs) -> GhmResult<Self> {
        validate_operation(operation)?;

        let positional = serde_json::to_string(&args.positional)?;
        let named = serde_json::to_string(&args.named)?;

        Ok(Self(format!(
            "{operation}{sep}{positional}{sep}{named}",
            sep = Self::SEPARATOR
        )))
    }

    /// The key as stored in the cache file
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short SHA256 fingerprint of the key (first 12 hex chars), for logs
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..6])
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CallKey> for String {
    fn from(key: CallKey) -> Self {
        key.0
    }
}

/// Extract the operation name from a stored key
pub fn operation_of(key: &str) -> &str {
    key.split(CallKey::SEPARATOR).next().unwrap_or(key)
}

fn validate_operation(operation: &str) -> GhmResult<()> {
    let valid = !operation.is_empty()
        && operation
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(GhmError::InvalidOperationName(operation.to_string()))
    }
}
