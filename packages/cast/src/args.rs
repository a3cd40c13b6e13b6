//! Casting arguments: the options a caster is constructed with.
//!
//! Arguments are a flat map of scalars and lists of scalars so that they can
//! be written inline in code or loaded from a JSON/TOML declaration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::value::Value;

/// A scalar casting argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form, used when a scalar stands in for a cell.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Str(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "null"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Str(s) => Value::String(s),
        }
    }
}

/// A casting argument: a scalar or a list of scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Arg {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Arg::Scalar(s) => Some(s),
            Arg::List(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Scalar(Scalar::Null))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Scalar(s) => write!(f, "{}", s),
            Arg::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<Scalar> for Arg {
    fn from(s: Scalar) -> Self {
        Arg::Scalar(s)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Scalar(v.into())
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Scalar(v.into())
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Scalar(v.into())
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Scalar(v.into())
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Scalar(v.into())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Scalar(v.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::List(v.into_iter().map(Into::into).collect())
    }
}

/// Named construction arguments for a caster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CastArgs(BTreeMap<String, Arg>);

impl CastArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Arg>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Start reading the arguments, tracking which keys were consumed.
    pub fn reader(&self) -> ArgReader<'_> {
        ArgReader {
            args: self,
            seen: BTreeSet::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for CastArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        CastArgs(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Typed access to [`CastArgs`]. Keys nobody asked for are rejected by
/// [`ArgReader::finish`].
pub struct ArgReader<'a> {
    args: &'a CastArgs,
    seen: BTreeSet<&'a str>,
}

impl<'a> ArgReader<'a> {
    /// Raw access. A null scalar reads as absent.
    pub fn raw(&mut self, key: &'a str) -> Option<&'a Arg> {
        self.seen.insert(key);
        self.args.get(key).filter(|arg| !arg.is_null())
    }

    pub fn string(&mut self, key: &'a str) -> Result<Option<String>, ArgumentError> {
        match self.raw(key) {
            None => Ok(None),
            Some(Arg::Scalar(Scalar::Str(s))) => Ok(Some(s.clone())),
            Some(other) => Err(ArgumentError::new(
                key,
                format!("expected a string, got `{}`", other),
            )),
        }
    }

    /// A single-byte option such as a CSV delimiter.
    pub fn byte(&mut self, key: &'a str) -> Result<Option<u8>, ArgumentError> {
        match self.string(key)? {
            None => Ok(None),
            Some(s) if s.len() == 1 && s.is_ascii() => Ok(Some(s.as_bytes()[0])),
            Some(s) => Err(ArgumentError::new(
                key,
                format!("expected a single ASCII character, got `{}`", s),
            )),
        }
    }

    /// A list of string tokens. A lone string is read as a one-token list.
    pub fn tokens(&mut self, key: &'a str) -> Result<Option<Vec<String>>, ArgumentError> {
        match self.raw(key) {
            None => Ok(None),
            Some(Arg::Scalar(s)) => Ok(Some(vec![s.to_text().unwrap_or_default()])),
            Some(Arg::List(items)) => Ok(Some(
                items
                    .iter()
                    .map(|item| item.to_text().unwrap_or_default())
                    .collect(),
            )),
        }
    }

    /// Fail on any key that no read consumed.
    pub fn finish(self) -> Result<(), ArgumentError> {
        match self
            .args
            .iter()
            .find(|(key, _)| !self.seen.contains(key))
        {
            Some((key, _)) => Err(ArgumentError::new(key, "unknown option")),
            None => Ok(()),
        }
    }
}
