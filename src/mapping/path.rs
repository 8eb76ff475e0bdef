//! Nested-Path Resolution
//!
//! A [`Path`] is an ordered list of keys. Resolving it against a decoded
//! document indexes mappings by string key and sequences by position, one key
//! at a time. Any mismatch (absent key, index out of range, or an attempt to
//! index into a scalar) surfaces as the same [`ExporterError::PathNotFound`].

use crate::error::{ExporterError, Result};
use serde_json::Value;
use std::fmt;

/// One step of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Index into a mapping
    Key(String),
    /// Index into a sequence
    Index(usize),
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_string())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        PathKey::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(key) => write!(f, "{}", key),
            PathKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Ordered sequence of keys locating a value inside a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathKey>);

impl Path {
    pub fn new(keys: Vec<PathKey>) -> Self {
        Self(keys)
    }

    /// Whether this path has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve this path against `value`
    pub fn resolve<'a>(&self, value: &'a Value) -> Result<&'a Value> {
        resolve(value, &self.0)
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        Path(keys.into_iter().map(PathKey::from).collect())
    }
}

impl From<&str> for Path {
    fn from(key: &str) -> Self {
        Path(vec![PathKey::from(key)])
    }
}

impl From<Vec<PathKey>> for Path {
    fn from(keys: Vec<PathKey>) -> Self {
        Path(keys)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                PathKey::Key(_) if i > 0 => write!(f, ".{}", key)?,
                _ => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}

/// Successively index into `value` by each key of `keys`
///
/// An empty key list resolves to `value` itself.
pub fn resolve<'a>(value: &'a Value, keys: &[PathKey]) -> Result<&'a Value> {
    keys.iter().enumerate().try_fold(value, |current, (depth, key)| {
        let next = match (current, key) {
            (Value::Object(map), PathKey::Key(k)) => map.get(k),
            (Value::Array(items), PathKey::Index(i)) => items.get(*i),
            _ => None,
        };
        next.ok_or_else(|| {
            ExporterError::PathNotFound(Path(keys[..=depth].to_vec()).to_string())
        })
    })
}
