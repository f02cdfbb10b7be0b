//! Canonical query serialization: the exact character sequence fed to the
//! token digest.
//!
//! The canonical string is the raw, non-percent-encoded join of `key=value`
//! pairs, because the hash must match whatever bytes the official client
//! produced. The percent-encoded request body is built separately by the
//! probe executor and never reuses this string.

use anyhow::{Result, bail};
use serde::Serialize;

/// Key ordering applied when serializing a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyOrder {
    /// Pairs appear exactly as the caller inserted them.
    Insertion,
    /// Pairs are reordered by ascending lexicographic key comparison.
    Sorted,
}

/// An ordered sequence of unique request parameters.
///
/// Insertion order is significant and kept distinct from any sorted view,
/// so this is an explicit sequence of pairs rather than a map.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    pairs: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key/value pair.
    ///
    /// A duplicate key is a programmer error in the calling variant
    /// definition and fails immediately rather than being coerced.
    pub fn push(&mut self, key: &str, value: &str) -> Result<()> {
        if self.pairs.iter().any(|(k, _)| k == key) {
            bail!("duplicate parameter key '{key}'");
        }
        self.pairs.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Builds a set from a slice of pairs, preserving slice order.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.push(key, value)?;
        }
        Ok(set)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Serializes `params` as `key=value` pairs joined by `&` under `order`.
///
/// Pure: identical input always yields an identical string. An empty set
/// yields the empty string; a single pair has no trailing separator.
pub fn canonical_query(params: &ParameterSet, order: KeyOrder) -> String {
    let mut pairs: Vec<&(String, String)> = params.pairs.iter().collect();
    if order == KeyOrder::Sorted {
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
