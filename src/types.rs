//! Core types: Symbol, AssetClass, Allocation, Holdings

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;

use crate::error::Error;

/// Fund ticker stored inline (max 8 ASCII bytes).
///
/// `Copy` so it can key hash maps and travel through plans without cloning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    bytes: [u8; Symbol::MAX_LEN],
    len: u8,
}

impl Symbol {
    pub const MAX_LEN: usize = 8;

    /// Create a symbol, panicking on an invalid ticker.
    ///
    /// Intended for literals; use [`Symbol::try_new`] or [`str::parse`] for input.
    pub fn new(s: &str) -> Self {
        match Self::try_new(s) {
            Some(sym) => sym,
            None => panic!("invalid symbol {s:?}: must be 1..=8 printable ASCII bytes"),
        }
    }

    /// Create a symbol if `s` is 1..=8 printable ASCII bytes.
    pub fn try_new(s: &str) -> Option<Self> {
        let raw = s.as_bytes();
        if raw.is_empty() || raw.len() > Self::MAX_LEN {
            return None;
        }
        if !raw.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        // Only printable ASCII is ever stored.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s.trim()).ok_or_else(|| Error::InvalidSymbol(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Broad investment category, keyed by a short identifier such as `us_stock`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetClass(String);

impl AssetClass {
    /// The asset classes a new fund starts with, with their display names.
    pub const STANDARD: [(&'static str, &'static str); 5] = [
        ("us_stock", "United States Stock"),
        ("intl_stock", "International Stock"),
        ("us_bond", "United States Bond"),
        ("intl_bond", "International Bond"),
        ("short_term_tips", "Short-Term TIPS"),
    ];

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name; falls back to the key for non-standard classes.
    pub fn display_name(&self) -> &str {
        Self::STANDARD
            .iter()
            .find(|(key, _)| *key == self.0)
            .map(|(_, name)| *name)
            .unwrap_or(self.0.as_str())
    }

    pub fn standard() -> Vec<AssetClass> {
        Self::STANDARD.iter().map(|(key, _)| Self::new(*key)).collect()
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AssetClass {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Target percentages per asset class (0–100 scale).
pub type Allocation = BTreeMap<AssetClass, f64>;

/// Current dollar value held per fund. Absent symbols count as zero.
pub type Holdings = FxHashMap<Symbol, f64>;

/// Round to 2 decimal places, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
