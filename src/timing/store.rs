//! Composite timing keys and delay stores

use crate::keyboard::{ARROW, CONTEXT_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing an exported timing key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("timing key {0:?} has no \"->\" separator")]
    MissingArrow(String),
    #[error("timing key {0:?} has an empty side")]
    EmptySide(String),
}

/// Split `"<left>-><right>"` at the last arrow
fn split_arrow(s: &str) -> Result<(&str, &str), KeyParseError> {
    let (left, right) = s
        .rsplit_once(ARROW)
        .ok_or_else(|| KeyParseError::MissingArrow(s.to_string()))?;
    if left.is_empty() || right.is_empty() {
        return Err(KeyParseError::EmptySide(s.to_string()));
    }
    Ok((left, right))
}

/// N-gram timing key: the preceding context and the key that followed it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NgramKey {
    context: Vec<String>,
    key: String,
}

impl NgramKey {
    pub fn new(context: Vec<String>, key: impl Into<String>) -> Self {
        Self {
            context,
            key: key.into(),
        }
    }

    /// Single-key context shorthand
    pub fn pair(prev: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(vec![prev.into()], key)
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of context keys (1 for a plain pair)
    pub fn order(&self) -> usize {
        self.context.len()
    }
}

impl fmt::Display for NgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = CONTEXT_SEPARATOR.to_string();
        write!(f, "{}{}{}", self.context.join(sep.as_str()), ARROW, self.key)
    }
}

impl FromStr for NgramKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (context, key) = split_arrow(s)?;
        let context = context
            .split(CONTEXT_SEPARATOR)
            .map(str::to_string)
            .collect();
        Ok(Self::new(context, key))
    }
}

impl From<NgramKey> for String {
    fn from(key: NgramKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for NgramKey {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Flight time key: the released key and the next pressed key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FlightKey {
    pub from: String,
    pub to: String,
}

impl FlightKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, ARROW, self.to)
    }
}

impl FromStr for FlightKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = split_arrow(s)?;
        Ok(Self::new(from, to))
    }
}

impl From<FlightKey> for String {
    fn from(key: FlightKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for FlightKey {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Mapping from a timing key to its recorded delays in milliseconds.
///
/// Each list keeps insertion (chronological) order and may hold duplicates.
#[derive(Debug, Clone)]
pub struct TimingStore<K> {
    entries: HashMap<K, Vec<u64>>,
    samples: usize,
}

impl<K: Eq + Hash> TimingStore<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            samples: 0,
        }
    }

    /// Append a delay, creating the list on first use
    pub fn record(&mut self, key: K, delay_ms: u64) {
        self.entries.entry(key).or_default().push(delay_ms);
        self.samples += 1;
    }

    pub fn get(&self, key: &K) -> Option<&[u64]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of recorded delays across all keys
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Vec<u64>)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.samples = 0;
    }
}

impl<K: Eq + Hash + Ord + Clone> TimingStore<K> {
    /// Owned, sorted copy of the store
    pub fn to_sorted(&self) -> BTreeMap<K, Vec<u64>> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Eq + Hash> Default for TimingStore<K> {
    fn default() -> Self {
        Self::new()
    }
}
