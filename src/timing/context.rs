//! Sliding buffer of the most recent accepted keys

use std::collections::VecDeque;

/// Ordered sequence of the last `capacity` key identifiers.
///
/// Oldest entries are evicted first once the buffer is full.
#[derive(Debug, Clone)]
pub struct ContextBuffer {
    keys: VecDeque<String>,
    capacity: usize,
}

impl ContextBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push a key, dropping the oldest entries beyond capacity
    pub fn push(&mut self, key: &str) {
        self.keys.push_back(key.to_string());
        while self.keys.len() > self.capacity {
            self.keys.pop_front();
        }
    }

    /// The last `len` keys in typing order
    pub fn suffix(&self, len: usize) -> Vec<String> {
        let len = len.min(self.keys.len());
        self.keys
            .iter()
            .skip(self.keys.len() - len)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
