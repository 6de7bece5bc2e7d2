//! Ordered route captures.
//!
//! Captures keep the order in which they were first produced so that
//! controllers can receive them positionally. Names are stored inline for
//! typical routes (up to [`INLINE_CAPTURE_COUNT`] entries).

use compact_str::CompactString;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Captures stored inline before spilling to the heap.
pub const INLINE_CAPTURE_COUNT: usize = 8;

/// Ordered mapping from capture name to captured text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    entries: SmallVec<[(CompactString, String); INLINE_CAPTURE_COUNT]>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an overwritten name keeps its original position.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((CompactString::new(name), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a capture and parse it as `T`.
    pub fn get_parsed<T: std::str::FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(str::parse)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Capture values in insertion order.
    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn to_hash_map(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Captures {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut captures = Captures::new();
        for (name, value) in iter {
            captures.insert(name, value);
        }
        captures
    }
}
