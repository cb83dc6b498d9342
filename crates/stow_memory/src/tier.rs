// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory tier implementation using moka.

use bytes::Bytes;
use moka::sync::Cache;

use crate::builder::{Capacity, MemoryTierBuilder};

/// A bounded in-memory tier of encoded bytes, backed by moka.
///
/// Clones share the same underlying map. All operations are synchronous and
/// infallible.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use stow_memory::MemoryTier;
///
/// let tier = MemoryTier::new();
/// tier.insert("key", Bytes::from_static(b"value"));
/// tier.invalidate("key");
/// assert!(tier.get("key").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTier {
    inner: Cache<String, Bytes>,
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTier {
    /// Creates a memory tier with the default byte budget.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a memory tier holding at most `max_bytes` of keys and values.
    #[must_use]
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self::builder().max_bytes(max_bytes).build()
    }

    /// Creates a new builder for configuring a memory tier.
    #[must_use]
    pub fn builder() -> MemoryTierBuilder {
        MemoryTierBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryTierBuilder) -> Self {
        let mut moka_builder = Cache::builder();

        match builder.capacity {
            Capacity::Bytes(bytes) => {
                moka_builder = moka_builder.max_capacity(bytes).weigher(|key: &String, value: &Bytes| weigh(key, value));
            }
            Capacity::Entries(entries) => {
                moka_builder = moka_builder.max_capacity(entries);
            }
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Returns the bytes stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.get(key)
    }

    /// Returns `true` if `key` is currently held.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Stores `value` under `key`. The entry is visible to `get` as soon as this returns.
    pub fn insert(&self, key: &str, value: Bytes) {
        self.inner.insert(key.to_owned(), value);
    }

    /// Drops `key`, as an eviction would.
    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Returns the approximate number of entries.
    ///
    /// moka maintains this count lazily; call [`MemoryTier::run_pending_tasks`]
    /// first when an exact figure matters.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Returns the approximate total weight of the entries (bytes, or entries when
    /// the tier is bounded by entry count).
    #[must_use]
    pub fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    /// Applies pending evictions and bookkeeping immediately.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

fn weigh(key: &str, value: &Bytes) -> u32 {
    u32::try_from(key.len().saturating_add(value.len())).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_counts_key_and_value() {
        assert_eq!(weigh("abc", &Bytes::from_static(b"12345")), 8);
    }
}
