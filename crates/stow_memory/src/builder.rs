// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring memory tiers.
//!
//! The builder abstracts the underlying moka configuration so the rest of the
//! workspace never sees moka's types.

use std::time::Duration;

use crate::tier::MemoryTier;

/// Default byte budget of a memory tier: 32 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 32 * 1024 * 1024;

/// How the capacity of a memory tier is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Total size of keys and values, in bytes.
    Bytes(u64),
    /// Number of entries, regardless of their size.
    Entries(u64),
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Bytes(DEFAULT_MAX_BYTES)
    }
}

/// Builder for configuring a [`MemoryTier`].
///
/// # Examples
///
/// ```
/// use stow_memory::MemoryTier;
/// use std::time::Duration;
///
/// let tier = MemoryTier::builder()
///     .max_bytes(4 * 1024 * 1024)
///     .time_to_idle(Duration::from_secs(600))
///     .initial_capacity(64)
///     .name("records")
///     .build();
/// assert_eq!(tier.entry_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTierBuilder {
    pub(crate) capacity: Capacity,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
}

impl MemoryTierBuilder {
    /// Creates a new builder bounded to [`DEFAULT_MAX_BYTES`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the tier by the total size of its keys and values.
    ///
    /// Once the budget is reached, entries are evicted using the `TinyLFU`
    /// policy (LRU eviction combined with LFU admission).
    #[must_use]
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.capacity = Capacity::Bytes(bytes);
        self
    }

    /// Bounds the tier by its number of entries instead of their size.
    #[must_use]
    pub fn max_entries(mut self, entries: u64) -> Self {
        self.capacity = Capacity::Entries(entries);
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the tier.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets the time-to-idle (TTI) for all entries.
    ///
    /// Entries that are neither read nor written for this long are dropped. The
    /// disk tier still holds them, so this only trades memory for extra disk reads.
    #[must_use]
    pub fn time_to_idle(mut self, duration: Duration) -> Self {
        self.time_to_idle = Some(duration);
        self
    }

    /// Sets a name for the tier, shown in moka's debugging output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Builds the configured [`MemoryTier`].
    #[must_use]
    pub fn build(self) -> MemoryTier {
        MemoryTier::from_builder(&self)
    }
}
