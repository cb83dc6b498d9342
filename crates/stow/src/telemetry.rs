// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured `tracing` events for cache operations.
//!
//! Every event carries `cache.namespace`, `cache.operation`, `cache.activity`
//! and `cache.key`. Routine activities are emitted at `debug`, failures at
//! `warn`.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Save,
    Load,
    Remove,
    RemoveAll,
    Update,
    Contains,
}

impl CacheOperation {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Save => "cache.save",
            Self::Load => "cache.load",
            Self::Remove => "cache.remove",
            Self::RemoveAll => "cache.remove_all",
            Self::Update => "cache.update",
            Self::Contains => "cache.contains",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    MemoryHit,
    DiskHit,
    Miss,
    Written,
    Removed,
    Cleared,
    WarmUpSkipped,
    Error,
}

impl CacheActivity {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::MemoryHit => "cache.memory_hit",
            Self::DiskHit => "cache.disk_hit",
            Self::Miss => "cache.miss",
            Self::Written => "cache.written",
            Self::Removed => "cache.removed",
            Self::Cleared => "cache.cleared",
            Self::WarmUpSkipped => "cache.warm_up_skipped",
            Self::Error => "cache.error",
        }
    }
}

/// Emits a `debug` event for a routine activity.
pub(crate) fn record(namespace: &str, operation: CacheOperation, activity: CacheActivity, key: &str) {
    tracing::debug!(
        cache.namespace = namespace,
        cache.operation = operation.as_str(),
        cache.activity = activity.as_str(),
        cache.key = key,
        "cache activity"
    );
}

/// Emits a `warn` event for a failed operation.
pub(crate) fn record_error(namespace: &str, operation: CacheOperation, key: &str, error: &impl Display) {
    tracing::warn!(
        cache.namespace = namespace,
        cache.operation = operation.as_str(),
        cache.activity = CacheActivity::Error.as_str(),
        cache.key = key,
        error = %error,
        "cache operation failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names() {
        assert_eq!(CacheOperation::Save.as_str(), "cache.save");
        assert_eq!(CacheOperation::Load.as_str(), "cache.load");
        assert_eq!(CacheOperation::Remove.as_str(), "cache.remove");
        assert_eq!(CacheOperation::RemoveAll.as_str(), "cache.remove_all");
        assert_eq!(CacheOperation::Update.as_str(), "cache.update");
        assert_eq!(CacheOperation::Contains.as_str(), "cache.contains");
    }

    #[test]
    fn activity_names() {
        assert_eq!(CacheActivity::MemoryHit.as_str(), "cache.memory_hit");
        assert_eq!(CacheActivity::DiskHit.as_str(), "cache.disk_hit");
        assert_eq!(CacheActivity::Miss.as_str(), "cache.miss");
        assert_eq!(CacheActivity::Written.as_str(), "cache.written");
        assert_eq!(CacheActivity::Removed.as_str(), "cache.removed");
        assert_eq!(CacheActivity::Cleared.as_str(), "cache.cleared");
        assert_eq!(CacheActivity::WarmUpSkipped.as_str(), "cache.warm_up_skipped");
        assert_eq!(CacheActivity::Error.as_str(), "cache.error");
    }
}
