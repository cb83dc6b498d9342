// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`CacheStore`] instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use stow_disk::DiskTier;
use stow_memory::MemoryTierBuilder;
use stow_tier::StorageTier;
use tokio::runtime::Handle;

use crate::{CacheStore, Codec, Delivery, ErrorPolicy, StoreError};

/// Returns the directory namespaces live under when no base directory is set:
/// `stow` inside the system temporary directory.
#[must_use]
pub fn default_base_dir() -> PathBuf {
    std::env::temp_dir().join("stow")
}

/// Builder for a [`CacheStore`].
///
/// Created by [`CacheStore::builder`]. Every setting has a default, so
/// `CacheStore::builder(name).build()` inside a tokio runtime is enough.
///
/// | Setting | Default |
/// |---|---|
/// | [`base_dir`](Self::base_dir) | [`default_base_dir`] |
/// | [`memory`](Self::memory) | 32 MiB budget |
/// | [`codec`](Self::codec) | [`Codec::Json`] |
/// | [`policy`](Self::policy) | [`ErrorPolicy::BestEffort`] |
/// | [`delivery`](Self::delivery) | [`Delivery::immediate`] |
/// | [`runtime`](Self::runtime) | the runtime `build` is called from |
///
/// # Examples
///
/// ```
/// use stow::{CacheStore, Codec, ErrorPolicy, MemoryTier};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), stow::StoreError> {
/// # let base = tempfile::tempdir().expect("tempdir");
/// let store = CacheStore::builder("LocalRecordItems")
///     .base_dir(base.path())
///     .memory(MemoryTier::builder().max_bytes(1024 * 1024))
///     .codec(Codec::Bincode)
///     .policy(ErrorPolicy::Strict)
///     .build()?;
///
/// assert_eq!(store.namespace(), "LocalRecordItems");
/// assert_eq!(store.policy(), ErrorPolicy::Strict);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheStoreBuilder {
    namespace: String,
    base_dir: Option<PathBuf>,
    memory: MemoryTierBuilder,
    codec: Codec,
    policy: ErrorPolicy,
    delivery: Delivery,
    runtime: Option<Handle>,
    disk: Option<Arc<dyn StorageTier>>,
}

impl CacheStoreBuilder {
    pub(crate) fn new(namespace: String) -> Self {
        Self {
            namespace,
            base_dir: None,
            memory: MemoryTierBuilder::new(),
            codec: Codec::default(),
            policy: ErrorPolicy::default(),
            delivery: Delivery::default(),
            runtime: None,
            disk: None,
        }
    }

    /// Sets the directory the namespace directory is created in.
    #[must_use]
    pub fn base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(base_dir.as_ref().to_path_buf());
        self
    }

    /// Configures the memory tier.
    #[must_use]
    pub fn memory(mut self, memory: MemoryTierBuilder) -> Self {
        self.memory = memory;
        self
    }

    /// Sets the serialization format.
    #[must_use]
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Sets how failures surface through the policy-aware operations.
    #[must_use]
    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets where callbacks of the `*_then` operations run.
    #[must_use]
    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Sets the runtime that drives disk work and callback delivery.
    ///
    /// Required when `build` is called outside a tokio runtime.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Replaces the durable tier, typically with a test double. The base
    /// directory is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), stow::StoreError> {
    /// use std::sync::Arc;
    ///
    /// use stow::{CacheStore, MockTier};
    ///
    /// let disk = MockTier::new();
    /// let store = CacheStore::builder("Test").disk_tier(Arc::new(disk.clone())).build()?;
    ///
    /// store.save("k", "v").await?;
    /// assert!(disk.contains_key("k"));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    #[must_use]
    pub fn disk_tier(mut self, disk: Arc<dyn StorageTier>) -> Self {
        self.disk = Some(disk);
        self
    }

    /// Opens the namespace directory and starts the instance's work queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRuntime`] if no runtime was set and none is
    /// current, and [`StoreError::Io`] if the namespace directory cannot be
    /// created (an empty namespace is rejected the same way).
    pub fn build(self) -> Result<CacheStore, StoreError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()?,
        };

        let disk = match self.disk {
            Some(disk) => disk,
            None => {
                let base_dir = self.base_dir.unwrap_or_else(default_base_dir);
                let tier = DiskTier::open(&base_dir, &self.namespace)
                    .map_err(|e| StoreError::io(self.namespace.as_str(), e.into()))?;
                Arc::new(tier)
            }
        };

        tracing::debug!(
            cache.namespace = %self.namespace,
            codec = self.codec.as_str(),
            policy = ?self.policy,
            "cache store built"
        );

        Ok(CacheStore::from_parts(
            Arc::from(self.namespace),
            self.codec,
            self.memory.build(),
            disk,
            self.policy,
            self.delivery,
            runtime,
        ))
    }
}
