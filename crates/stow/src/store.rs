// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The two-tier cache store.

use std::sync::Arc;

use bytes::Bytes;
use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use stow_memory::MemoryTier;
use stow_tier::StorageTier;
use tokio::runtime::Handle;
use tracing::Instrument;

use crate::{
    Codec, Delivery, ErrorPolicy, StoreError,
    builder::CacheStoreBuilder,
    queue::WorkQueue,
    telemetry::{self, CacheActivity, CacheOperation},
};

/// Outcome of a [`CacheStore`] operation, resolving exactly once.
///
/// The operation is already scheduled when the completion is returned. Dropping
/// it discards the outcome; the work still happens.
pub type Completion<T> = BoxFuture<'static, Result<T, StoreError>>;

/// A keyed object cache backed by a bounded memory tier and a durable disk tier.
///
/// Values are encoded with the instance's [`Codec`]. Writes go to memory on the
/// caller's thread, so a `load` issued after `save` returns already sees the new
/// value, then to disk from the instance's work queue. Reads prefer memory and
/// fall back to disk, copying what they find back into memory.
///
/// Disk work is ordered per instance: reads run concurrently, while every
/// mutation waits for all earlier work and runs alone. Mutations therefore land
/// on disk in the order they were called.
///
/// `CacheStore` is a cheap handle; clones share the same instance.
///
/// # Examples
///
/// ```
/// use stow::CacheStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), stow::StoreError> {
/// # let base = tempfile::tempdir().expect("tempdir");
/// let store = CacheStore::builder("Settings").base_dir(base.path()).build()?;
///
/// store.save("volume", &7_u8).await?;
/// assert_eq!(store.load::<u8>("volume").await?, 7);
///
/// store.remove("volume").await?;
/// assert!(store.load::<u8>("volume").await.is_err_and(|e| e.is_not_found()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    shared: Arc<Shared>,
    policy: ErrorPolicy,
    delivery: Delivery,
    runtime: Handle,
    queue: WorkQueue,
}

/// State touched by queued jobs. Kept apart from [`Inner`] so that jobs never
/// hold the queue's sender.
#[derive(Debug)]
struct Shared {
    namespace: Arc<str>,
    codec: Codec,
    memory: MemoryTier,
    disk: Arc<dyn StorageTier>,
    /// Bumped by every mutation while it updates memory.
    epoch: Mutex<u64>,
}

impl CacheStore {
    /// Creates a builder for the cache instance named `namespace`.
    #[must_use]
    pub fn builder(namespace: impl Into<String>) -> CacheStoreBuilder {
        CacheStoreBuilder::new(namespace.into())
    }

    pub(crate) fn from_parts(
        namespace: Arc<str>,
        codec: Codec,
        memory: MemoryTier,
        disk: Arc<dyn StorageTier>,
        policy: ErrorPolicy,
        delivery: Delivery,
        runtime: Handle,
    ) -> Self {
        let queue = WorkQueue::start(&runtime, Arc::clone(&namespace));
        Self {
            inner: Arc::new(Inner {
                shared: Arc::new(Shared {
                    namespace,
                    codec,
                    memory,
                    disk,
                    epoch: Mutex::new(0),
                }),
                policy,
                delivery,
                runtime,
                queue,
            }),
        }
    }

    /// Returns the namespace this instance was built for.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.shared.namespace
    }

    /// Returns the error policy applied by the policy-aware operations.
    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        self.inner.policy
    }

    /// Returns the codec values are stored with.
    #[must_use]
    pub fn codec(&self) -> Codec {
        self.inner.shared.codec
    }

    /// Returns the memory tier, e.g. to inspect or evict entries.
    #[must_use]
    pub fn memory(&self) -> &MemoryTier {
        &self.inner.shared.memory
    }

    /// Stores `value` under `key`.
    ///
    /// The memory tier is updated before this returns; the completion resolves
    /// once the disk write finished. If encoding fails neither tier is touched.
    pub fn save<T>(&self, key: &str, value: &T) -> Completion<()>
    where
        T: Serialize + ?Sized,
    {
        let shared = &self.inner.shared;
        let bytes = match shared.encode(CacheOperation::Save, key, value) {
            Ok(bytes) => bytes,
            Err(e) => return futures::future::ready(Err(e)).boxed(),
        };

        shared.mutate(|memory| memory.insert(key, bytes.clone()));

        let shared = Arc::clone(shared);
        let key = key.to_owned();
        settle(
            self.inner
                .queue
                .exclusive(move || shared.write_disk(CacheOperation::Save, &key, bytes)),
        )
    }

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// The completion fails with [`StoreError::NotFound`] if neither tier holds
    /// the key, [`StoreError::Decode`] if the stored bytes are not a `T`, and
    /// [`StoreError::Io`] if the disk tier failed.
    pub fn load<T>(&self, key: &str) -> Completion<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let shared = &self.inner.shared;
        if let Some(bytes) = shared.memory.get(key) {
            shared.record(CacheOperation::Load, CacheActivity::MemoryHit, key);
            return futures::future::ready(shared.decode(CacheOperation::Load, key, &bytes)).boxed();
        }

        let seen = shared.epoch();
        let shared = Arc::clone(shared);
        let key = key.to_owned();
        settle(self.inner.queue.concurrent(move || shared.read_through(&key, seen)))
    }

    /// Removes `key` from both tiers. Removing an absent key succeeds.
    pub fn remove(&self, key: &str) -> Completion<()> {
        let shared = &self.inner.shared;
        shared.mutate(|memory| memory.invalidate(key));

        let shared = Arc::clone(shared);
        let key = key.to_owned();
        settle(self.inner.queue.exclusive(move || {
            shared
                .disk
                .invalidate(&key)
                .map_err(|source| StoreError::io(key.as_str(), source))
                .inspect(|_| shared.record(CacheOperation::Remove, CacheActivity::Removed, &key))
                .inspect_err(|e| shared.record_error(CacheOperation::Remove, &key, e))
        }))
    }

    /// Removes every entry of this instance from both tiers.
    ///
    /// The namespace directory is deleted and recreated empty.
    pub fn remove_all(&self) -> Completion<()> {
        let shared = &self.inner.shared;
        shared.mutate(MemoryTier::clear);

        let shared = Arc::clone(shared);
        settle(self.inner.queue.exclusive(move || {
            let namespace = shared.namespace.as_ref();
            shared
                .disk
                .clear()
                .map_err(|source| StoreError::io(namespace, source))
                .inspect(|_| shared.record(CacheOperation::RemoveAll, CacheActivity::Cleared, ""))
                .inspect_err(|e| shared.record_error(CacheOperation::RemoveAll, "", e))
        }))
    }

    /// Like [`CacheStore::load`], with the instance's [`ErrorPolicy`] applied.
    ///
    /// A missing entry resolves to `Ok(None)` under every policy.
    pub fn fetch<T>(&self, key: &str) -> Completion<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let policy = self.inner.policy;
        let load = self.load(key);
        async move { policy.resolve_load(load.await) }.boxed()
    }

    /// Returns whether either tier holds `key`, without decoding it.
    pub fn contains(&self, key: &str) -> Completion<bool> {
        let shared = &self.inner.shared;
        if shared.memory.contains(key) {
            return futures::future::ready(Ok(true)).boxed();
        }

        let shared = Arc::clone(shared);
        let key = key.to_owned();
        settle(self.inner.queue.concurrent(move || {
            shared
                .disk
                .get(&key)
                .map(|found| found.is_some())
                .map_err(|source| StoreError::io(key.as_str(), source))
                .inspect_err(|e| shared.record_error(CacheOperation::Contains, &key, e))
        }))
    }

    /// Replaces the value under `key` with `f(current)` as a single queued step.
    ///
    /// Unlike a `load` followed by a `save`, no other mutation of this instance
    /// can interleave: the current value is read from disk after every earlier
    /// mutation finished, and later mutations wait for the new value to be
    /// written. Read failures are resolved by the [`ErrorPolicy`] before `f`
    /// runs; `f` receives `None` for a missing entry. Resolves to the new value.
    ///
    /// # Examples
    ///
    /// ```
    /// use stow::CacheStore;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), stow::StoreError> {
    /// # let base = tempfile::tempdir().expect("tempdir");
    /// let store = CacheStore::builder("Counters").base_dir(base.path()).build()?;
    ///
    /// let first = store.update("visits", |n: Option<u32>| n.unwrap_or(0) + 1);
    /// let second = store.update("visits", |n: Option<u32>| n.unwrap_or(0) + 1);
    /// assert_eq!((first.await?, second.await?), (1, 2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn update<T, F>(&self, key: &str, f: F) -> Completion<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce(Option<T>) -> T + Send + 'static,
    {
        let shared = &self.inner.shared;
        // Memory may hold a value this update is about to replace.
        let stamp = shared.mutate(|memory| memory.invalidate(key));

        let policy = self.inner.policy;
        let shared = Arc::clone(shared);
        let key = key.to_owned();
        settle(self.inner.queue.exclusive(move || -> Result<T, StoreError> {
            let current = policy.resolve_load(shared.read_disk(CacheOperation::Update, &key))?;
            let next = f(current);
            let bytes = shared.encode(CacheOperation::Update, &key, &next)?;
            shared.write_disk(CacheOperation::Update, &key, bytes.clone())?;
            if !shared.warm_up(&key, bytes, stamp) {
                shared.record(CacheOperation::Update, CacheActivity::WarmUpSkipped, &key);
            }
            Ok(next)
        }))
    }

    /// Runs `callback` with the outcome of `completion` on the configured
    /// [`Delivery`] context.
    pub fn deliver<T, C>(&self, completion: Completion<T>, callback: C)
    where
        T: Send + 'static,
        C: FnOnce(Result<T, StoreError>) + Send + 'static,
    {
        let delivery = self.inner.delivery.clone();
        self.inner.runtime.spawn(
            async move {
                let result = completion.await;
                delivery.dispatch(move || callback(result));
            }
            .in_current_span(),
        );
    }

    /// Callback form of [`CacheStore::save`], with the [`ErrorPolicy`] applied.
    pub fn save_then<T, C>(&self, key: &str, value: &T, callback: C)
    where
        T: Serialize + ?Sized,
        C: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let completion = self.save(key, value);
        self.deliver(self.resolve_write(completion), callback);
    }

    /// Callback form of [`CacheStore::fetch`].
    pub fn load_then<T, C>(&self, key: &str, callback: C)
    where
        T: DeserializeOwned + Send + 'static,
        C: FnOnce(Result<Option<T>, StoreError>) + Send + 'static,
    {
        self.deliver(self.fetch(key), callback);
    }

    /// Callback form of [`CacheStore::remove`], with the [`ErrorPolicy`] applied.
    pub fn remove_then<C>(&self, key: &str, callback: C)
    where
        C: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let completion = self.remove(key);
        self.deliver(self.resolve_write(completion), callback);
    }

    /// Callback form of [`CacheStore::remove_all`], with the [`ErrorPolicy`] applied.
    pub fn remove_all_then<C>(&self, callback: C)
    where
        C: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let completion = self.remove_all();
        self.deliver(self.resolve_write(completion), callback);
    }

    fn resolve_write(&self, completion: Completion<()>) -> Completion<()> {
        let policy = self.inner.policy;
        async move { policy.resolve_write(completion.await) }.boxed()
    }
}

impl Shared {
    fn epoch(&self) -> u64 {
        *self.epoch.lock()
    }

    /// Applies a memory mutation under a fresh epoch and returns that epoch.
    fn mutate(&self, apply: impl FnOnce(&MemoryTier)) -> u64 {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        apply(&self.memory);
        *epoch
    }

    /// Copies `bytes` into memory unless a mutation newer than `seen` was issued.
    fn warm_up(&self, key: &str, bytes: Bytes, seen: u64) -> bool {
        let epoch = self.epoch.lock();
        if *epoch != seen {
            return false;
        }
        self.memory.insert(key, bytes);
        true
    }

    fn encode<T>(&self, operation: CacheOperation, key: &str, value: &T) -> Result<Bytes, StoreError>
    where
        T: Serialize + ?Sized,
    {
        self.codec.encode(value).map_err(|source| {
            let e = StoreError::Encode {
                key: key.to_owned(),
                source,
            };
            self.record_error(operation, key, &e);
            e
        })
    }

    fn decode<T>(&self, operation: CacheOperation, key: &str, bytes: &[u8]) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.codec.decode(bytes).map_err(|source| {
            let e = StoreError::Decode {
                key: key.to_owned(),
                source,
            };
            self.record_error(operation, key, &e);
            e
        })
    }

    fn read_bytes(&self, operation: CacheOperation, key: &str) -> Result<Bytes, StoreError> {
        match self.disk.get(key) {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => {
                self.record(operation, CacheActivity::Miss, key);
                Err(StoreError::NotFound { key: key.to_owned() })
            }
            Err(source) => {
                let e = StoreError::io(key, source);
                self.record_error(operation, key, &e);
                Err(e)
            }
        }
    }

    fn read_disk<T>(&self, operation: CacheOperation, key: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.read_bytes(operation, key)?;
        self.decode(operation, key, &bytes)
    }

    fn read_through<T>(&self, key: &str, seen: u64) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.read_bytes(CacheOperation::Load, key)?;
        // Only bytes that decode are worth keeping in memory.
        let value = self.decode(CacheOperation::Load, key, &bytes)?;
        let activity = if self.warm_up(key, bytes, seen) {
            CacheActivity::DiskHit
        } else {
            CacheActivity::WarmUpSkipped
        };
        self.record(CacheOperation::Load, activity, key);
        Ok(value)
    }

    fn write_disk(&self, operation: CacheOperation, key: &str, bytes: Bytes) -> Result<(), StoreError> {
        match self.disk.insert(key, bytes) {
            Ok(()) => {
                self.record(operation, CacheActivity::Written, key);
                Ok(())
            }
            Err(source) => {
                let e = StoreError::io(key, source);
                self.record_error(operation, key, &e);
                Err(e)
            }
        }
    }

    fn record(&self, operation: CacheOperation, activity: CacheActivity, key: &str) {
        telemetry::record(&self.namespace, operation, activity, key);
    }

    fn record_error(&self, operation: CacheOperation, key: &str, error: &StoreError) {
        telemetry::record_error(&self.namespace, operation, key, error);
    }
}

fn settle<T>(scheduled: BoxFuture<'static, Result<Result<T, StoreError>, StoreError>>) -> Completion<T>
where
    T: Send + 'static,
{
    async move { scheduled.await? }.boxed()
}
