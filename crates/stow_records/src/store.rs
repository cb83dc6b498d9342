// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The record list kept under one cache key.

use futures::FutureExt;
use stow::{CacheStore, StoreError};

use crate::RecordItem;

/// Cache key the record list is stored under.
pub const RECORD_ITEMS_KEY: &str = "local record items";

/// Namespace of the cache instance that conventionally holds the record list.
pub const RECORD_ITEMS_NAMESPACE: &str = "LocalRecordItems";

/// How list mutations read and write the stored list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationMode {
    /// Each mutation loads the list, edits it and saves it as separate steps.
    ///
    /// Two mutations running at the same time can read the same list, and the
    /// later save then drops the earlier one's edit.
    #[default]
    Unserialized,
    /// Each mutation runs as one [`CacheStore::update`], so concurrent
    /// mutations are applied one after the other and none is lost.
    Serialized,
}

/// An ordered list of [`RecordItem`]s kept under a single cache key.
///
/// Failures follow the [`ErrorPolicy`](stow::ErrorPolicy) of the underlying
/// [`CacheStore`]: with the default best-effort policy an unreadable list reads
/// as empty and failed writes report success.
///
/// # Examples
///
/// ```
/// use stow::CacheStore;
/// use stow_records::{RECORD_ITEMS_NAMESPACE, RecordItem, RecordListStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), stow::StoreError> {
/// # let base = tempfile::tempdir().expect("tempdir");
/// let cache = CacheStore::builder(RECORD_ITEMS_NAMESPACE).base_dir(base.path()).build()?;
/// let records = RecordListStore::new(cache);
///
/// records.insert_front(RecordItem::new("1", "a.jpg", "First")).await?;
/// records.insert_front(RecordItem::new("2", "b.jpg", "Second")).await?;
///
/// let ids: Vec<_> = records.load_all().await?.into_iter().map(|item| item.id).collect();
/// assert_eq!(ids, ["2", "1"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RecordListStore {
    cache: CacheStore,
    key: String,
    mode: MutationMode,
}

impl RecordListStore {
    /// Creates a store keeping its list under [`RECORD_ITEMS_KEY`].
    #[must_use]
    pub fn new(cache: CacheStore) -> Self {
        Self::with_key(cache, RECORD_ITEMS_KEY)
    }

    /// Creates a store keeping its list under `key`.
    #[must_use]
    pub fn with_key(cache: CacheStore, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            mode: MutationMode::default(),
        }
    }

    /// Sets how mutations are applied.
    #[must_use]
    pub fn mutation_mode(mut self, mode: MutationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the underlying cache instance.
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Returns the key the list is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the configured mutation mode.
    #[must_use]
    pub fn mode(&self) -> MutationMode {
        self.mode
    }

    /// Returns the stored list; a list that was never written is empty.
    ///
    /// # Errors
    ///
    /// Under the strict policy, returns the error that prevented reading the list.
    pub async fn load_all(&self) -> Result<Vec<RecordItem>, StoreError> {
        Ok(self.cache.fetch(&self.key).await?.unwrap_or_default())
    }

    /// Puts `item` at the front of the list.
    ///
    /// # Errors
    ///
    /// Under the strict policy, returns the error that prevented reading or
    /// writing the list. A failed read leaves storage untouched.
    pub async fn insert_front(&self, item: RecordItem) -> Result<(), StoreError> {
        self.mutate(move |items| items.insert(0, item)).await
    }

    /// Removes every item whose id equals `item`'s.
    ///
    /// # Errors
    ///
    /// Same as [`RecordListStore::insert_front`].
    pub async fn delete_by_id(&self, item: &RecordItem) -> Result<(), StoreError> {
        self.delete_id(&item.id).await
    }

    /// Removes every item with the given id.
    ///
    /// # Errors
    ///
    /// Same as [`RecordListStore::insert_front`].
    pub async fn delete_id(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_owned();
        self.mutate(move |items| items.retain(|item| item.id != id)).await
    }

    /// Removes the whole list.
    ///
    /// # Errors
    ///
    /// Under the strict policy, returns the error that prevented removing it.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let removed = self.cache.remove(&self.key).await;
        self.cache.policy().resolve_write(removed)
    }

    /// Callback form of [`RecordListStore::load_all`]. A failure is reported as
    /// an empty list and `false`.
    pub fn load_all_then<C>(&self, callback: C)
    where
        C: FnOnce(Vec<RecordItem>, bool) + Send + 'static,
    {
        let this = self.clone();
        self.cache
            .deliver(async move { this.load_all().await }.boxed(), move |result| match result {
                Ok(items) => callback(items, true),
                Err(_) => callback(Vec::new(), false),
            });
    }

    /// Callback form of [`RecordListStore::insert_front`], reporting success.
    pub fn insert_front_then<C>(&self, item: RecordItem, callback: C)
    where
        C: FnOnce(bool) + Send + 'static,
    {
        let this = self.clone();
        self.report(async move { this.insert_front(item).await }.boxed(), callback);
    }

    /// Callback form of [`RecordListStore::delete_by_id`], reporting success.
    pub fn delete_by_id_then<C>(&self, item: &RecordItem, callback: C)
    where
        C: FnOnce(bool) + Send + 'static,
    {
        let this = self.clone();
        let id = item.id.clone();
        self.report(async move { this.delete_id(&id).await }.boxed(), callback);
    }

    /// Callback form of [`RecordListStore::clear_all`], reporting success.
    pub fn clear_all_then<C>(&self, callback: C)
    where
        C: FnOnce(bool) + Send + 'static,
    {
        let this = self.clone();
        self.report(async move { this.clear_all().await }.boxed(), callback);
    }

    fn report<C>(&self, completion: stow::Completion<()>, callback: C)
    where
        C: FnOnce(bool) + Send + 'static,
    {
        self.cache.deliver(completion, move |result| callback(result.is_ok()));
    }

    async fn mutate<F>(&self, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<RecordItem>) + Send + 'static,
    {
        let written = match self.mode {
            MutationMode::Unserialized => {
                let mut items = self.load_all().await?;
                edit(&mut items);
                tracing::debug!(cache.key = %self.key, items = items.len(), "saving record list");
                self.cache.save(&self.key, &items).await
            }
            MutationMode::Serialized => self
                .cache
                .update(&self.key, move |items: Option<Vec<RecordItem>>| {
                    let mut items = items.unwrap_or_default();
                    edit(&mut items);
                    items
                })
                .await
                .map(|items| tracing::debug!(cache.key = %self.key, items = items.len(), "record list updated")),
        };
        self.cache.policy().resolve_write(written)
    }
}
