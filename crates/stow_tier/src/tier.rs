// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for storage backends.
//!
//! [`StorageTier`] is synchronous: the store drives its durable tier from
//! blocking worker threads on its work queue.

use std::{fmt::Debug, sync::Arc};

use bytes::Bytes;

use crate::Error;

/// Trait for storage tier implementations.
///
/// Implementations must be safe to call concurrently from arbitrary threads.
pub trait StorageTier: Debug + Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium could not be read.
    fn get(&self, key: &str) -> Result<Option<Bytes>, Error>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium could not be written.
    fn insert(&self, key: &str, value: Bytes) -> Result<(), Error>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium could not be modified.
    fn invalidate(&self, key: &str) -> Result<(), Error>;

    /// Removes every entry held by this tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium could not be reset.
    fn clear(&self) -> Result<(), Error>;
}

impl<T> StorageTier for Arc<T>
where
    T: StorageTier + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        (**self).get(key)
    }

    fn insert(&self, key: &str, value: Bytes) -> Result<(), Error> {
        (**self).insert(key, value)
    }

    fn invalidate(&self, key: &str) -> Result<(), Error> {
        (**self).invalidate(key)
    }

    fn clear(&self) -> Result<(), Error> {
        (**self).clear()
    }
}
