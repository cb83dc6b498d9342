// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock tier implementation for testing.
//!
//! This module provides `MockTier`, a configurable in-memory tier that
//! records all operations and supports failure injection for testing error paths.

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{Error, StorageTier};

/// Recorded tier operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOp {
    /// A get operation was performed with the given key.
    Get(String),
    /// An insert operation was performed with the given key and value.
    Insert {
        /// The key that was written.
        key: String,
        /// The bytes that were written.
        value: Bytes,
    },
    /// An invalidate operation was performed with the given key.
    Invalidate(String),
    /// A clear operation was performed.
    Clear,
}

impl TierOp {
    /// Returns the key this operation targeted, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Get(key) | Self::Invalidate(key) | Self::Insert { key, .. } => Some(key),
            Self::Clear => None,
        }
    }
}

type FailPredicate = Box<dyn Fn(&TierOp) -> bool + Send + Sync>;

/// A configurable mock tier for testing.
///
/// This tier stores values in memory and can be configured to fail
/// operations on demand, making it useful for testing error handling paths.
/// All operations are recorded for later verification. Clones share state,
/// so a test can keep one handle while the store under test owns another.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use stow_tier::{StorageTier, testing::{MockTier, TierOp}};
///
/// let tier = MockTier::new();
/// tier.insert("key", Bytes::from_static(b"42")).unwrap();
/// assert_eq!(tier.get("key").unwrap(), Some(Bytes::from_static(b"42")));
///
/// assert_eq!(tier.operations(), vec![
///     TierOp::Insert { key: "key".to_string(), value: Bytes::from_static(b"42") },
///     TierOp::Get("key".to_string()),
/// ]);
/// ```
///
/// # Failure Injection
///
/// ```
/// use stow_tier::{StorageTier, testing::{MockTier, TierOp}};
///
/// let tier = MockTier::new();
///
/// // Fail only specific keys
/// tier.fail_when(|op| matches!(op, TierOp::Get(k) if k == "forbidden"));
/// assert!(tier.get("forbidden").is_err());
/// assert!(tier.get("allowed").is_ok());
/// ```
#[derive(Clone, Default)]
pub struct MockTier {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<TierOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTier")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockTier {
    /// Creates a new empty mock tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock tier with pre-populated data.
    #[must_use]
    pub fn with_data(data: HashMap<String, Bytes>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Self::default()
        }
    }

    /// Returns the number of entries in the tier.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the tier contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should fail.
    /// A failed operation is still recorded but leaves the data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&TierOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<TierOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn check(&self, op: TierOp, what: &str) -> Result<(), Error> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if fail {
            return Err(Error::from_message(format!("mock: {what} failed")));
        }
        Ok(())
    }
}

impl StorageTier for MockTier {
    fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        self.check(TierOp::Get(key.to_owned()), "get")?;
        Ok(self.data.lock().get(key).cloned())
    }

    fn insert(&self, key: &str, value: Bytes) -> Result<(), Error> {
        self.check(
            TierOp::Insert {
                key: key.to_owned(),
                value: value.clone(),
            },
            "insert",
        )?;
        self.data.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), Error> {
        self.check(TierOp::Invalidate(key.to_owned()), "invalidate")?;
        self.data.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.check(TierOp::Clear, "clear")?;
        self.data.lock().clear();
        Ok(())
    }
}
