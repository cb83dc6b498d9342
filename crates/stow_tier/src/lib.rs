// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storage tier abstractions for the stow object cache.
//!
//! This crate defines the [`StorageTier`] trait that the durable tier of a cache
//! store implements, along with the [`Error`] type for fallible tier operations.
//!
//! # Overview
//!
//! A tier maps opaque string keys to already-encoded bytes. It knows nothing about
//! serialization, scheduling or error policy; those concerns live in the `stow`
//! crate, which orchestrates a memory tier in front of a disk tier.
//!
//! # Implementing a Storage Tier
//!
//! ```
//! use bytes::Bytes;
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//! use stow_tier::{Error, StorageTier};
//!
//! #[derive(Debug, Default)]
//! struct SimpleTier(RwLock<HashMap<String, Bytes>>);
//!
//! impl StorageTier for SimpleTier {
//!     fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     fn insert(&self, key: &str, value: Bytes) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), value);
//!         Ok(())
//!     }
//!
//!     fn invalidate(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//!
//!     fn clear(&self) -> Result<(), Error> {
//!         self.0.write().unwrap().clear();
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use tier::StorageTier;
