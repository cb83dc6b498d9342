// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A two-tier local object cache.
//!
//! [`CacheStore`] persists serializable values under string keys. Each instance
//! owns a namespace: a bounded in-memory tier ([`MemoryTier`]) that makes
//! repeated reads cheap and a durable tier ([`DiskTier`], one file per key) that
//! survives restarts.
//!
//! - Writes update memory immediately and reach disk through a per-instance work
//!   queue on which mutations run one at a time, in call order.
//! - Reads prefer memory, fall back to disk and copy disk hits back into memory.
//! - Every operation returns a [`Completion`] future; `*_then` variants deliver
//!   the outcome to a callback on a chosen [`Delivery`] context instead.
//! - [`ErrorPolicy`] decides whether failures surface or degrade to "absent".
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use stow::CacheStore;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Profile {
//!     name: String,
//!     level: u32,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), stow::StoreError> {
//! # let base = tempfile::tempdir().expect("tempdir");
//! let store = CacheStore::builder("Profiles").base_dir(base.path()).build()?;
//!
//! let profile = Profile { name: "ada".into(), level: 3 };
//! store.save("me", &profile).await?;
//!
//! // Evicted from memory, still on disk.
//! store.memory().invalidate("me");
//! assert_eq!(store.load::<Profile>("me").await?, profile);
//!
//! // Missing entries read as `None` through `fetch`.
//! assert_eq!(store.fetch::<Profile>("someone else").await?, None);
//! # Ok(())
//! # }
//! ```

mod builder;
mod codec;
mod delivery;
mod error;
mod policy;
mod queue;
mod store;
mod telemetry;

#[doc(inline)]
pub use builder::{CacheStoreBuilder, default_base_dir};
#[doc(inline)]
pub use codec::{Codec, CodecError};
#[doc(inline)]
pub use delivery::{Delivery, DeliveryQueue};
#[doc(inline)]
pub use error::StoreError;
#[doc(inline)]
pub use policy::ErrorPolicy;
#[doc(inline)]
pub use store::{CacheStore, Completion};
#[doc(inline)]
pub use stow_disk::DiskTier;
#[doc(inline)]
pub use stow_memory::{MemoryTier, MemoryTierBuilder};
#[doc(inline)]
pub use stow_tier::StorageTier;

#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use stow_tier::testing::{MockTier, TierOp};
