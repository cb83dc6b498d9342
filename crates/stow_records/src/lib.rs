// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A persisted, ordered list of records on top of the stow object cache.
//!
//! [`RecordListStore`] keeps a `Vec<`[`RecordItem`]`>` under one key of a
//! [`CacheStore`](stow::CacheStore) and offers list operations over it: load
//! everything, insert at the front, delete by id and clear. Each operation is
//! available as an `async fn` and as a `*_then` variant that reports to a
//! callback on the cache's delivery context.
//!
//! # Concurrency
//!
//! By default ([`MutationMode::Unserialized`]) a mutation is a load, an
//! in-memory edit and a save. Two mutations issued at the same time may both
//! start from the same list, and one of the edits is then lost.
//! [`MutationMode::Serialized`] runs each mutation as a single queued
//! read-modify-write step instead.

mod item;
mod store;

#[doc(inline)]
pub use item::{RecordFlags, RecordItem};
#[doc(inline)]
pub use store::{MutationMode, RECORD_ITEMS_KEY, RECORD_ITEMS_NAMESPACE, RecordListStore};
