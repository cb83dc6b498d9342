// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded in-memory byte tier backed by moka.
//!
//! This crate provides [`MemoryTier`], the volatile front tier of the stow object
//! cache. It maps keys to encoded bytes, is safe to mutate from any thread, and
//! evicts entries under its capacity limit using moka's `TinyLFU` policy. It is
//! never the source of truth: anything it drops can be reloaded from disk.
//!
//! # Quick Start
//!
//! ```
//! use bytes::Bytes;
//! use stow_memory::MemoryTier;
//!
//! let tier = MemoryTier::builder()
//!     .max_bytes(1024 * 1024)
//!     .name("thumbnails")
//!     .build();
//!
//! tier.insert("key", Bytes::from_static(b"42"));
//! assert_eq!(tier.get("key"), Some(Bytes::from_static(b"42")));
//! ```
//!
//! # Features
//!
//! - **Byte budget**: capacity is measured in key plus value bytes by default
//! - **Entry budget**: alternatively cap the number of entries
//! - **TTI**: optionally drop entries that were not touched for a while
//! - **Thread-safe**: safe for concurrent access from arbitrary threads

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::{Capacity, DEFAULT_MAX_BYTES, MemoryTierBuilder};
#[doc(inline)]
pub use tier::MemoryTier;
