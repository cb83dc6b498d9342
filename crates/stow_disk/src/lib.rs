// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Durable file-per-key tier for the stow object cache.
//!
//! [`DiskTier`] keeps one directory per cache namespace and one file per key
//! inside it. File names are derived deterministically from keys (see
//! [`file_name_for_key`]) and hold exactly the encoded bytes, with no header.
//! Keys whose escaped form is too long for a file name are stored under a
//! shortened name ending in a hash of the key.
//!
//! Writes are atomic: the new content goes to a temporary file in the same
//! directory, is flushed to stable storage, then renamed over the old file. A
//! reader observes either the old or the new content, never a partial file.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use stow_disk::DiskTier;
//! use stow_tier::StorageTier;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = tempfile::tempdir()?;
//! let tier = DiskTier::open(base.path(), "LocalRecordItems")?;
//!
//! tier.insert("local record items", Bytes::from_static(b"[]"))?;
//! assert_eq!(tier.get("local record items")?, Some(Bytes::from_static(b"[]")));
//! assert!(tier.path_for("local record items").ends_with("local%20record%20items.cache"));
//! # Ok(())
//! # }
//! ```

mod naming;
mod tier;

#[doc(inline)]
pub use naming::{ENTRY_EXTENSION, MAX_READABLE_NAME, component_name, escape_component, file_name_for_key};
#[doc(inline)]
pub use tier::DiskTier;
