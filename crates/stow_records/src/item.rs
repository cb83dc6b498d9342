// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Record items and their flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the locally persisted record list.
///
/// # Examples
///
/// ```
/// use stow_records::RecordItem;
///
/// let item = RecordItem::new("42", "file:///captures/42.jpg", "Sunset").favorited(true);
/// assert!(item.flags.favorited);
/// assert!(!item.flags.collected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordItem {
    /// Identifier; delete-by-id removes every item carrying it.
    pub id: String,
    /// Media reference, a URL or a local path.
    pub media: String,
    /// Display name.
    pub name: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// User-set markers. Entries written without them read as all-false.
    #[serde(default)]
    pub flags: RecordFlags,
}

/// Boolean markers of a [`RecordItem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFlags {
    /// Added to the user's collection.
    pub collected: bool,
    /// Marked as a favorite.
    pub favorited: bool,
}

impl RecordItem {
    /// Creates an item stamped with the current time and no flags set.
    #[must_use]
    pub fn new(id: impl Into<String>, media: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media: media.into(),
            name: name.into(),
            created_at: Utc::now(),
            flags: RecordFlags::default(),
        }
    }

    /// Replaces the creation time.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the collected marker.
    #[must_use]
    pub fn collected(mut self, collected: bool) -> Self {
        self.flags.collected = collected;
        self
    }

    /// Sets the favorited marker.
    #[must_use]
    pub fn favorited(mut self, favorited: bool) -> Self {
        self.flags.favorited = favorited;
        self
    }
}
