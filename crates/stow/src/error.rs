// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::codec::CodecError;

/// Error returned by [`CacheStore`](crate::CacheStore) operations.
///
/// [`ErrorPolicy`](crate::ErrorPolicy) decides which of these callers of the
/// policy-aware operations actually observe.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No entry exists for the key in either tier.
    #[error("no entry for key {key:?}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// An entry exists but could not be decoded into the requested type.
    #[error("entry for key {key:?} could not be decoded")]
    Decode {
        /// The requested key.
        key: String,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// The value could not be encoded; neither tier was touched.
    #[error("value for key {key:?} could not be encoded")]
    Encode {
        /// The key being written.
        key: String,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// The disk tier failed.
    #[error("storage failed for {location}")]
    Io {
        /// The key, or the namespace for whole-namespace operations.
        location: String,
        /// The tier failure.
        #[source]
        source: stow_tier::Error,
    },

    /// The work queue stopped before the operation completed.
    #[error("work queue of cache {namespace:?} is closed")]
    Closed {
        /// Namespace of the cache instance.
        namespace: String,
    },

    /// The store was built outside a tokio runtime without an explicit handle.
    #[error("no tokio runtime available to drive disk work")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn io(location: impl Into<String>, source: stow_tier::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn not_found_is_recognized() {
        let err = StoreError::NotFound { key: "k".into() };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no entry for key \"k\"");
    }

    #[test]
    fn io_keeps_its_source() {
        let err = StoreError::io("k", stow_tier::Error::from_message("disk gone"));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "storage failed for k");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk gone"));
    }

    #[test]
    fn decode_keeps_its_source() {
        let source = crate::Codec::Json.decode::<u8>(b"nope").expect_err("invalid json");
        let err = StoreError::Decode { key: "k".into(), source };
        assert!(err.source().is_some());
    }
}
