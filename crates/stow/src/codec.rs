// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion between typed values and the bytes held by the tiers.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

/// Error produced by a [`Codec`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The JSON serializer rejected the value or the input.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// The bincode serializer rejected the value or the input.
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Serialization format of a cache instance.
///
/// Every value of an instance goes through the same codec; switching formats
/// on an existing namespace makes previously written entries undecodable.
///
/// # Examples
///
/// ```
/// use stow::Codec;
///
/// let bytes = Codec::Json.encode(&vec![1, 2, 3])?;
/// assert_eq!(&bytes[..], b"[1,2,3]");
/// let back: Vec<i32> = Codec::Json.decode(&bytes)?;
/// assert_eq!(back, [1, 2, 3]);
/// # Ok::<(), stow::CodecError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Codec {
    /// Compact JSON via `serde_json`.
    #[default]
    Json,
    /// bincode's default little-endian encoding.
    Bincode,
}

impl Codec {
    /// Encodes `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this format.
    pub fn encode<T>(self, value: &T) -> Result<Bytes, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = match self {
            Self::Json => serde_json::to_vec(value)?,
            Self::Bincode => bincode::serialize(value)?,
        };
        Ok(Bytes::from(encoded))
    }

    /// Decodes a value previously produced by [`Codec::encode`].
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid encoding of `T`.
    pub fn decode<T>(self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Json => Ok(serde_json::from_slice(bytes)?),
            Self::Bincode => Ok(bincode::deserialize(bytes)?),
        }
    }

    /// Returns a short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Bincode => "bincode",
        }
    }
}
