// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for tier operations.

/// An error from a storage tier operation.
///
/// Tiers fail either because the backing medium failed ([`Error::Io`]) or for a
/// reason only describable by a message, which is what test doubles produce.
///
/// # Example
///
/// ```
/// use stow_tier::Error;
///
/// let error = Error::from_message("operation failed");
/// assert_eq!(error.to_string(), "operation failed");
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backing medium reported an I/O failure.
    #[error("tier i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A failure described by a message.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a new error from a message.
    ///
    /// # Examples
    ///
    /// ```
    /// use stow_tier::Error;
    ///
    /// let error = Error::from_message("disk full");
    /// assert!(error.io_kind().is_none());
    /// ```
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Returns the I/O error kind, if this error came from the backing medium.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            Self::Message(_) => None,
        }
    }
}

/// A specialized [`Result`] type for tier operations.
pub type Result<T> = std::result::Result<T, Error>;
