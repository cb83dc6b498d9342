// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! How failures surface to callers of the policy-aware operations.

use crate::StoreError;

/// Decides which failures callers observe.
///
/// The raw operations of [`CacheStore`](crate::CacheStore) (`save`, `load`,
/// `remove`, `remove_all`) always report the precise outcome. The policy is
/// applied on top of them by `fetch`, `update`, the callback adapters and the
/// record list store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Every read failure reads as "absent" and every write failure as success.
    ///
    /// Each degraded failure is logged at `warn` level.
    #[default]
    BestEffort,
    /// Only a missing entry reads as "absent"; every other failure is returned.
    Strict,
}

impl ErrorPolicy {
    /// Applies the policy to the outcome of a read.
    ///
    /// # Errors
    ///
    /// Under [`ErrorPolicy::Strict`], returns every error except
    /// [`StoreError::NotFound`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stow::{ErrorPolicy, StoreError};
    ///
    /// let missing: Result<u32, StoreError> = Err(StoreError::NotFound { key: "k".into() });
    /// assert_eq!(ErrorPolicy::Strict.resolve_load(missing)?, None);
    /// # Ok::<(), StoreError>(())
    /// ```
    pub fn resolve_load<T>(self, result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => match self {
                Self::BestEffort => {
                    tracing::warn!(error = %e, "read failure treated as a missing entry");
                    Ok(None)
                }
                Self::Strict => Err(e),
            },
        }
    }

    /// Applies the policy to the outcome of a write.
    ///
    /// # Errors
    ///
    /// Under [`ErrorPolicy::Strict`], returns the error unchanged.
    pub fn resolve_write(self, result: Result<(), StoreError>) -> Result<(), StoreError> {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (Self::BestEffort, Err(e)) => {
                tracing::warn!(error = %e, "write failure ignored");
                Ok(())
            }
            (Self::Strict, Err(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> StoreError {
        StoreError::io("k", stow_tier::Error::from_message("boom"))
    }

    #[test]
    fn default_is_best_effort() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::BestEffort);
    }

    #[test]
    fn success_passes_through_both_policies() {
        for policy in [ErrorPolicy::BestEffort, ErrorPolicy::Strict] {
            assert_eq!(policy.resolve_load(Ok(3)).expect("ok"), Some(3));
            policy.resolve_write(Ok(())).expect("ok");
        }
    }

    #[test]
    fn not_found_is_absent_under_both_policies() {
        for policy in [ErrorPolicy::BestEffort, ErrorPolicy::Strict] {
            let result: Result<u8, _> = Err(StoreError::NotFound { key: "k".into() });
            assert_eq!(policy.resolve_load(result).expect("absent"), None);
        }
    }

    #[test]
    fn best_effort_degrades_failures() {
        let result: Result<u8, _> = Err(io_error());
        assert_eq!(ErrorPolicy::BestEffort.resolve_load(result).expect("degraded"), None);
        ErrorPolicy::BestEffort.resolve_write(Err(io_error())).expect("degraded");
    }

    #[test]
    fn strict_surfaces_failures() {
        let result: Result<u8, _> = Err(io_error());
        assert!(matches!(ErrorPolicy::Strict.resolve_load(result), Err(StoreError::Io { .. })));
        assert!(matches!(ErrorPolicy::Strict.resolve_write(Err(io_error())), Err(StoreError::Io { .. })));
    }
}
