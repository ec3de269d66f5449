//! Tagged outcome for lookups that may legitimately find nothing.

/// Outcome of a service operation whose target may not exist.
///
/// `NotFound` is an expected result, not a failure; infrastructure failures
/// travel separately as `Err(DomainError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ServiceResult<T> {
    /// The operation ran and produced a value.
    Success(T),
    /// The target did not exist; nothing was changed.
    NotFound,
}

impl<T> ServiceResult<T> {
    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success(_))
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceResult::NotFound)
    }

    /// Returns the value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            ServiceResult::Success(value) => Some(value),
            ServiceResult::NotFound => None,
        }
    }
}
