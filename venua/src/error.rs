//! Error types for the venua library.
//!
//! This module provides the error hierarchy for all booking operations,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::calendar::DateState;
use crate::lock::LockResource;

/// Result type alias for operations that may fail with a venua error.
///
/// # Examples
///
/// ```
/// use venua::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the venua library.
///
/// This enum encompasses all error conditions that can occur while managing
/// calendar dates, bookings, and payments.
#[derive(Debug, Error)]
pub enum Error {
    /// The calendar date is not in the state required for the operation.
    ///
    /// Not retryable: the caller must pick a different date.
    #[error("date {day} is not available (currently {state})")]
    DateUnavailable {
        /// The day in question.
        day: chrono::NaiveDate,
        /// The state the date is currently in.
        state: DateState,
    },

    /// Another operation currently holds the lock for this resource.
    ///
    /// Retryable: the caller should retry with backoff.
    #[error("resource busy: {resource} is locked by another operation")]
    ResourceBusy {
        /// The contended resource.
        resource: LockResource,
    },

    /// The requested entity was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// A description of the missing entity.
        resource: String,
    },

    /// A validation error occurred (bad price, amount, day format, or patch).
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The operation conflicts with existing state that must be preserved.
    ///
    /// Raised by the legacy hard-delete path when payments exist.
    #[error("conflict: {details}")]
    Conflict {
        /// Details about the conflict.
        details: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::booking::ValidationError> for Error {
    fn from(err: crate::booking::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if the caller may safely retry the failed operation.
    ///
    /// Lock contention and storage failures are transient; everything else
    /// requires the caller to change the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use venua::{Error, LockResource};
    ///
    /// let err = Error::ResourceBusy { resource: LockResource::Date(1) };
    /// assert!(err.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ResourceBusy { .. } | Self::Database(_) | Self::Io(_)
        )
    }

    /// Check if the error indicates a missing entity.
    ///
    /// # Examples
    ///
    /// ```
    /// use venua::Error;
    ///
    /// let err = Error::NotFound { resource: "booking 7".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
