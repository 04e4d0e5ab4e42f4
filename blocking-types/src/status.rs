//! Failure taxonomy for completion callbacks.
//!
//! A completion either carries a value or a [`Status`], never both.
//! Success has no `ResultCode`; the raw code `0` means success.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    /// Unclassified failure.
    UnknownError,
    /// Rejected configuration.
    InvalidConfiguration,
    /// Operation did not complete in time.
    Timeout,
    /// Could not reach the broker.
    ConnectError,
    /// Credentials rejected.
    AuthenticationError,
    /// Subscription already has an incompatible consumer.
    ConsumerBusy,
    /// Client, producer or consumer already closed.
    AlreadyClosed,
    /// Topic name could not be parsed.
    InvalidTopicName,
    /// Topic or other resource does not exist.
    NotFound,
}

impl ResultCode {
    /// All failure categories, in raw code order.
    pub const ALL: [ResultCode; 9] = [
        ResultCode::UnknownError,
        ResultCode::InvalidConfiguration,
        ResultCode::Timeout,
        ResultCode::ConnectError,
        ResultCode::AuthenticationError,
        ResultCode::ConsumerBusy,
        ResultCode::AlreadyClosed,
        ResultCode::InvalidTopicName,
        ResultCode::NotFound,
    ];

    /// Map a raw integer code to a category.
    ///
    /// Returns `None` for `0` (success). Unrecognized non-zero codes map
    /// to [`ResultCode::UnknownError`] so no failure is ever dropped.
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            0 => None,
            2 => Some(ResultCode::InvalidConfiguration),
            3 => Some(ResultCode::Timeout),
            5 => Some(ResultCode::ConnectError),
            7 => Some(ResultCode::AuthenticationError),
            13 => Some(ResultCode::ConsumerBusy),
            15 => Some(ResultCode::AlreadyClosed),
            21 => Some(ResultCode::InvalidTopicName),
            26 => Some(ResultCode::NotFound),
            _ => Some(ResultCode::UnknownError),
        }
    }

    /// The raw integer code for this category.
    pub fn as_raw(self) -> i32 {
        match self {
            ResultCode::UnknownError => 1,
            ResultCode::InvalidConfiguration => 2,
            ResultCode::Timeout => 3,
            ResultCode::ConnectError => 5,
            ResultCode::AuthenticationError => 7,
            ResultCode::ConsumerBusy => 13,
            ResultCode::AlreadyClosed => 15,
            ResultCode::InvalidTopicName => 21,
            ResultCode::NotFound => 26,
        }
    }

    /// Stable name used in messages and exception class names.
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::UnknownError => "UnknownError",
            ResultCode::InvalidConfiguration => "InvalidConfiguration",
            ResultCode::Timeout => "Timeout",
            ResultCode::ConnectError => "ConnectError",
            ResultCode::AuthenticationError => "AuthenticationError",
            ResultCode::ConsumerBusy => "ConsumerBusy",
            ResultCode::AlreadyClosed => "AlreadyClosed",
            ResultCode::InvalidTopicName => "InvalidTopicName",
            ResultCode::NotFound => "NotFound",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed completion: category plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct Status {
    code: ResultCode,
    message: String,
}

impl Status {
    /// Create a status with the given category and message.
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an [`ResultCode::AlreadyClosed`] status.
    pub fn already_closed(what: &str) -> Self {
        Self::new(ResultCode::AlreadyClosed, format!("{what} already closed"))
    }

    /// Shorthand for a [`ResultCode::NotFound`] status.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ResultCode::NotFound, message)
    }

    /// The failure category.
    pub fn code(&self) -> ResultCode {
        self.code
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Split into category and message.
    pub fn into_parts(self) -> (ResultCode, String) {
        (self.code, self.message)
    }
}

/// Convert a native `(code, value)` callback pair into a `Result`.
///
/// Code `0` yields `Ok(value)`; anything else drops `value` and yields the
/// matching [`Status`].
pub fn from_raw<T>(code: i32, message: &str, value: T) -> Result<T, Status> {
    match ResultCode::from_raw(code) {
        None => Ok(value),
        Some(code) => Err(Status::new(code, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_roundtrip_for_every_category() {
        for code in ResultCode::ALL {
            assert_eq!(ResultCode::from_raw(code.as_raw()), Some(code));
        }
    }

    #[test]
    fn raw_zero_is_success() {
        assert_eq!(ResultCode::from_raw(0), None);
        assert_eq!(from_raw(0, "ignored", 7u32), Ok(7));
    }

    #[test]
    fn unrecognized_raw_code_is_unknown_error() {
        assert_eq!(ResultCode::from_raw(999), Some(ResultCode::UnknownError));
        assert_eq!(ResultCode::from_raw(-1), Some(ResultCode::UnknownError));
    }

    #[test]
    fn from_raw_failure_discards_value() {
        let err = from_raw(26, "topic does not exist", vec!["x".to_string()]).unwrap_err();
        assert_eq!(err.code(), ResultCode::NotFound);
        assert_eq!(err.message(), "topic does not exist");
    }

    #[test]
    fn status_display() {
        let status = Status::new(ResultCode::Timeout, "lookup timed out");
        assert_eq!(status.to_string(), "Timeout: lookup timed out");
    }

    #[test]
    fn already_closed_shorthand() {
        let status = Status::already_closed("client");
        assert_eq!(status.code(), ResultCode::AlreadyClosed);
        assert_eq!(status.message(), "client already closed");
    }

    #[test]
    fn status_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Status>();
    }
}
