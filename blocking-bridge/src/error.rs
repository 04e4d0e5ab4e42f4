//! Error types for blocking-bridge.
//!
//! Every failure status flattens to one variant per result category,
//! keeping the collaborator's message. Binding layers match on the
//! variant, not on numeric codes.

use blocking_types::{ResultCode, Status};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors from blocking-bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Could not reach the service.
    #[error("connect error: {0}")]
    Connection(String),

    /// The operation timed out inside the collaborator.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Credentials were rejected.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Topic or subscription does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Client (or handle) already closed.
    #[error("already closed: {0}")]
    AlreadyClosed(String),

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Topic name could not be parsed.
    #[error("invalid topic name: {0}")]
    InvalidTopicName(String),

    /// Subscription cannot take another consumer.
    #[error("consumer busy: {0}")]
    ConsumerBusy(String),

    /// Anything else.
    #[error("unknown error: {0}")]
    Unknown(String),

    /// Configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BridgeError {
    /// The result category this error came from, if any.
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            BridgeError::Connection(_) => Some(ResultCode::ConnectError),
            BridgeError::Timeout(_) => Some(ResultCode::Timeout),
            BridgeError::Authentication(_) => Some(ResultCode::AuthenticationError),
            BridgeError::NotFound(_) => Some(ResultCode::NotFound),
            BridgeError::AlreadyClosed(_) => Some(ResultCode::AlreadyClosed),
            BridgeError::InvalidConfig(_) => Some(ResultCode::InvalidConfiguration),
            BridgeError::InvalidTopicName(_) => Some(ResultCode::InvalidTopicName),
            BridgeError::ConsumerBusy(_) => Some(ResultCode::ConsumerBusy),
            BridgeError::Unknown(_) => Some(ResultCode::UnknownError),
            BridgeError::Config(_) => None,
        }
    }
}

impl From<Status> for BridgeError {
    fn from(status: Status) -> Self {
        let (code, message) = status.into_parts();
        match code {
            ResultCode::ConnectError => BridgeError::Connection(message),
            ResultCode::Timeout => BridgeError::Timeout(message),
            ResultCode::AuthenticationError => BridgeError::Authentication(message),
            ResultCode::NotFound => BridgeError::NotFound(message),
            ResultCode::AlreadyClosed => BridgeError::AlreadyClosed(message),
            ResultCode::InvalidConfiguration => BridgeError::InvalidConfig(message),
            ResultCode::InvalidTopicName => BridgeError::InvalidTopicName(message),
            ResultCode::ConsumerBusy => BridgeError::ConsumerBusy(message),
            ResultCode::UnknownError => BridgeError::Unknown(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips_through_variant() {
        for code in ResultCode::ALL {
            let err: BridgeError = Status::new(code, "msg").into();
            assert_eq!(err.code(), Some(code));
        }
    }

    #[test]
    fn not_found_keeps_message() {
        let err: BridgeError = Status::not_found("topic does not exist").into();
        assert!(matches!(err, BridgeError::NotFound(_)));
        assert_eq!(err.to_string(), "not found: topic does not exist");
    }

    #[test]
    fn already_closed_maps_correctly() {
        let err: BridgeError = Status::already_closed("client").into();
        assert!(matches!(err, BridgeError::AlreadyClosed(ref m) if m == "client already closed"));
    }

    #[test]
    fn config_error_has_no_code() {
        let err: BridgeError = ConfigError::ParseError {
            path: "client.toml".into(),
            source: toml::from_str::<toml::Value>("= nope").unwrap_err(),
        }
        .into();
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("client.toml"));
    }
}
