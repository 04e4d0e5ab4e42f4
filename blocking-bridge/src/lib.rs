//! # blocking-bridge
//!
//! Blocking client for language bindings.
//!
//! Wraps any [`AsyncClient`](blocking_client::AsyncClient) in [`Client`],
//! whose methods block the calling thread until the operation's callback
//! fires and return the delivered value or a [`BridgeError`].
//!
//! ## Design
//!
//! - One pending operation per call; concurrent calls never serialize
//! - Errors flatten to one variant per result category
//! - No timeout: a call returns only when its callback fires
//! - Thin wrappers: all operation logic lives in the collaborator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

pub use client::Client;
pub use config::{ClientConfig, ConfigError};
pub use error::BridgeError;
pub use logging::init_logging;

pub use blocking_client::{EmbeddedConfig, TopicSpec};
pub use blocking_types::{
    CompressionType, Consumer, ConsumerConfig, InitialPosition, MessageId, Producer,
    ProducerConfig, Reader, ReaderConfig, ResultCode, SubscriptionType,
};
