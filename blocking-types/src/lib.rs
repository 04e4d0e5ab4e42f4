//! # blocking-types
//!
//! Shared types for the pulsar-blocking bindings.
//!
//! This crate provides the vocabulary every other crate speaks:
//! - [`Status`], [`ResultCode`] - Failure taxonomy delivered by completion callbacks
//! - [`Producer`], [`Consumer`], [`Reader`] - Opaque handles returned by the client
//! - [`ProducerConfig`], [`ConsumerConfig`], [`ReaderConfig`] - Per-operation settings
//! - [`MessageId`] - Reader start positions
//! - [`TopicName`] - Topic name parsing and partition naming
//! - [`Callback`], [`ResultCallback`] - Completion callback shapes

#![warn(missing_docs)]
#![warn(clippy::all)]

mod callback;
mod config;
mod handles;
mod message_id;
pub mod status;
mod topic;

pub use callback::{Callback, ResultCallback};
pub use config::{
    CompressionType, ConsumerConfig, InitialPosition, ProducerConfig, ReaderConfig,
    SubscriptionType,
};
pub use handles::{Consumer, Producer, Reader};
pub use message_id::MessageId;
pub use status::{ResultCode, Status};
pub use topic::{TopicDomain, TopicName, PARTITION_SUFFIX};
