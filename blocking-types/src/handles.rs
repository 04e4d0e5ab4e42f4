//! Handles returned by successful client operations.
//!
//! The bindings never look inside these; they carry enough to identify the
//! object on the collaborator's side and to print something useful.

use serde::{Deserialize, Serialize};

use crate::MessageId;

/// A created producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Producer {
    /// Collaborator-assigned identifier.
    pub id: u64,
    /// Fully-qualified topic the producer publishes to.
    pub topic: String,
    /// Producer name (given or generated).
    pub producer_name: String,
}

/// A subscribed consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consumer {
    /// Collaborator-assigned identifier.
    pub id: u64,
    /// Every topic the consumer is attached to, in subscription order.
    pub topics: Vec<String>,
    /// Subscription name.
    pub subscription: String,
    /// Consumer name (given or generated).
    pub consumer_name: String,
}

/// A created reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reader {
    /// Collaborator-assigned identifier.
    pub id: u64,
    /// Fully-qualified topic being read.
    pub topic: String,
    /// Position the reader started from.
    pub start: MessageId,
}

impl Producer {
    /// Build a producer handle.
    pub fn new(id: u64, topic: impl Into<String>, producer_name: impl Into<String>) -> Self {
        Self {
            id,
            topic: topic.into(),
            producer_name: producer_name.into(),
        }
    }
}

impl Consumer {
    /// Build a consumer handle.
    pub fn new(
        id: u64,
        topics: Vec<String>,
        subscription: impl Into<String>,
        consumer_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            topics,
            subscription: subscription.into(),
            consumer_name: consumer_name.into(),
        }
    }
}

impl Reader {
    /// Build a reader handle.
    pub fn new(id: u64, topic: impl Into<String>, start: MessageId) -> Self {
        Self {
            id,
            topic: topic.into(),
            start,
        }
    }
}
