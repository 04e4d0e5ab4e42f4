//! Per-operation configuration passed through to the client.
//!
//! These are opaque to the blocking adapter; only the collaborator
//! interprets them. Every field has a default so partial TOML/JSON works.

use serde::{Deserialize, Serialize};

/// Payload compression applied by a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionType {
    /// No compression.
    #[default]
    None,
    /// LZ4.
    Lz4,
    /// zlib.
    Zlib,
    /// Zstandard.
    Zstd,
    /// Snappy.
    Snappy,
}

/// How messages of a subscription are distributed among its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    /// A single consumer owns the subscription.
    #[default]
    Exclusive,
    /// Round-robin across all consumers.
    Shared,
    /// One active consumer, others on standby.
    Failover,
    /// Messages with the same key go to the same consumer.
    KeyShared,
}

/// Where a new subscription starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPosition {
    /// Only messages published after the subscription is created.
    #[default]
    Latest,
    /// Every retained message.
    Earliest,
}

/// Producer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Explicit producer name; generated when absent.
    pub producer_name: Option<String>,
    /// Send timeout in milliseconds (0 = no timeout).
    pub send_timeout_ms: u64,
    /// Whether to batch outgoing messages.
    pub batching_enabled: bool,
    /// Maximum messages awaiting broker acknowledgement.
    pub max_pending_messages: u32,
    /// Payload compression.
    pub compression: CompressionType,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            producer_name: None,
            send_timeout_ms: 30_000,
            batching_enabled: true,
            max_pending_messages: 1000,
            compression: CompressionType::None,
        }
    }
}

/// Consumer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Explicit consumer name; generated when absent.
    pub consumer_name: Option<String>,
    /// Subscription mode.
    pub subscription_type: SubscriptionType,
    /// Prefetch queue size.
    pub receiver_queue_size: u32,
    /// Start position for a new subscription.
    pub initial_position: InitialPosition,
    /// How often pattern subscriptions look for new topics, in seconds.
    pub pattern_auto_discovery_period_secs: u32,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            consumer_name: None,
            subscription_type: SubscriptionType::Exclusive,
            receiver_queue_size: 1000,
            initial_position: InitialPosition::Latest,
            pattern_auto_discovery_period_secs: 60,
        }
    }
}

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Explicit reader name; generated when absent.
    pub reader_name: Option<String>,
    /// Prefetch queue size.
    pub receiver_queue_size: u32,
    /// Prefix for the reader's internal subscription name.
    pub subscription_role_prefix: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            reader_name: None,
            receiver_queue_size: 1000,
            subscription_role_prefix: None,
        }
    }
}
