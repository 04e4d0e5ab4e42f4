//! Callback-based client abstraction.
//!
//! Every operation returns immediately and reports its outcome through the
//! callback it was given. Implementations must invoke that callback
//! exactly once, from any thread, possibly before the method returns.
//!
//! # Example
//!
//! ```ignore
//! client.get_partitions_for_topic_async("orders", Arc::new(|result| {
//!     println!("{result:?}");
//! }));
//! ```

use blocking_types::{
    Callback, Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader,
    ReaderConfig, ResultCallback,
};

/// A messaging client exposing callback-based operations.
///
/// Implementations are shared by every blocking handle derived from them,
/// so they must be `Send + Sync`.
pub trait AsyncClient: Send + Sync {
    /// Create a producer on `topic`.
    fn create_producer_async(
        &self,
        topic: &str,
        config: &ProducerConfig,
        callback: Callback<Producer>,
    );

    /// Subscribe to a single topic.
    fn subscribe_async(
        &self,
        topic: &str,
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    );

    /// Subscribe one consumer to several topics.
    fn subscribe_topics_async(
        &self,
        topics: &[String],
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    );

    /// Subscribe to every topic whose name matches `pattern`.
    fn subscribe_pattern_async(
        &self,
        pattern: &str,
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    );

    /// Create a reader on `topic` starting at `start`.
    fn create_reader_async(
        &self,
        topic: &str,
        start: &MessageId,
        config: &ReaderConfig,
        callback: Callback<Reader>,
    );

    /// List the partition names of `topic`.
    fn get_partitions_for_topic_async(&self, topic: &str, callback: Callback<Vec<String>>);

    /// Close every producer, consumer and reader, then the client.
    fn close_async(&self, callback: ResultCallback);

    /// Stop immediately without waiting for anything in flight.
    ///
    /// Terminal: every later operation fails with `AlreadyClosed`.
    fn shutdown(&self);
}
