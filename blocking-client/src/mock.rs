//! Mock client for testing.
//!
//! Allows scripting results per operation, choosing how callbacks are
//! delivered, and capturing every call for verification.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use blocking_types::{
    Callback, Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader,
    ReaderConfig, ResultCallback, ResultCode, Status,
};

use crate::AsyncClient;

/// How the mock invokes completion callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Invoke the callback before the operation method returns.
    #[default]
    Immediate,
    /// Invoke the callback from a separate thread after the delay.
    Delayed(Duration),
    /// Hold the callback until a test releases it.
    Parked,
    /// Invoke the callback with the scripted result, then again with a
    /// failure.
    Twice,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `create_producer_async`
    CreateProducer {
        /// Requested topic.
        topic: String,
    },
    /// `subscribe_async`
    Subscribe {
        /// Requested topic.
        topic: String,
        /// Subscription name.
        subscription: String,
    },
    /// `subscribe_topics_async`
    SubscribeTopics {
        /// Requested topics.
        topics: Vec<String>,
        /// Subscription name.
        subscription: String,
    },
    /// `subscribe_pattern_async`
    SubscribePattern {
        /// Requested pattern.
        pattern: String,
        /// Subscription name.
        subscription: String,
    },
    /// `create_reader_async`
    CreateReader {
        /// Requested topic.
        topic: String,
        /// Requested start position.
        start: MessageId,
    },
    /// `get_partitions_for_topic_async`
    GetPartitions {
        /// Requested topic.
        topic: String,
    },
    /// `close_async`
    Close,
    /// `shutdown`
    Shutdown,
}

type ParkedCompletion = Box<dyn FnOnce() + Send>;

/// Mock client for testing.
///
/// Unscripted operations complete with `UnknownError`.
#[derive(Default)]
pub struct MockClient {
    inner: Arc<Mutex<MockClientInner>>,
}

#[derive(Default)]
struct MockClientInner {
    delivery: Delivery,
    producers: VecDeque<Result<Producer, Status>>,
    consumers: VecDeque<Result<Consumer, Status>>,
    readers: VecDeque<Result<Reader, Status>>,
    partitions: VecDeque<Result<Vec<String>, Status>>,
    close_results: VecDeque<Result<(), Status>>,
    calls: Vec<MockCall>,
    parked: VecDeque<ParkedCompletion>,
    shut_down: bool,
}

impl MockClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how later callbacks are delivered.
    pub fn set_delivery(&self, delivery: Delivery) {
        self.lock().delivery = delivery;
    }

    /// Queue the result of the next `create_producer_async`.
    pub fn queue_producer(&self, result: Result<Producer, Status>) {
        self.lock().producers.push_back(result);
    }

    /// Queue the result of the next subscribe call (any flavour).
    pub fn queue_consumer(&self, result: Result<Consumer, Status>) {
        self.lock().consumers.push_back(result);
    }

    /// Queue the result of the next `create_reader_async`.
    pub fn queue_reader(&self, result: Result<Reader, Status>) {
        self.lock().readers.push_back(result);
    }

    /// Queue the result of the next `get_partitions_for_topic_async`.
    pub fn queue_partitions(&self, result: Result<Vec<String>, Status>) {
        self.lock().partitions.push_back(result);
    }

    /// Queue the result of the next `close_async`.
    pub fn queue_close(&self, result: Result<(), Status>) {
        self.lock().close_results.push_back(result);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of callbacks held by [`Delivery::Parked`].
    pub fn parked_count(&self) -> usize {
        self.lock().parked.len()
    }

    /// Release the oldest parked callback. Returns `false` if none.
    pub fn complete_next_parked(&self) -> bool {
        let next = self.lock().parked.pop_front();
        next.map(|complete| complete()).is_some()
    }

    /// Release the most recently parked callback. Returns `false` if none.
    pub fn complete_last_parked(&self) -> bool {
        let last = self.lock().parked.pop_back();
        last.map(|complete| complete()).is_some()
    }

    /// Whether `shutdown` was called.
    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    /// Clear all state (scripts, calls, parked callbacks).
    pub fn reset(&self) {
        *self.lock() = MockClientInner::default();
    }

    fn lock(&self) -> MutexGuard<'_, MockClientInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: MockCall) {
        self.lock().calls.push(call);
    }

    // Never hold the lock while a callback runs.
    fn deliver<T: Send + 'static>(&self, callback: Callback<T>, result: Result<T, Status>) {
        let delivery = self.lock().delivery;
        match delivery {
            Delivery::Immediate => callback(result),
            Delivery::Delayed(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    callback(result);
                });
            }
            Delivery::Parked => {
                self.lock()
                    .parked
                    .push_back(Box::new(move || callback(result)));
            }
            Delivery::Twice => {
                callback(result);
                callback(Err(Status::new(
                    ResultCode::UnknownError,
                    "duplicate completion",
                )));
            }
        }
    }
}

impl Clone for MockClient {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("MockClient")
            .field("delivery", &inner.delivery)
            .field("calls", &inner.calls.len())
            .field("parked", &inner.parked.len())
            .field("shut_down", &inner.shut_down)
            .finish_non_exhaustive()
    }
}

fn next_scripted<T>(queue: &mut VecDeque<Result<T, Status>>, operation: &str) -> Result<T, Status> {
    queue.pop_front().unwrap_or_else(|| {
        Err(Status::new(
            ResultCode::UnknownError,
            format!("no scripted response for {operation}"),
        ))
    })
}

impl AsyncClient for MockClient {
    fn create_producer_async(
        &self,
        topic: &str,
        _config: &ProducerConfig,
        callback: Callback<Producer>,
    ) {
        self.record(MockCall::CreateProducer {
            topic: topic.to_string(),
        });
        let result = next_scripted(&mut self.lock().producers, "create_producer");
        self.deliver(callback, result);
    }

    fn subscribe_async(
        &self,
        topic: &str,
        subscription: &str,
        _config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        self.record(MockCall::Subscribe {
            topic: topic.to_string(),
            subscription: subscription.to_string(),
        });
        let result = next_scripted(&mut self.lock().consumers, "subscribe");
        self.deliver(callback, result);
    }

    fn subscribe_topics_async(
        &self,
        topics: &[String],
        subscription: &str,
        _config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        self.record(MockCall::SubscribeTopics {
            topics: topics.to_vec(),
            subscription: subscription.to_string(),
        });
        let result = next_scripted(&mut self.lock().consumers, "subscribe_topics");
        self.deliver(callback, result);
    }

    fn subscribe_pattern_async(
        &self,
        pattern: &str,
        subscription: &str,
        _config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        self.record(MockCall::SubscribePattern {
            pattern: pattern.to_string(),
            subscription: subscription.to_string(),
        });
        let result = next_scripted(&mut self.lock().consumers, "subscribe_pattern");
        self.deliver(callback, result);
    }

    fn create_reader_async(
        &self,
        topic: &str,
        start: &MessageId,
        _config: &ReaderConfig,
        callback: Callback<Reader>,
    ) {
        self.record(MockCall::CreateReader {
            topic: topic.to_string(),
            start: *start,
        });
        let result = next_scripted(&mut self.lock().readers, "create_reader");
        self.deliver(callback, result);
    }

    fn get_partitions_for_topic_async(&self, topic: &str, callback: Callback<Vec<String>>) {
        self.record(MockCall::GetPartitions {
            topic: topic.to_string(),
        });
        let result = next_scripted(&mut self.lock().partitions, "get_partitions_for_topic");
        self.deliver(callback, result);
    }

    fn close_async(&self, callback: ResultCallback) {
        self.record(MockCall::Close);
        let result = next_scripted(&mut self.lock().close_results, "close");
        self.deliver(callback, result);
    }

    fn shutdown(&self) {
        let mut inner = self.lock();
        inner.calls.push(MockCall::Shutdown);
        inner.shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Captured<T> = Arc<Mutex<Vec<Result<T, Status>>>>;

    fn capture<T: Send + 'static>() -> (Callback<T>, Captured<T>) {
        let seen: Captured<T> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: Callback<T> = Arc::new(move |result| sink.lock().unwrap().push(result));
        (callback, seen)
    }

    // ===========================================
    // Scripted Results
    // ===========================================

    #[test]
    fn immediate_delivery_fires_before_return() {
        let mock = MockClient::new();
        mock.queue_producer(Ok(Producer::new(42, "topic-1", "p-42")));

        let (callback, seen) = capture();
        mock.create_producer_async("topic-1", &ProducerConfig::default(), callback);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap().id, 42);
    }

    #[test]
    fn unscripted_operation_fails_with_unknown_error() {
        let mock = MockClient::new();
        let (callback, seen) = capture();
        mock.get_partitions_for_topic_async("t", callback);

        let seen = seen.lock().unwrap();
        let err = seen[0].as_ref().unwrap_err();
        assert_eq!(err.code(), ResultCode::UnknownError);
        assert!(err.message().contains("get_partitions_for_topic"));
    }

    #[test]
    fn scripted_results_are_consumed_in_order() {
        let mock = MockClient::new();
        mock.queue_close(Err(Status::new(ResultCode::Timeout, "slow")));
        mock.queue_close(Ok(()));

        let (callback, seen) = capture();
        mock.close_async(Arc::clone(&callback));
        mock.close_async(callback);

        let seen = seen.lock().unwrap();
        assert!(seen[0].is_err());
        assert!(seen[1].is_ok());
    }

    // ===========================================
    // Delivery Modes
    // ===========================================

    #[test]
    fn parked_delivery_waits_for_release() {
        let mock = MockClient::new();
        mock.set_delivery(Delivery::Parked);
        mock.queue_partitions(Ok(vec!["a".to_string()]));
        mock.queue_partitions(Ok(vec!["b".to_string()]));

        let (callback, seen) = capture();
        mock.get_partitions_for_topic_async("a", Arc::clone(&callback));
        mock.get_partitions_for_topic_async("b", callback);
        assert_eq!(mock.parked_count(), 2);
        assert!(seen.lock().unwrap().is_empty());

        assert!(mock.complete_last_parked());
        assert!(mock.complete_next_parked());
        assert!(!mock.complete_next_parked());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].as_ref().unwrap(), &vec!["b".to_string()]);
        assert_eq!(seen[1].as_ref().unwrap(), &vec!["a".to_string()]);
    }

    #[test]
    fn twice_delivery_invokes_callback_twice() {
        let mock = MockClient::new();
        mock.set_delivery(Delivery::Twice);
        mock.queue_reader(Ok(Reader::new(3, "t", MessageId::Earliest)));

        let (callback, seen) = capture();
        mock.create_reader_async("t", &MessageId::Earliest, &ReaderConfig::default(), callback);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_ok());
        assert!(seen[1].is_err());
    }

    #[test]
    fn delayed_delivery_fires_from_another_thread() {
        let mock = MockClient::new();
        mock.set_delivery(Delivery::Delayed(Duration::from_millis(20)));
        mock.queue_consumer(Ok(Consumer::new(7, vec!["t".into()], "sub", "c")));

        let caller = thread::current().id();
        let (tx, rx) = std::sync::mpsc::channel();
        let callback: Callback<Consumer> = Arc::new(move |result| {
            let _ = tx.send((thread::current().id(), result));
        });
        mock.subscribe_async("t", "sub", &ConsumerConfig::default(), callback);

        let (thread_id, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(thread_id, caller);
        assert_eq!(result.unwrap().id, 7);
    }

    // ===========================================
    // Call Recording
    // ===========================================

    #[test]
    fn calls_are_recorded() {
        let mock = MockClient::new();
        let (callback, _) = capture();
        mock.subscribe_topics_async(
            &["a".to_string(), "b".to_string()],
            "sub",
            &ConsumerConfig::default(),
            callback,
        );
        mock.shutdown();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::SubscribeTopics {
                    topics: vec!["a".to_string(), "b".to_string()],
                    subscription: "sub".to_string(),
                },
                MockCall::Shutdown,
            ]
        );
        assert!(mock.is_shut_down());
    }

    #[test]
    fn clone_shares_state_and_reset_clears_it() {
        let mock = MockClient::new();
        let other = mock.clone();
        other.shutdown();
        assert!(mock.is_shut_down());

        mock.reset();
        assert!(!other.is_shut_down());
        assert!(other.calls().is_empty());
    }
}
