//! In-process client for `memory://` service URLs.
//!
//! Operations run on a dedicated tokio runtime, so completion callbacks
//! always fire on one of its I/O threads, never on the caller's.

mod broker;
mod completion;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blocking_types::{
    Callback, Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader,
    ReaderConfig, ResultCallback, ResultCode, Status,
};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use self::broker::EmbeddedBroker;
use self::completion::Completion;
use crate::AsyncClient;

/// A topic that exists when the embedded client starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    /// Topic name (short or fully-qualified).
    pub name: String,
    /// Number of partitions (0 = non-partitioned).
    #[serde(default)]
    pub partitions: u32,
}

/// Embedded broker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedConfig {
    /// Create unknown topics (non-partitioned) on first use.
    pub auto_create_topics: bool,
    /// Topics created at startup.
    pub topics: Vec<TopicSpec>,
    /// Token clients must present. `None` disables authentication.
    pub auth_token: Option<String>,
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            auto_create_topics: true,
            topics: Vec::new(),
            auth_token: None,
        }
    }
}

/// In-process [`AsyncClient`].
pub struct EmbeddedClient {
    broker: Arc<EmbeddedBroker>,
    runtime: Mutex<Option<Runtime>>,
}

impl EmbeddedClient {
    /// Start an embedded client with `io_threads` callback threads.
    ///
    /// `auth_token` is the token this client presents to the broker.
    pub fn new(
        config: EmbeddedConfig,
        io_threads: usize,
        auth_token: Option<String>,
    ) -> Result<Self, Status> {
        let broker = EmbeddedBroker::new(config, auth_token)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(io_threads.max(1))
            .thread_name("pulsar-io")
            .enable_all()
            .build()
            .map_err(|e| {
                Status::new(
                    ResultCode::UnknownError,
                    format!("failed to start I/O runtime: {e}"),
                )
            })?;

        tracing::info!(io_threads = io_threads.max(1), "Embedded client started");
        Ok(Self {
            broker: Arc::new(broker),
            runtime: Mutex::new(Some(runtime)),
        })
    }

    /// Live producers.
    pub fn producer_count(&self) -> usize {
        self.broker.producer_count()
    }

    /// Live consumers.
    pub fn consumer_count(&self) -> usize {
        self.broker.consumer_count()
    }

    /// Live readers.
    pub fn reader_count(&self) -> usize {
        self.broker.reader_count()
    }

    /// Whether the client was closed or shut down.
    pub fn is_closed(&self) -> bool {
        self.broker.is_closed()
    }

    fn runtime(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` on an I/O thread and hand its result to `callback`.
    fn dispatch<T, F>(&self, callback: Callback<T>, op: F)
    where
        T: Send + 'static,
        F: FnOnce(&EmbeddedBroker) -> Result<T, Status> + Send + 'static,
    {
        let completion = Completion::new(callback);
        let broker = Arc::clone(&self.broker);

        let runtime = self.runtime();
        if let Some(runtime) = runtime.as_ref() {
            runtime.spawn(async move {
                completion.deliver(op(&broker));
            });
            return;
        }
        drop(runtime);

        completion.deliver(Err(Status::already_closed("client")));
    }

    fn stop_runtime(&self) {
        let runtime = self.runtime().take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
            tracing::info!("Embedded client shut down");
        }
    }
}

impl AsyncClient for EmbeddedClient {
    fn create_producer_async(
        &self,
        topic: &str,
        config: &ProducerConfig,
        callback: Callback<Producer>,
    ) {
        let topic = topic.to_string();
        let config = config.clone();
        self.dispatch(callback, move |broker| {
            broker.create_producer(&topic, &config)
        });
    }

    fn subscribe_async(
        &self,
        topic: &str,
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        self.subscribe_topics_async(&[topic.to_string()], subscription, config, callback);
    }

    fn subscribe_topics_async(
        &self,
        topics: &[String],
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        let topics = topics.to_vec();
        let subscription = subscription.to_string();
        let config = config.clone();
        self.dispatch(callback, move |broker| {
            broker.subscribe(&topics, &subscription, &config)
        });
    }

    fn subscribe_pattern_async(
        &self,
        pattern: &str,
        subscription: &str,
        config: &ConsumerConfig,
        callback: Callback<Consumer>,
    ) {
        let pattern = pattern.to_string();
        let subscription = subscription.to_string();
        let config = config.clone();
        self.dispatch(callback, move |broker| {
            broker.subscribe_pattern(&pattern, &subscription, &config)
        });
    }

    fn create_reader_async(
        &self,
        topic: &str,
        start: &MessageId,
        config: &ReaderConfig,
        callback: Callback<Reader>,
    ) {
        let topic = topic.to_string();
        let start = *start;
        let config = config.clone();
        self.dispatch(callback, move |broker| {
            broker.create_reader(&topic, &start, &config)
        });
    }

    fn get_partitions_for_topic_async(&self, topic: &str, callback: Callback<Vec<String>>) {
        let topic = topic.to_string();
        self.dispatch(callback, move |broker| broker.partitions_for(&topic));
    }

    fn close_async(&self, callback: ResultCallback) {
        self.dispatch(callback, |broker| broker.close());
    }

    fn shutdown(&self) {
        self.broker.mark_closed();
        self.stop_runtime();
    }
}

impl Drop for EmbeddedClient {
    fn drop(&mut self) {
        self.broker.mark_closed();
        self.stop_runtime();
    }
}

impl fmt::Debug for EmbeddedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedClient")
            .field("closed", &self.broker.is_closed())
            .field("producers", &self.broker.producer_count())
            .field("consumers", &self.broker.consumer_count())
            .field("readers", &self.broker.reader_count())
            .finish()
    }
}
