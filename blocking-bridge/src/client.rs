//! Blocking wrapper around an [`AsyncClient`].
//!
//! Each method starts the async operation and parks the calling thread
//! until its callback fires. Clones share the same collaborator.

use std::fmt;
use std::sync::Arc;

use blocking_client::{AsyncClient, EmbeddedClient};
use blocking_core::{wait_for_async_result, wait_for_async_value};
use blocking_types::{
    Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader, ReaderConfig,
};

use crate::config::ClientConfig;
use crate::error::BridgeError;

/// Blocking client for binding layers.
#[derive(Clone)]
pub struct Client {
    inner: Arc<dyn AsyncClient>,
}

impl Client {
    /// Create a client from configuration.
    ///
    /// `memory://` URLs start an in-process client. Native schemes are
    /// accepted by validation but need a native collaborator passed to
    /// [`Client::from_async_client`].
    pub fn new(config: ClientConfig) -> Result<Self, BridgeError> {
        config.validate()?;

        if !config.is_embedded() {
            return Err(BridgeError::InvalidConfig(format!(
                "no native transport linked for '{}'; use memory:// or Client::from_async_client",
                config.service_url
            )));
        }

        let embedded = EmbeddedClient::new(config.embedded, config.io_threads, config.auth_token)?;
        tracing::info!(service_url = %config.service_url, "Client created");
        Ok(Self::from_async_client(Arc::new(embedded)))
    }

    /// Wrap an existing collaborator.
    pub fn from_async_client(inner: Arc<dyn AsyncClient>) -> Self {
        Self { inner }
    }

    /// Create a producer on `topic`.
    pub fn create_producer(
        &self,
        topic: &str,
        config: &ProducerConfig,
    ) -> Result<Producer, BridgeError> {
        tracing::debug!(topic, "create_producer");
        Ok(wait_for_async_value(|cb| {
            self.inner.create_producer_async(topic, config, cb)
        })?)
    }

    /// Subscribe to `topic`.
    pub fn subscribe(
        &self,
        topic: &str,
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, BridgeError> {
        tracing::debug!(topic, subscription, "subscribe");
        Ok(wait_for_async_value(|cb| {
            self.inner.subscribe_async(topic, subscription, config, cb)
        })?)
    }

    /// Subscribe one consumer to several topics.
    pub fn subscribe_topics(
        &self,
        topics: &[String],
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, BridgeError> {
        tracing::debug!(topics = topics.len(), subscription, "subscribe_topics");
        Ok(wait_for_async_value(|cb| {
            self.inner
                .subscribe_topics_async(topics, subscription, config, cb)
        })?)
    }

    /// Subscribe to every topic matching the regex `pattern`.
    pub fn subscribe_pattern(
        &self,
        pattern: &str,
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, BridgeError> {
        tracing::debug!(pattern, subscription, "subscribe_pattern");
        Ok(wait_for_async_value(|cb| {
            self.inner
                .subscribe_pattern_async(pattern, subscription, config, cb)
        })?)
    }

    /// Create a reader on `topic` starting at `start`.
    pub fn create_reader(
        &self,
        topic: &str,
        start: &MessageId,
        config: &ReaderConfig,
    ) -> Result<Reader, BridgeError> {
        tracing::debug!(topic, start = %start, "create_reader");
        Ok(wait_for_async_value(|cb| {
            self.inner.create_reader_async(topic, start, config, cb)
        })?)
    }

    /// Partition names of `topic`.
    pub fn get_topic_partitions(&self, topic: &str) -> Result<Vec<String>, BridgeError> {
        tracing::debug!(topic, "get_topic_partitions");
        Ok(wait_for_async_value(|cb| {
            self.inner.get_partitions_for_topic_async(topic, cb)
        })?)
    }

    /// Close every producer, consumer and reader, then the client.
    pub fn close(&self) -> Result<(), BridgeError> {
        tracing::debug!("close");
        wait_for_async_result(|cb| self.inner.close_async(cb))?;
        tracing::info!("Client closed");
        Ok(())
    }

    /// Stop immediately. Later operations fail with `AlreadyClosed`.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocking_client::TopicSpec;
    use blocking_types::ResultCode;

    fn memory_client() -> Client {
        Client::new(ClientConfig::new("memory://test")).unwrap()
    }

    #[test]
    fn native_scheme_without_transport_is_rejected() {
        let err = Client::new(ClientConfig::new("pulsar://localhost:6650")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
        assert!(err.to_string().contains("no native transport"));
    }

    #[test]
    fn invalid_config_is_rejected_before_start() {
        let err = Client::new(ClientConfig::new("")).unwrap_err();
        assert_eq!(err.code(), Some(ResultCode::InvalidConfiguration));
    }

    #[test]
    fn bad_embedded_topic_is_invalid_config() {
        let mut config = ClientConfig::new("memory://");
        config.embedded.topics.push(TopicSpec {
            name: "x/y".into(),
            partitions: 0,
        });
        let err = Client::new(config).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }

    #[test]
    fn create_producer_and_list_partitions() {
        let mut config = ClientConfig::new("memory://");
        config.embedded.topics.push(TopicSpec {
            name: "orders".into(),
            partitions: 3,
        });
        let client = Client::new(config).unwrap();

        let producer = client
            .create_producer("orders", &ProducerConfig::default())
            .unwrap();
        assert_eq!(producer.topic, "persistent://public/default/orders");

        let partitions = client.get_topic_partitions("orders").unwrap();
        assert_eq!(partitions.len(), 3);
        assert!(partitions[2].ends_with("orders-partition-2"));
    }

    #[test]
    fn subscribe_variants() {
        let client = memory_client();
        let config = ConsumerConfig::default();

        let single = client.subscribe("a", "s1", &config).unwrap();
        assert_eq!(single.subscription, "s1");

        let multi = client
            .subscribe_topics(&["a".to_string(), "b".to_string()], "s2", &config)
            .unwrap();
        assert_eq!(multi.topics.len(), 2);

        let pattern = client.subscribe_pattern("[ab]", "s3", &config).unwrap();
        assert_eq!(pattern.topics.len(), 2);
    }

    #[test]
    fn reader_starts_at_earliest() {
        let client = memory_client();
        let reader = client
            .create_reader("log", &MessageId::Earliest, &ReaderConfig::default())
            .unwrap();
        assert_eq!(reader.start, MessageId::Earliest);
    }

    #[test]
    fn exclusive_conflict_is_consumer_busy() {
        let client = memory_client();
        client
            .subscribe("a", "s", &ConsumerConfig::default())
            .unwrap();
        let err = client
            .subscribe("a", "s", &ConsumerConfig::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::ConsumerBusy(_)));
    }

    #[test]
    fn auth_token_mismatch_is_authentication_error() {
        let mut config = ClientConfig::new("memory://");
        config.embedded.auth_token = Some("secret".into());
        config.auth_token = Some("wrong".into());
        let client = Client::new(config).unwrap();

        let err = client.get_topic_partitions("a").unwrap_err();
        assert!(matches!(err, BridgeError::Authentication(_)));
    }

    #[test]
    fn clones_share_state() {
        let client = memory_client();
        let other = client.clone();

        client.close().unwrap();
        let err = other.close().unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyClosed(_)));
    }

    #[test]
    fn shutdown_is_terminal() {
        let client = memory_client();
        client.shutdown();
        let err = client
            .create_producer("a", &ProducerConfig::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyClosed(_)));
    }
}
