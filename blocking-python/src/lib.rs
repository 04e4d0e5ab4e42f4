//! # blocking-python
//!
//! Python bindings for the blocking pulsar client via PyO3.
//!
//! Wraps [`blocking_bridge::Client`] into Python classes whose methods
//! block until the operation completes. The interpreter lock is released
//! for the whole wait, so other Python threads keep running.

#![warn(clippy::all)]

use std::path::PathBuf;

use pyo3::create_exception;
use pyo3::exceptions::PyException;
use pyo3::prelude::*;

use blocking_bridge as bridge;
use blocking_bridge::{BridgeError, ResultCode};

// ============================================================
// Exceptions: one class per result category
// ============================================================

create_exception!(_pulsar_blocking, PulsarException, PyException);
create_exception!(_pulsar_blocking, ConnectError, PulsarException);
create_exception!(_pulsar_blocking, Timeout, PulsarException);
create_exception!(_pulsar_blocking, AuthenticationError, PulsarException);
create_exception!(_pulsar_blocking, NotFound, PulsarException);
create_exception!(_pulsar_blocking, AlreadyClosed, PulsarException);
create_exception!(_pulsar_blocking, InvalidConfiguration, PulsarException);
create_exception!(_pulsar_blocking, InvalidTopicName, PulsarException);
create_exception!(_pulsar_blocking, ConsumerBusy, PulsarException);
create_exception!(_pulsar_blocking, UnknownError, PulsarException);

fn to_py_err(err: BridgeError) -> PyErr {
    let message = err.to_string();
    match err.code() {
        Some(ResultCode::ConnectError) => ConnectError::new_err(message),
        Some(ResultCode::Timeout) => Timeout::new_err(message),
        Some(ResultCode::AuthenticationError) => AuthenticationError::new_err(message),
        Some(ResultCode::NotFound) => NotFound::new_err(message),
        Some(ResultCode::AlreadyClosed) => AlreadyClosed::new_err(message),
        Some(ResultCode::InvalidConfiguration) | None => InvalidConfiguration::new_err(message),
        Some(ResultCode::InvalidTopicName) => InvalidTopicName::new_err(message),
        Some(ResultCode::ConsumerBusy) => ConsumerBusy::new_err(message),
        Some(ResultCode::UnknownError) => UnknownError::new_err(message),
    }
}

// ============================================================
// String options
// ============================================================

fn parse_compression(value: &str) -> Result<bridge::CompressionType, BridgeError> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Ok(bridge::CompressionType::None),
        "lz4" => Ok(bridge::CompressionType::Lz4),
        "zlib" => Ok(bridge::CompressionType::Zlib),
        "zstd" => Ok(bridge::CompressionType::Zstd),
        "snappy" => Ok(bridge::CompressionType::Snappy),
        other => Err(BridgeError::InvalidConfig(format!(
            "unknown compression type '{other}'"
        ))),
    }
}

fn parse_subscription_type(value: &str) -> Result<bridge::SubscriptionType, BridgeError> {
    match value.to_ascii_lowercase().replace('-', "_").as_str() {
        "exclusive" => Ok(bridge::SubscriptionType::Exclusive),
        "shared" => Ok(bridge::SubscriptionType::Shared),
        "failover" => Ok(bridge::SubscriptionType::Failover),
        "key_shared" | "keyshared" => Ok(bridge::SubscriptionType::KeyShared),
        other => Err(BridgeError::InvalidConfig(format!(
            "unknown subscription type '{other}'"
        ))),
    }
}

fn parse_initial_position(value: &str) -> Result<bridge::InitialPosition, BridgeError> {
    match value.to_ascii_lowercase().as_str() {
        "latest" => Ok(bridge::InitialPosition::Latest),
        "earliest" => Ok(bridge::InitialPosition::Earliest),
        other => Err(BridgeError::InvalidConfig(format!(
            "unknown initial position '{other}'"
        ))),
    }
}

/// `base` with `service_url` taking precedence over any URL it carries.
fn client_config_for(
    service_url: &str,
    base: Option<&bridge::ClientConfig>,
) -> bridge::ClientConfig {
    match base {
        Some(base) => bridge::ClientConfig {
            service_url: service_url.to_string(),
            ..base.clone()
        },
        None => bridge::ClientConfig::new(service_url),
    }
}

// ============================================================
// Configuration classes: #[pyclass(frozen)], keyword-only
// ============================================================

/// Client-wide settings.
#[pyclass(frozen)]
pub struct ClientConfiguration {
    inner: bridge::ClientConfig,
}

#[pymethods]
impl ClientConfiguration {
    #[new]
    #[pyo3(signature = (*, io_threads=1, auth_token=None, auto_create_topics=true, topics=Vec::new(), embedded_auth_token=None))]
    fn new(
        io_threads: usize,
        auth_token: Option<String>,
        auto_create_topics: bool,
        topics: Vec<(String, u32)>,
        embedded_auth_token: Option<String>,
    ) -> Self {
        let mut inner = bridge::ClientConfig::new("");
        inner.io_threads = io_threads;
        inner.auth_token = auth_token;
        inner.embedded = bridge::EmbeddedConfig {
            auto_create_topics,
            topics: topics
                .into_iter()
                .map(|(name, partitions)| bridge::TopicSpec { name, partitions })
                .collect(),
            auth_token: embedded_auth_token,
        };
        Self { inner }
    }

    /// Service URL loaded from a config file (empty when built in code).
    #[getter]
    fn service_url(&self) -> String {
        self.inner.service_url.clone()
    }

    #[getter]
    fn io_threads(&self) -> usize {
        self.inner.io_threads
    }

    #[getter]
    fn auth_token(&self) -> Option<String> {
        self.inner.auth_token.clone()
    }

    #[getter]
    fn auto_create_topics(&self) -> bool {
        self.inner.embedded.auto_create_topics
    }

    fn __repr__(&self) -> String {
        format!(
            "ClientConfiguration(service_url='{}', io_threads={})",
            self.inner.service_url, self.inner.io_threads
        )
    }
}

/// Producer settings.
#[pyclass(frozen)]
pub struct ProducerConfiguration {
    inner: bridge::ProducerConfig,
}

#[pymethods]
impl ProducerConfiguration {
    #[new]
    #[pyo3(signature = (*, producer_name=None, send_timeout_ms=None, batching_enabled=None, max_pending_messages=None, compression=None))]
    fn new(
        producer_name: Option<String>,
        send_timeout_ms: Option<u64>,
        batching_enabled: Option<bool>,
        max_pending_messages: Option<u32>,
        compression: Option<&str>,
    ) -> PyResult<Self> {
        let defaults = bridge::ProducerConfig::default();
        let compression = match compression {
            Some(value) => parse_compression(value).map_err(to_py_err)?,
            None => defaults.compression,
        };
        Ok(Self {
            inner: bridge::ProducerConfig {
                producer_name,
                send_timeout_ms: send_timeout_ms.unwrap_or(defaults.send_timeout_ms),
                batching_enabled: batching_enabled.unwrap_or(defaults.batching_enabled),
                max_pending_messages: max_pending_messages
                    .unwrap_or(defaults.max_pending_messages),
                compression,
            },
        })
    }

    #[getter]
    fn producer_name(&self) -> Option<String> {
        self.inner.producer_name.clone()
    }

    #[getter]
    fn send_timeout_ms(&self) -> u64 {
        self.inner.send_timeout_ms
    }

    #[getter]
    fn batching_enabled(&self) -> bool {
        self.inner.batching_enabled
    }

    #[getter]
    fn max_pending_messages(&self) -> u32 {
        self.inner.max_pending_messages
    }
}

/// Consumer settings.
#[pyclass(frozen)]
pub struct ConsumerConfiguration {
    inner: bridge::ConsumerConfig,
}

#[pymethods]
impl ConsumerConfiguration {
    #[new]
    #[pyo3(signature = (*, consumer_name=None, subscription_type=None, receiver_queue_size=None, initial_position=None, pattern_auto_discovery_period_secs=None))]
    fn new(
        consumer_name: Option<String>,
        subscription_type: Option<&str>,
        receiver_queue_size: Option<u32>,
        initial_position: Option<&str>,
        pattern_auto_discovery_period_secs: Option<u32>,
    ) -> PyResult<Self> {
        let defaults = bridge::ConsumerConfig::default();
        let subscription_type = match subscription_type {
            Some(value) => parse_subscription_type(value).map_err(to_py_err)?,
            None => defaults.subscription_type,
        };
        let initial_position = match initial_position {
            Some(value) => parse_initial_position(value).map_err(to_py_err)?,
            None => defaults.initial_position,
        };
        Ok(Self {
            inner: bridge::ConsumerConfig {
                consumer_name,
                subscription_type,
                receiver_queue_size: receiver_queue_size
                    .unwrap_or(defaults.receiver_queue_size),
                initial_position,
                pattern_auto_discovery_period_secs: pattern_auto_discovery_period_secs
                    .unwrap_or(defaults.pattern_auto_discovery_period_secs),
            },
        })
    }

    #[getter]
    fn consumer_name(&self) -> Option<String> {
        self.inner.consumer_name.clone()
    }

    #[getter]
    fn receiver_queue_size(&self) -> u32 {
        self.inner.receiver_queue_size
    }
}

/// Reader settings.
#[pyclass(frozen)]
pub struct ReaderConfiguration {
    inner: bridge::ReaderConfig,
}

#[pymethods]
impl ReaderConfiguration {
    #[new]
    #[pyo3(signature = (*, reader_name=None, receiver_queue_size=None, subscription_role_prefix=None))]
    fn new(
        reader_name: Option<String>,
        receiver_queue_size: Option<u32>,
        subscription_role_prefix: Option<String>,
    ) -> Self {
        let defaults = bridge::ReaderConfig::default();
        Self {
            inner: bridge::ReaderConfig {
                reader_name,
                receiver_queue_size: receiver_queue_size
                    .unwrap_or(defaults.receiver_queue_size),
                subscription_role_prefix,
            },
        }
    }

    #[getter]
    fn reader_name(&self) -> Option<String> {
        self.inner.reader_name.clone()
    }

    #[getter]
    fn receiver_queue_size(&self) -> u32 {
        self.inner.receiver_queue_size
    }
}

// ============================================================
// Value and handle classes
// ============================================================

/// A position in a topic.
#[pyclass(frozen, eq, skip_from_py_object)]
#[derive(Clone, PartialEq)]
pub struct MessageId {
    inner: bridge::MessageId,
}

#[pymethods]
impl MessageId {
    #[new]
    #[pyo3(signature = (ledger_id, entry_id, partition=-1, batch_index=-1))]
    fn new(ledger_id: i64, entry_id: i64, partition: i32, batch_index: i32) -> Self {
        Self {
            inner: bridge::MessageId::Position {
                ledger_id,
                entry_id,
                partition,
                batch_index,
            },
        }
    }

    /// The oldest retained message.
    #[staticmethod]
    fn earliest() -> Self {
        Self {
            inner: bridge::MessageId::Earliest,
        }
    }

    /// The next message published.
    #[staticmethod]
    fn latest() -> Self {
        Self {
            inner: bridge::MessageId::Latest,
        }
    }

    fn __repr__(&self) -> String {
        format!("MessageId({})", self.inner)
    }
}

/// A producer handle.
#[pyclass(frozen)]
pub struct Producer {
    #[pyo3(get)]
    id: u64,
    #[pyo3(get)]
    topic: String,
    #[pyo3(get)]
    producer_name: String,
}

#[pymethods]
impl Producer {
    fn __repr__(&self) -> String {
        format!(
            "Producer(id={}, topic='{}', producer_name='{}')",
            self.id, self.topic, self.producer_name
        )
    }
}

impl From<bridge::Producer> for Producer {
    fn from(handle: bridge::Producer) -> Self {
        Self {
            id: handle.id,
            topic: handle.topic,
            producer_name: handle.producer_name,
        }
    }
}

/// A consumer handle.
#[pyclass(frozen)]
pub struct Consumer {
    #[pyo3(get)]
    id: u64,
    #[pyo3(get)]
    topics: Vec<String>,
    #[pyo3(get)]
    subscription: String,
    #[pyo3(get)]
    consumer_name: String,
}

#[pymethods]
impl Consumer {
    fn __repr__(&self) -> String {
        format!(
            "Consumer(id={}, subscription='{}', topics={})",
            self.id,
            self.subscription,
            self.topics.len()
        )
    }
}

impl From<bridge::Consumer> for Consumer {
    fn from(handle: bridge::Consumer) -> Self {
        Self {
            id: handle.id,
            topics: handle.topics,
            subscription: handle.subscription,
            consumer_name: handle.consumer_name,
        }
    }
}

/// A reader handle.
#[pyclass(frozen)]
pub struct Reader {
    #[pyo3(get)]
    id: u64,
    #[pyo3(get)]
    topic: String,
    start: bridge::MessageId,
}

#[pymethods]
impl Reader {
    #[getter]
    fn start(&self) -> MessageId {
        MessageId { inner: self.start }
    }

    fn __repr__(&self) -> String {
        format!(
            "Reader(id={}, topic='{}', start={})",
            self.id, self.topic, self.start
        )
    }
}

impl From<bridge::Reader> for Reader {
    fn from(handle: bridge::Reader) -> Self {
        Self {
            id: handle.id,
            topic: handle.topic,
            start: handle.start,
        }
    }
}

// ============================================================
// Client: the main pyclass
// ============================================================

/// Blocking pulsar client.
///
/// Every method blocks until the operation completes and raises a
/// `PulsarException` subclass on failure. Usable as a context manager:
///     with Client("memory://local") as client:
///         ...
#[pyclass(frozen)]
pub struct Client {
    inner: bridge::Client,
}

#[pymethods]
impl Client {
    #[new]
    #[pyo3(signature = (service_url, config=None))]
    fn new(
        py: Python<'_>,
        service_url: &str,
        config: Option<PyRef<'_, ClientConfiguration>>,
    ) -> PyResult<Self> {
        let config = client_config_for(service_url, config.as_deref().map(|c| &c.inner));
        let inner = py
            .detach(move || bridge::Client::new(config))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Create a producer on `topic`.
    #[pyo3(signature = (topic, config=None))]
    fn create_producer(
        &self,
        py: Python<'_>,
        topic: String,
        config: Option<PyRef<'_, ProducerConfiguration>>,
    ) -> PyResult<Producer> {
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let client = self.inner.clone();
        let handle = py
            .detach(move || client.create_producer(&topic, &config))
            .map_err(to_py_err)?;
        Ok(handle.into())
    }

    /// Subscribe to `topic` under `subscription_name`.
    #[pyo3(signature = (topic, subscription_name, config=None))]
    fn subscribe(
        &self,
        py: Python<'_>,
        topic: String,
        subscription_name: String,
        config: Option<PyRef<'_, ConsumerConfiguration>>,
    ) -> PyResult<Consumer> {
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let client = self.inner.clone();
        let handle = py
            .detach(move || client.subscribe(&topic, &subscription_name, &config))
            .map_err(to_py_err)?;
        Ok(handle.into())
    }

    /// Subscribe one consumer to several topics.
    #[pyo3(signature = (topics, subscription_name, config=None))]
    fn subscribe_topics(
        &self,
        py: Python<'_>,
        topics: Vec<String>,
        subscription_name: String,
        config: Option<PyRef<'_, ConsumerConfiguration>>,
    ) -> PyResult<Consumer> {
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let client = self.inner.clone();
        let handle = py
            .detach(move || client.subscribe_topics(&topics, &subscription_name, &config))
            .map_err(to_py_err)?;
        Ok(handle.into())
    }

    /// Subscribe to every topic matching the regex `topics_pattern`.
    #[pyo3(signature = (topics_pattern, subscription_name, config=None))]
    fn subscribe_pattern(
        &self,
        py: Python<'_>,
        topics_pattern: String,
        subscription_name: String,
        config: Option<PyRef<'_, ConsumerConfiguration>>,
    ) -> PyResult<Consumer> {
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let client = self.inner.clone();
        let handle = py
            .detach(move || {
                client.subscribe_pattern(&topics_pattern, &subscription_name, &config)
            })
            .map_err(to_py_err)?;
        Ok(handle.into())
    }

    /// Create a reader on `topic` starting at `start_message_id`.
    #[pyo3(signature = (topic, start_message_id, config=None))]
    fn create_reader(
        &self,
        py: Python<'_>,
        topic: String,
        start_message_id: PyRef<'_, MessageId>,
        config: Option<PyRef<'_, ReaderConfiguration>>,
    ) -> PyResult<Reader> {
        let start = start_message_id.inner;
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let client = self.inner.clone();
        let handle = py
            .detach(move || client.create_reader(&topic, &start, &config))
            .map_err(to_py_err)?;
        Ok(handle.into())
    }

    /// Partition names of `topic`.
    fn get_topic_partitions(&self, py: Python<'_>, topic: String) -> PyResult<Vec<String>> {
        let client = self.inner.clone();
        py.detach(move || client.get_topic_partitions(&topic))
            .map_err(to_py_err)
    }

    /// Close every producer, consumer and reader, then the client.
    fn close(&self, py: Python<'_>) -> PyResult<()> {
        let client = self.inner.clone();
        py.detach(move || client.close()).map_err(to_py_err)
    }

    /// Stop immediately without waiting for anything in flight.
    fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Context manager entry, returns self.
    fn __enter__(slf: Py<Self>) -> Py<Self> {
        slf
    }

    /// Context manager exit, closes the client.
    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &self,
        py: Python<'_>,
        _exc_type: Option<Bound<'_, PyAny>>,
        _exc_val: Option<Bound<'_, PyAny>>,
        _exc_tb: Option<Bound<'_, PyAny>>,
    ) -> bool {
        let client = self.inner.clone();
        // Best-effort close, ignore errors
        let _ = py.detach(move || client.close());
        false
    }
}

// ============================================================
// Standalone functions
// ============================================================

/// Route `tracing` output to stderr.
///
/// `RUST_LOG` overrides `level`. Returns False if logging was already set up.
#[pyfunction]
#[pyo3(signature = (level="info"))]
fn init_logging(level: &str) -> bool {
    bridge::init_logging(level)
}

/// Load a `ClientConfiguration` from a TOML file.
#[pyfunction]
fn load_client_config(path: PathBuf) -> PyResult<ClientConfiguration> {
    let inner = bridge::ClientConfig::from_file(&path)
        .map_err(|e| to_py_err(e.into()))?;
    Ok(ClientConfiguration { inner })
}

// ============================================================
// Module definition
// ============================================================

#[pymodule]
fn _pulsar_blocking(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add("PulsarException", py.get_type::<PulsarException>())?;
    m.add("ConnectError", py.get_type::<ConnectError>())?;
    m.add("Timeout", py.get_type::<Timeout>())?;
    m.add("AuthenticationError", py.get_type::<AuthenticationError>())?;
    m.add("NotFound", py.get_type::<NotFound>())?;
    m.add("AlreadyClosed", py.get_type::<AlreadyClosed>())?;
    m.add("InvalidConfiguration", py.get_type::<InvalidConfiguration>())?;
    m.add("InvalidTopicName", py.get_type::<InvalidTopicName>())?;
    m.add("ConsumerBusy", py.get_type::<ConsumerBusy>())?;
    m.add("UnknownError", py.get_type::<UnknownError>())?;

    m.add_class::<Client>()?;
    m.add_class::<ClientConfiguration>()?;
    m.add_class::<ProducerConfiguration>()?;
    m.add_class::<ConsumerConfiguration>()?;
    m.add_class::<ReaderConfiguration>()?;
    m.add_class::<MessageId>()?;
    m.add_class::<Producer>()?;
    m.add_class::<Consumer>()?;
    m.add_class::<Reader>()?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(load_client_config, m)?)?;
    Ok(())
}

// ============================================================
// Tests: bridge-level only (no Python interpreter in tests)
// ============================================================
