//! In-process broker state behind [`EmbeddedClient`](super::EmbeddedClient).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blocking_types::{
    Consumer, ConsumerConfig, MessageId, Producer, ProducerConfig, Reader, ReaderConfig,
    ResultCode, Status, SubscriptionType, TopicName,
};
use dashmap::DashMap;
use regex::Regex;
use uuid::Uuid;

use super::EmbeddedConfig;

const DEFAULT_PATTERN_NAMESPACE: &str = "persistent://public/default/";

struct Subscription {
    sub_type: SubscriptionType,
    consumers: HashSet<u64>,
}

/// Topic, subscription and handle registries.
pub(crate) struct EmbeddedBroker {
    config: EmbeddedConfig,
    client_token: Option<String>,
    /// Full topic name -> partition count (0 = non-partitioned).
    topics: DashMap<String, u32>,
    producers: DashMap<u64, Producer>,
    consumers: DashMap<u64, Consumer>,
    readers: DashMap<u64, Reader>,
    subscriptions: Mutex<HashMap<(String, String), Subscription>>,
    next_id: AtomicU64,
    /// `true` once closed. Operations hold the read guard from the open
    /// check through their last registry write; close and shutdown take
    /// the write guard.
    closed: RwLock<bool>,
}

impl EmbeddedBroker {
    /// Build the broker, registering the configured topics.
    pub(crate) fn new(
        config: EmbeddedConfig,
        client_token: Option<String>,
    ) -> Result<Self, Status> {
        let topics = DashMap::new();
        for spec in &config.topics {
            let name = TopicName::parse(&spec.name).map_err(|e| {
                Status::new(
                    ResultCode::InvalidConfiguration,
                    format!("embedded topic: {}", e.message()),
                )
            })?;
            if topics.insert(name.to_string(), spec.partitions).is_some() {
                return Err(Status::new(
                    ResultCode::InvalidConfiguration,
                    format!("embedded topic '{name}' configured twice"),
                ));
            }
        }

        Ok(Self {
            config,
            client_token,
            topics,
            producers: DashMap::new(),
            consumers: DashMap::new(),
            readers: DashMap::new(),
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: RwLock::new(false),
        })
    }

    pub(crate) fn mark_closed(&self) {
        *self.closed_write() = true;
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.closed_read()
    }

    pub(crate) fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub(crate) fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub(crate) fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub(crate) fn create_producer(
        &self,
        topic: &str,
        config: &ProducerConfig,
    ) -> Result<Producer, Status> {
        let _open = self.enter()?;
        let (topic, _) = self.lookup(topic)?;

        let id = self.allocate_id();
        let name = config
            .producer_name
            .clone()
            .unwrap_or_else(|| generated_name("producer"));
        let producer = Producer::new(id, topic.to_string(), name);
        self.producers.insert(id, producer.clone());

        tracing::debug!(
            id,
            topic = %producer.topic,
            name = %producer.producer_name,
            "Producer created"
        );
        Ok(producer)
    }

    pub(crate) fn subscribe(
        &self,
        topics: &[String],
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, Status> {
        let _open = self.enter()?;
        if topics.is_empty() {
            return Err(Status::new(
                ResultCode::InvalidConfiguration,
                "at least one topic is required",
            ));
        }

        let mut resolved: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            let (topic, _) = self.lookup(topic)?;
            let name = topic.to_string();
            if !resolved.contains(&name) {
                resolved.push(name);
            }
        }

        self.attach(resolved, subscription, config)
    }

    pub(crate) fn subscribe_pattern(
        &self,
        pattern: &str,
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, Status> {
        let _open = self.enter()?;

        let (full, namespace) = qualify_pattern(pattern)?;
        let regex = Regex::new(&format!("^(?:{full})$")).map_err(|e| {
            Status::new(
                ResultCode::InvalidConfiguration,
                format!("invalid topic pattern '{pattern}': {e}"),
            )
        })?;

        let mut matched: Vec<String> = self
            .topics
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|name| name.starts_with(&namespace) && regex.is_match(name))
            .collect();
        matched.sort();

        tracing::debug!(pattern = %full, matched = matched.len(), "Pattern resolved");
        self.attach(matched, subscription, config)
    }

    pub(crate) fn create_reader(
        &self,
        topic: &str,
        start: &MessageId,
        config: &ReaderConfig,
    ) -> Result<Reader, Status> {
        let _open = self.enter()?;
        let (topic, _) = self.lookup(topic)?;

        let id = self.allocate_id();
        let reader = Reader::new(id, topic.to_string(), *start);
        self.readers.insert(id, reader.clone());

        let name = config
            .reader_name
            .clone()
            .unwrap_or_else(|| generated_name("reader"));
        tracing::debug!(id, topic = %reader.topic, %name, start = %start, "Reader created");
        Ok(reader)
    }

    pub(crate) fn partitions_for(&self, topic: &str) -> Result<Vec<String>, Status> {
        let _open = self.enter()?;
        let (topic, partitions) = self.lookup(topic)?;

        if partitions == 0 {
            return Ok(vec![topic.to_string()]);
        }
        Ok((0..partitions)
            .map(|index| topic.partition(index).to_string())
            .collect())
    }

    pub(crate) fn close(&self) -> Result<(), Status> {
        self.check_authorized()?;
        let mut closed = self.closed_write();
        if *closed {
            return Err(Status::already_closed("client"));
        }
        *closed = true;

        let producers = self.producers.len();
        let consumers = self.consumers.len();
        let readers = self.readers.len();
        self.producers.clear();
        self.consumers.clear();
        self.readers.clear();
        self.subscriptions().clear();
        drop(closed);

        tracing::info!(producers, consumers, readers, "Embedded client closed");
        Ok(())
    }

    /// Admit an operation: the returned guard keeps `close` out until the
    /// operation has registered whatever it creates.
    fn enter(&self) -> Result<RwLockReadGuard<'_, bool>, Status> {
        let closed = self.closed_read();
        if *closed {
            return Err(Status::already_closed("client"));
        }
        self.check_authorized()?;
        Ok(closed)
    }

    fn check_authorized(&self) -> Result<(), Status> {
        match &self.config.auth_token {
            Some(required) if self.client_token.as_deref() != Some(required.as_str()) => {
                Err(Status::new(
                    ResultCode::AuthenticationError,
                    "invalid or missing auth token",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Resolve `name` to a known topic and its partition count.
    fn lookup(&self, name: &str) -> Result<(TopicName, u32), Status> {
        let topic = TopicName::parse(name)?;
        let key = topic.to_string();

        if let Some(partitions) = self.topics.get(&key).map(|p| *p) {
            return Ok((topic, partitions));
        }

        if let Some(index) = topic.partition_index() {
            let parent = self.topics.get(&topic.base().to_string()).map(|p| *p);
            match parent {
                Some(count) if index < count => return Ok((topic, 0)),
                // Never auto-create a stray partition of a partitioned topic.
                Some(count) if count > 0 => {
                    return Err(Status::not_found(format!(
                        "topic '{}' has {count} partitions, no partition {index}",
                        topic.base()
                    )));
                }
                _ => {}
            }
        }

        if self.config.auto_create_topics {
            let partitions = *self.topics.entry(key).or_insert(0);
            tracing::debug!(topic = %topic, "Topic auto-created");
            return Ok((topic, partitions));
        }

        Err(Status::not_found(format!("topic '{topic}' does not exist")))
    }

    /// Attach one new consumer to `subscription` on every topic, or none.
    fn attach(
        &self,
        topics: Vec<String>,
        subscription: &str,
        config: &ConsumerConfig,
    ) -> Result<Consumer, Status> {
        if subscription.trim().is_empty() {
            return Err(Status::new(
                ResultCode::InvalidConfiguration,
                "subscription name must not be empty",
            ));
        }

        let mut subscriptions = self.subscriptions();
        for topic in &topics {
            let Some(existing) = subscriptions.get(&(topic.clone(), subscription.to_string()))
            else {
                continue;
            };
            if existing.sub_type != config.subscription_type {
                return Err(Status::new(
                    ResultCode::ConsumerBusy,
                    format!(
                        "subscription '{subscription}' on '{topic}' is {:?}, requested {:?}",
                        existing.sub_type, config.subscription_type
                    ),
                ));
            }
            if existing.sub_type == SubscriptionType::Exclusive && !existing.consumers.is_empty() {
                return Err(Status::new(
                    ResultCode::ConsumerBusy,
                    format!(
                        "exclusive subscription '{subscription}' on '{topic}' \
                         already has a consumer"
                    ),
                ));
            }
        }

        let id = self.allocate_id();
        for topic in &topics {
            subscriptions
                .entry((topic.clone(), subscription.to_string()))
                .or_insert_with(|| Subscription {
                    sub_type: config.subscription_type,
                    consumers: HashSet::new(),
                })
                .consumers
                .insert(id);
        }
        drop(subscriptions);

        let name = config
            .consumer_name
            .clone()
            .unwrap_or_else(|| generated_name("consumer"));
        let consumer = Consumer::new(id, topics, subscription, name);
        self.consumers.insert(id, consumer.clone());

        tracing::debug!(
            id,
            subscription,
            topics = consumer.topics.len(),
            "Consumer subscribed"
        );
        Ok(consumer)
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn closed_read(&self) -> RwLockReadGuard<'_, bool> {
        self.closed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn closed_write(&self) -> RwLockWriteGuard<'_, bool> {
        self.closed.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscriptions(&self) -> MutexGuard<'_, HashMap<(String, String), Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Expand a pattern to a fully-qualified one and return it with its
/// namespace prefix.
fn qualify_pattern(pattern: &str) -> Result<(String, String), Status> {
    let full = if pattern.contains("://") {
        pattern.to_string()
    } else if pattern.contains('/') {
        format!("persistent://{pattern}")
    } else {
        format!("{DEFAULT_PATTERN_NAMESPACE}{pattern}")
    };

    let namespace = full.split_once("://").and_then(|(scheme, rest)| {
        let mut parts = rest.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tenant), Some(ns), Some(_)) if !tenant.is_empty() && !ns.is_empty() => {
                Some(format!("{scheme}://{tenant}/{ns}/"))
            }
            _ => None,
        }
    });

    match namespace {
        Some(namespace) => Ok((full, namespace)),
        None => Err(Status::new(
            ResultCode::InvalidConfiguration,
            format!("topic pattern '{pattern}' must name a tenant and namespace"),
        )),
    }
}

fn generated_name(kind: &str) -> String {
    format!("{kind}-{}", Uuid::new_v4().simple())
}
