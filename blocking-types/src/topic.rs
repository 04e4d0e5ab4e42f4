//! Topic name parsing and partition naming.
//!
//! Accepted forms:
//! - `my-topic` (resolves to `persistent://public/default/my-topic`)
//! - `tenant/namespace/my-topic`
//! - `persistent://tenant/namespace/my-topic`
//! - `non-persistent://tenant/namespace/my-topic`

use std::fmt;

use crate::{ResultCode, Status};

/// Suffix joining a topic name and a partition index.
pub const PARTITION_SUFFIX: &str = "-partition-";

const DEFAULT_TENANT: &str = "public";
const DEFAULT_NAMESPACE: &str = "default";

/// Storage domain of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicDomain {
    /// Messages are persisted.
    Persistent,
    /// Messages are held in memory only.
    NonPersistent,
}

impl TopicDomain {
    fn scheme(self) -> &'static str {
        match self {
            TopicDomain::Persistent => "persistent",
            TopicDomain::NonPersistent => "non-persistent",
        }
    }
}

/// A fully-qualified topic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName {
    domain: TopicDomain,
    tenant: String,
    namespace: String,
    local_name: String,
}

impl TopicName {
    /// Parse any accepted topic form.
    pub fn parse(name: &str) -> Result<Self, Status> {
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid(name, "empty topic name"));
        }

        let (domain, rest) = match name.split_once("://") {
            Some(("persistent", rest)) => (TopicDomain::Persistent, rest),
            Some(("non-persistent", rest)) => (TopicDomain::NonPersistent, rest),
            Some((scheme, _)) => {
                return Err(invalid(name, &format!("unknown domain '{scheme}'")));
            }
            None if !name.contains('/') => {
                return Ok(Self {
                    domain: TopicDomain::Persistent,
                    tenant: DEFAULT_TENANT.to_string(),
                    namespace: DEFAULT_NAMESPACE.to_string(),
                    local_name: name.to_string(),
                });
            }
            None => (TopicDomain::Persistent, name),
        };

        let parts: Vec<&str> = rest.splitn(3, '/').collect();
        match parts.as_slice() {
            [tenant, namespace, local]
                if !tenant.is_empty() && !namespace.is_empty() && !local.is_empty() =>
            {
                if local.contains('/') {
                    return Err(invalid(name, "topic name has too many segments"));
                }
                Ok(Self {
                    domain,
                    tenant: tenant.to_string(),
                    namespace: namespace.to_string(),
                    local_name: local.to_string(),
                })
            }
            _ => Err(invalid(name, "expected tenant/namespace/topic")),
        }
    }

    /// Storage domain.
    pub fn domain(&self) -> TopicDomain {
        self.domain
    }

    /// Tenant segment.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Namespace segment.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Last segment, including any partition suffix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// `domain://tenant/namespace/`, the prefix shared by all topics of
    /// this namespace.
    pub fn namespace_prefix(&self) -> String {
        format!(
            "{}://{}/{}/",
            self.domain.scheme(),
            self.tenant,
            self.namespace
        )
    }

    /// Name of partition `index` of this topic.
    pub fn partition(&self, index: u32) -> TopicName {
        Self {
            local_name: format!("{}{}{}", self.local_name, PARTITION_SUFFIX, index),
            ..self.clone()
        }
    }

    /// Partition index, if this name refers to a single partition.
    pub fn partition_index(&self) -> Option<u32> {
        let (_, index) = self.local_name.rsplit_once(PARTITION_SUFFIX)?;
        index.parse().ok()
    }

    /// The partitioned topic this partition belongs to (or `self`).
    pub fn base(&self) -> TopicName {
        match self.local_name.rsplit_once(PARTITION_SUFFIX) {
            Some((base, index)) if index.parse::<u32>().is_ok() => Self {
                local_name: base.to_string(),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace_prefix(), self.local_name)
    }
}

fn invalid(name: &str, reason: &str) -> Status {
    Status::new(
        ResultCode::InvalidTopicName,
        format!("invalid topic name '{name}': {reason}"),
    )
}
