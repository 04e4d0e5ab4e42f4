//! # blocking-client
//!
//! The asynchronous client seam the blocking bindings are built on.
//!
//! ## Features
//!
//! - **[`AsyncClient`]**: callback-based operations (create producer,
//!   subscribe by topic/list/pattern, create reader, list partitions, close)
//! - **[`EmbeddedClient`]**: in-process client for `memory://` service URLs,
//!   delivering callbacks from its own I/O threads
//! - **[`MockClient`]**: scriptable test double controlling when and how
//!   often callbacks fire
//!
//! Real deployments plug a native client in behind [`AsyncClient`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod async_client;
pub mod embedded;
pub mod mock;

pub use async_client::AsyncClient;
pub use embedded::{EmbeddedClient, EmbeddedConfig, TopicSpec};
pub use mock::{Delivery, MockCall, MockClient};
