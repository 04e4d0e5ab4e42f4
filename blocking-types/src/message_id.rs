//! Message positions used as reader start points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a topic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageId {
    /// The oldest retained message.
    Earliest,
    /// The next message published after the reader attaches.
    #[default]
    Latest,
    /// A concrete stored message.
    Position {
        /// Ledger holding the entry.
        ledger_id: i64,
        /// Entry within the ledger.
        entry_id: i64,
        /// Partition index, `-1` for non-partitioned topics.
        partition: i32,
        /// Index within a batch, `-1` when not batched.
        batch_index: i32,
    },
}

impl MessageId {
    /// A non-batched position on a non-partitioned topic.
    pub fn new(ledger_id: i64, entry_id: i64) -> Self {
        MessageId::Position {
            ledger_id,
            entry_id,
            partition: -1,
            batch_index: -1,
        }
    }

    /// Whether this is one of the symbolic positions.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, MessageId::Earliest | MessageId::Latest)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Earliest => f.write_str("earliest"),
            MessageId::Latest => f.write_str("latest"),
            MessageId::Position {
                ledger_id,
                entry_id,
                partition,
                batch_index,
            } => write!(f, "({ledger_id},{entry_id},{partition},{batch_index})"),
        }
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({self})")
    }
}
