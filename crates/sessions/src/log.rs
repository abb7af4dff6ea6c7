//! The bounded transcript and its entries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Most recent entries kept per session; older ones slide off the front.
pub const HISTORY_LIMIT: usize = 200;

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created; insertion order is the
/// transcript order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub sender: Sender,
    pub text: String,
}

impl HistoryItem {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// Append-only transcript bounded at [`HISTORY_LIMIT`] entries.
///
/// Not internally synchronized — the owning actor serializes all access.
#[derive(Debug, Default)]
pub struct SessionLog {
    items: VecDeque<HistoryItem>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the transcript, oldest first.
    pub fn read(&self) -> Vec<HistoryItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append at the end, discarding the oldest entries beyond the limit.
    /// Never rejects.
    pub fn append(&mut self, item: HistoryItem) {
        self.items.push_back(item);
        while self.items.len() > HISTORY_LIMIT {
            self.items.pop_front();
        }
    }
}
