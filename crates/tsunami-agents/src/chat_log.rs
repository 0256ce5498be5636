//! Bounded chat log shared by every agent in the process.
//!
//! The only shared mutable state between agents. The lock is held for a
//! single push or read, never across an await point.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

/// Entries kept before the oldest is evicted.
pub const CHAT_LOG_CAPACITY: usize = 25;

/// One line an agent posted to game chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub agent: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Ring buffer of recent chat lines. Clone the [`SharedChatLog`] handle to
/// share it between runners.
#[derive(Debug)]
pub struct ChatLog {
    entries: Mutex<VecDeque<ChatEntry>>,
    capacity: usize,
}

pub type SharedChatLog = Arc<ChatLog>;

impl Default for ChatLog {
    fn default() -> Self {
        Self::with_capacity(CHAT_LOG_CAPACITY)
    }
}

impl ChatLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn shared() -> SharedChatLog {
        Arc::new(Self::default())
    }

    /// A panicking writer cannot leave the deque half-updated, so a poisoned
    /// lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, agent: impl Into<String>, message: impl Into<String>) {
        let entry = ChatEntry {
            agent: agent.into(),
            message: message.into(),
            at: Utc::now(),
        };
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ChatEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
