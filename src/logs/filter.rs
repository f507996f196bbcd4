use super::{LogEntry, LogLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Active inclusion rules for the observatory stream.
///
/// Empty sender/topic sets admit everything; that convention lets a
/// fresh filter pass the whole stream through. All conditions are AND-ed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFilters {
    /// `None` means "all levels".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    pub senders: BTreeSet<String>,
    pub topics: BTreeSet<String>,
    pub search: String,
    /// Per-sender, per-topic minimum severity overrides.
    pub sender_topic_levels: BTreeMap<String, BTreeMap<String, LogLevel>>,
}

impl LogFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the filter admits every entry.
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.senders.is_empty()
            && self.topics.is_empty()
            && self.search.is_empty()
            && self.sender_topic_levels.is_empty()
    }

    fn minimum_level_for(&self, sender: &str, topic: &str) -> Option<LogLevel> {
        self.sender_topic_levels
            .get(sender)
            .and_then(|topics| topics.get(topic))
            .copied()
    }

    /// Evaluate every active condition against one entry.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if !self.senders.is_empty() && !self.senders.contains(&entry.sender) {
            return false;
        }
        if !self.topics.is_empty() && !self.topics.contains(&entry.topic) {
            return false;
        }
        if let Some(minimum) = self.minimum_level_for(&entry.sender, &entry.topic) {
            if entry.level < minimum {
                return false;
            }
        }
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let in_message = entry.message.to_lowercase().contains(&needle);
            let in_sender = entry.sender.to_lowercase().contains(&needle);
            if !in_message && !in_sender {
                return false;
            }
        }
        true
    }
}
