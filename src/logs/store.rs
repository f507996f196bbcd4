use super::{LogEntry, LogFilters};
use crate::config::MAX_LOG_ENTRIES;
use std::collections::VecDeque;

/// Bounded observatory log buffer with rate bookkeeping.
///
/// Holds at most `MAX_LOG_ENTRIES`; appending beyond capacity evicts the
/// oldest entry so ordering is preserved end to end.
#[derive(Debug)]
pub struct LogStore {
    entries: VecDeque<LogEntry>,
    rate_count: u64,
    rate_baseline_ms: u64,
    messages_per_minute: u64,
}

impl LogStore {
    pub fn new(now_ms: u64) -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            rate_count: 0,
            rate_baseline_ms: now_ms,
            messages_per_minute: 0,
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.rate_count += 1;
    }

    /// Drop all entries and restart the rate baseline.
    pub fn clear(&mut self, now_ms: u64) {
        self.entries.clear();
        self.rate_count = 0;
        self.rate_baseline_ms = now_ms;
        self.messages_per_minute = 0;
        tracing::debug!("log store cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn filtered(&self, filters: &LogFilters) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect()
    }

    /// Recompute messages-per-minute from the count since the last
    /// baseline. With no measurable elapsed time the raw count stands in.
    pub fn recompute_rate(&mut self, now_ms: u64) -> u64 {
        let elapsed_minutes = now_ms.saturating_sub(self.rate_baseline_ms) as f64 / 60_000.0;
        self.messages_per_minute = if elapsed_minutes > 0.0 {
            (self.rate_count as f64 / elapsed_minutes).round() as u64
        } else {
            self.rate_count
        };
        self.messages_per_minute
    }

    pub fn messages_per_minute(&self) -> u64 {
        self.messages_per_minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogLevel;

    fn entry(id: u64) -> LogEntry {
        LogEntry {
            id,
            timestamp_ms: id,
            level: LogLevel::Info,
            sender: "System".to_string(),
            topic: "data".to_string(),
            message: "Run started".to_string(),
            tags: None,
        }
    }

    #[test]
    fn test_capacity_evicts_oldest_preserving_order() {
        let mut store = LogStore::new(0);
        for id in 1..=1200 {
            store.append(entry(id));
        }
        assert_eq!(store.len(), MAX_LOG_ENTRIES);

        let ids: Vec<u64> = store.entries().map(|e| e.id).collect();
        assert_eq!(ids.first(), Some(&201));
        assert_eq!(ids.last(), Some(&1200));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_clear_resets_entries_and_rate() {
        let mut store = LogStore::new(0);
        for id in 1..=10 {
            store.append(entry(id));
        }
        store.recompute_rate(60_000);
        assert!(store.messages_per_minute() > 0);

        store.clear(60_000);
        assert!(store.is_empty());
        assert_eq!(store.messages_per_minute(), 0);
        // Fresh baseline: rate reflects only post-clear traffic.
        store.append(entry(11));
        assert_eq!(store.recompute_rate(120_000), 1);
    }

    #[test]
    fn test_rate_per_minute() {
        let mut store = LogStore::new(0);
        for id in 1..=30 {
            store.append(entry(id));
        }
        // 30 messages over 30 seconds is 60 per minute.
        assert_eq!(store.recompute_rate(30_000), 60);
        // Over two minutes the same traffic averages down.
        assert_eq!(store.recompute_rate(120_000), 15);
    }

    #[test]
    fn test_rate_with_no_elapsed_time_falls_back_to_count() {
        let mut store = LogStore::new(5_000);
        for id in 1..=7 {
            store.append(entry(id));
        }
        assert_eq!(store.recompute_rate(5_000), 7);
    }
}
