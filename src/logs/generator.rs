use super::{LogEntry, LogLevel, LogTags};
use crate::rng::SimRng;

const SENDERS: [&str; 4] = ["DAQ-Controller", "Detector-Readout", "Storage-Writer", "System"];

const TOPICS: [&str; 5] = ["lifecycle", "data", "config", "heartbeat", "error"];

/// Wire-level subscription topics mirrored into the synthetic stream.
pub const SUBSCRIPTION_TOPICS: [&str; 4] = ["CTRL", "FSM", "LINK", "MNTR"];

const DEBUG_MESSAGES: [&str; 4] = [
    "Heartbeat received",
    "Config applied",
    "Buffer flushed",
    "Sequence updated",
];
const INFO_MESSAGES: [&str; 4] = [
    "State transition: new -> initialized",
    "Run started",
    "Run stopped",
    "Satellite connected",
];
const WARNING_MESSAGES: [&str; 3] = [
    "High memory usage",
    "Retry attempt 2/3",
    "Slow response from Storage-Writer",
];
const ERROR_MESSAGES: [&str; 4] = [
    "Connection timeout",
    "Invalid sequence",
    "Disk full",
    "Heartbeat missed",
];

const TAG_FILES: [&str; 2] = [
    "constellation/satellite/FSM.cpp",
    "constellation/ctrl/Controller.cpp",
];
const TAG_FUNCS: [&str; 3] = [
    "call_satellite_function",
    "handle_transition",
    "process_message",
];

const TAG_SAMPLE_PERCENT: f32 = 30.0;

/// Synthesizes log entries with the production level mix: 60% info,
/// 25% debug, 10% warning, 5% error.
#[derive(Debug)]
pub struct LogGenerator {
    next_id: u64,
}

impl LogGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    fn weighted_level(rng: &mut SimRng) -> LogLevel {
        let r = rng.next_f32();
        if r < 0.60 {
            LogLevel::Info
        } else if r < 0.85 {
            LogLevel::Debug
        } else if r < 0.95 {
            LogLevel::Warning
        } else {
            LogLevel::Error
        }
    }

    fn message_for(level: LogLevel, rng: &mut SimRng) -> &'static str {
        match level {
            LogLevel::Debug => *rng.pick(&DEBUG_MESSAGES),
            LogLevel::Info => *rng.pick(&INFO_MESSAGES),
            LogLevel::Warning => *rng.pick(&WARNING_MESSAGES),
            LogLevel::Error => *rng.pick(&ERROR_MESSAGES),
        }
    }

    fn diagnostic_tags(rng: &mut SimRng) -> LogTags {
        LogTags {
            filename: (*rng.pick(&TAG_FILES)).to_string(),
            funcname: (*rng.pick(&TAG_FUNCS)).to_string(),
            lineno: 300 + rng.next_below(200) as u32,
            thread: 60_000 + rng.next_below(10_000) as u32,
        }
    }

    /// Produce the next synthetic entry.
    pub fn generate(&mut self, now_ms: u64, rng: &mut SimRng) -> LogEntry {
        self.next_id += 1;
        let level = Self::weighted_level(rng);

        let mut topics: Vec<&str> = Vec::with_capacity(TOPICS.len() + SUBSCRIPTION_TOPICS.len());
        topics.extend_from_slice(&TOPICS);
        topics.extend_from_slice(&SUBSCRIPTION_TOPICS);

        // Errors always carry source tags; the rest are sampled.
        let tags = if level == LogLevel::Error || rng.chance(TAG_SAMPLE_PERCENT) {
            Some(Self::diagnostic_tags(rng))
        } else {
            None
        };

        LogEntry {
            id: self.next_id,
            timestamp_ms: now_ms,
            level,
            sender: (*rng.pick(&SENDERS)).to_string(),
            topic: (*rng.pick(&topics)).to_string(),
            message: Self::message_for(level, rng).to_string(),
            tags,
        }
    }
}

impl Default for LogGenerator {
    fn default() -> Self {
        Self::new()
    }
}
