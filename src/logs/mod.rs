//! Observatory log stream: entry model, bounded store, filtering, and
//! the synthetic feed standing in for a real log transport.

pub mod filter;
pub mod generator;
pub mod store;

pub use filter::LogFilters;
pub use generator::LogGenerator;
pub use store::LogStore;

use serde::{Deserialize, Serialize};

/// Severity, ordered debug < info < warning < error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level `{0}`, expected debug|info|warning|error")]
pub struct ParseLevelError(String);

impl core::str::FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Diagnostic source tags, attached to every error entry and a sample of
/// the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTags {
    pub filename: String,
    pub funcname: String,
    pub lineno: u32,
    pub thread: u32,
}

/// One immutable entry in the observatory stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub sender: String,
    pub topic: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<LogTags>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_entry_serialization_omits_empty_tags() {
        let entry = LogEntry {
            id: 1,
            timestamp_ms: 0,
            level: LogLevel::Info,
            sender: "System".to_string(),
            topic: "lifecycle".to_string(),
            message: "Run started".to_string(),
            tags: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("tags"));
        assert!(json.contains("\"level\":\"info\""));
    }
}
