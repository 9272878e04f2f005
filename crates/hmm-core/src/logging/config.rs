//! Logging settings.
//!
//! Sources, lowest to highest precedence: `[log]` table in the engine
//! config file, `HMM_LOG` / `HMM_LOG_FORMAT` (or `RUST_LOG` for the level),
//! then `--log-level` / `--log-format` on the command line.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "pretty" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Minimum level emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    /// Per-iteration Baum-Welch progress.
    Debug,
    #[default]
    Info,
    /// Likelihood decreases and degenerate sequences.
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        f.write_str(name)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Subscriber settings; the `[log]` table of the engine config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Timestamps on human output.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Layer environment and CLI overrides on top of `self`.
    pub fn with_overrides(mut self, cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        if let Some(level) = env_level() {
            self.level = level;
        }
        if let Some(format) = std::env::var("HMM_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse::<LogFormat>().ok())
        {
            self.format = format;
        }
        if let Some(level) = cli_level {
            self.level = level;
        }
        if let Some(format) = cli_format {
            self.format = format;
        }
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }
}

// HMM_LOG wins over RUST_LOG; RUST_LOG only counts when it is a bare level.
fn env_level() -> Option<LogLevel> {
    if let Ok(val) = std::env::var("HMM_LOG") {
        return val.parse().ok();
    }
    std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_level_parse_and_display() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Off,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::OFF);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = LogConfig::default().with_overrides(Some(LogLevel::Error), Some(LogFormat::Jsonl));
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Jsonl);
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: LogConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Human);
        assert!(config.timestamps);
    }
}
