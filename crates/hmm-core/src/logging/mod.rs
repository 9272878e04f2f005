//! Subscriber setup for the `hmm` binary.
//!
//! The library only emits `tracing` events; nothing in it installs a
//! subscriber. stdout carries command payloads, so all log output goes to
//! stderr, either human-readable or as JSON lines.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// A full `RUST_LOG` directive set (e.g. `hmm_core::inference=debug`) is
/// honoured as-is; otherwise `config.level` applies to this crate and the
/// binary. Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                registry.with(layer).try_init()
            } else {
                registry.with(layer.without_time()).try_init()
            }
        }
        LogFormat::Jsonl => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.is_ok()
}

fn default_directives(level: LogLevel) -> String {
    format!("hmm_core={level},hmm={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(LogLevel::Debug), "hmm_core=debug,hmm=debug");
        assert!(EnvFilter::try_new(default_directives(LogLevel::Off)).is_ok());
    }

    #[test]
    fn test_second_init_is_rejected() {
        let config = LogConfig::default().with_level(LogLevel::Off);
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
