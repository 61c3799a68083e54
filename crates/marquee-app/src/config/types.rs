//! Configuration types for matrix-marquee
//!
//! Defines:
//! - `Settings` - The whole settings file
//! - One struct per `[section]`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use marquee_core::MAX_MESSAGE_CHARS;
use marquee_daemon::RenderConfig;

use crate::arbiter::ArbiterSettings;
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub schedule: ScheduleSettings,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Timing knobs for the arbiter
    pub fn arbiter_settings(&self) -> ArbiterSettings {
        ArbiterSettings {
            tick: self.schedule.tick(),
            demo_timeout: self.schedule.demo_timeout(),
            demo_attempts: self.schedule.demo_attempts,
            backoff_initial: Duration::from_millis(self.schedule.backoff_initial_ms),
            backoff_max: Duration::from_secs(self.schedule.backoff_max_secs),
        }
    }
}

/// HTTP intake settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            workers: default_workers(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_workers() -> usize {
    1
}

/// Message queue settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueueSettings {
    /// Requests that may wait for the display
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Longer messages are cut to this many characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_max_message_chars() -> usize {
    MAX_MESSAGE_CHARS
}

/// Arbitration timing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// A demo is replaced once it has run this long
    #[serde(default = "default_demo_timeout_secs")]
    pub demo_timeout_secs: u64,

    /// Demo selections tried per start before backing off
    #[serde(default = "default_demo_attempts")]
    pub demo_attempts: u32,

    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,

    /// How long to wait for a killed renderer to be reaped
    #[serde(default = "default_terminate_timeout_ms")]
    pub terminate_timeout_ms: u64,
}

impl ScheduleSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn demo_timeout(&self) -> Duration {
        Duration::from_secs(self.demo_timeout_secs)
    }

    pub fn terminate_timeout(&self) -> Duration {
        Duration::from_millis(self.terminate_timeout_ms)
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            demo_timeout_secs: default_demo_timeout_secs(),
            demo_attempts: default_demo_attempts(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_secs: default_backoff_max_secs(),
            terminate_timeout_ms: default_terminate_timeout_ms(),
        }
    }
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_demo_timeout_secs() -> u64 {
    30
}

fn default_demo_attempts() -> u32 {
    6
}

fn default_backoff_initial_ms() -> u64 {
    1000
}

fn default_backoff_max_secs() -> u64 {
    60
}

fn default_terminate_timeout_ms() -> u64 {
    2000
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Overrides the platform log directory
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
        assert_eq!(settings.server.workers, 1);
        assert_eq!(settings.queue.capacity, 10);
        assert_eq!(settings.queue.max_message_chars, 250);
        assert_eq!(settings.schedule.tick(), Duration::from_secs(1));
        assert_eq!(settings.schedule.demo_timeout(), Duration::from_secs(30));
        assert_eq!(settings.schedule.terminate_timeout(), Duration::from_secs(2));
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn test_arbiter_settings_from_schedule() {
        let mut settings = Settings::default();
        settings.schedule.tick_ms = 250;
        settings.schedule.backoff_max_secs = 5;

        let arbiter = settings.arbiter_settings();
        assert_eq!(arbiter.tick, Duration::from_millis(250));
        assert_eq!(arbiter.demo_timeout, Duration::from_secs(30));
        assert_eq!(arbiter.demo_attempts, 6);
        assert_eq!(arbiter.backoff_initial, Duration::from_secs(1));
        assert_eq!(arbiter.backoff_max, Duration::from_secs(5));
    }

    #[test]
    fn test_default_arbiter_settings_agree() {
        assert_eq!(Settings::default().arbiter_settings(), ArbiterSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[queue]
capacity = 3

[render.hardware]
chain = 1
"#,
        )
        .unwrap();

        assert_eq!(settings.queue.capacity, 3);
        assert_eq!(settings.queue.max_message_chars, 250);
        assert_eq!(settings.render.hardware.chain, 1);
        assert_eq!(settings.render.hardware.rows, 32);
        assert_eq!(settings.server, ServerSettings::default());
    }
}
