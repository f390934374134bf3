//! Runtime options of a [`Client`](crate::application::Client).

use serde::{Deserialize, Serialize};

use crate::domain::intents::GatewayIntents;
use crate::infrastructure::cache::CacheFlags;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Client options. Cache policies are closures and are set on the
/// `ClientBuilder` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Entity categories to cache.
    #[serde(default)]
    pub cache_flags: CacheFlags,

    /// Run every listener in its own task. When off, listeners run one
    /// after another on the dispatching task.
    #[serde(default = "default_true")]
    pub async_events: bool,

    /// Dispatch a `RawEvent` ahead of the typed events of every frame.
    #[serde(default)]
    pub raw_events: bool,

    /// Intents assumed when no gateway is attached.
    #[serde(default = "GatewayIntents::non_privileged")]
    pub intents: GatewayIntents,

    #[serde(default)]
    pub log_level: LogLevel,
}

const fn default_true() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_flags: CacheFlags::default(),
            async_events: true,
            raw_events: false,
            intents: GatewayIntents::non_privileged(),
            log_level: LogLevel::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub const fn with_cache_flags(mut self, cache_flags: CacheFlags) -> Self {
        self.cache_flags = cache_flags;
        self
    }

    #[must_use]
    pub const fn with_async_events(mut self, async_events: bool) -> Self {
        self.async_events = async_events;
        self
    }

    #[must_use]
    pub const fn with_raw_events(mut self, raw_events: bool) -> Self {
        self.raw_events = raw_events;
        self
    }

    #[must_use]
    pub const fn with_intents(mut self, intents: GatewayIntents) -> Self {
        self.intents = intents;
        self
    }

    #[must_use]
    pub const fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}
