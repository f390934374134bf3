//! Infrastructure layer: entity cache, configuration, wire formats and
//! adapters.

/// Entity cache.
pub mod cache;
/// Client and replay configuration.
pub mod config;
/// Wire payloads, gateway catalog and the REST adapter.
pub mod discord;
/// Recorded gateway frame replay.
pub mod replay;

pub use cache::{CacheFlags, CachePolicy, Caches};
pub use config::{AppConfig, CliArgs, ClientConfig, LogLevel, StorageManager};
pub use discord::HttpRestClient;
pub use replay::{ReplayError, ReplaySummary, replay, replay_file};
