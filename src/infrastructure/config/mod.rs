//! Client and replay configuration.

pub mod app_config;
pub mod args;
pub mod client_config;
pub mod storage;

pub use app_config::AppConfig;
pub use args::CliArgs;
pub use client_config::{ClientConfig, LogLevel};
pub use storage::{ConfigError, StorageManager};
