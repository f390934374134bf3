//! Configuration of the replay binary.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use super::client_config::ClientConfig;
use crate::infrastructure::cache::CacheFlags;

const APP_NAME: &str = "gatecord";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Recorded gateway frames to replay.
    #[serde(skip)]
    pub input: Option<PathBuf>,

    /// Print every dispatched event at info level.
    #[serde(default)]
    pub print_events: bool,

    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.client.log_level = log_level;
        }
        if let Some(print_events) = args.print_events {
            self.print_events = print_events;
        }
        if let Some(raw_events) = args.raw_events {
            self.client.raw_events = raw_events;
        }
        if let Some(async_events) = args.async_events {
            self.client.async_events = async_events;
        }
        if let Some(cache_messages) = args.cache_messages {
            self.client
                .cache_flags
                .set(CacheFlags::MESSAGES, cache_messages);
        }
        self.input = Some(args.input);
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("gatecord.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}
