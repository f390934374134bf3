use super::client_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gatecord-replay",
    version,
    about = "Replays recorded gateway frames through the gatecord dispatch core",
    long_about = None
)]
pub struct CliArgs {
    /// NDJSON file with one gateway frame per line.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "GATECORD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Print every dispatched event.
    #[arg(long)]
    pub print_events: Option<bool>,

    /// Dispatch raw events ahead of typed ones.
    #[arg(long)]
    pub raw_events: Option<bool>,

    /// Run each listener in its own task.
    #[arg(long)]
    pub async_events: Option<bool>,

    /// Cache messages (off by default).
    #[arg(long)]
    pub cache_messages: Option<bool>,
}
