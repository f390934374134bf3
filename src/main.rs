use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gatecord::application::events::Event;
use gatecord::application::services::event_manager::listener_fn;
use gatecord::infrastructure::{AppConfig, CliArgs, HttpRestClient, StorageManager, replay_file};
use gatecord::{Client, ClientBuilder};

const TOKEN_ENV: &str = "GATECORD_TOKEN";

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_client(config: &AppConfig) -> Result<Client> {
    let mut builder = ClientBuilder::default().with_config(config.client.clone());

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        builder = builder.with_rest(Arc::new(HttpRestClient::new(&token)?));
    }

    let print_events = config.print_events;
    let client = builder
        .with_event_listener(listener_fn(move |event: &Event| {
            if print_events {
                info!(event = event.name(), sequence = event.sequence(), "Event");
            } else {
                debug!(event = event.name(), sequence = event.sequence(), "Event");
            }
        }))
        .build();

    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = gatecord::VERSION, "Starting gatecord-replay");

    let input = config
        .input
        .clone()
        .ok_or_else(|| eyre!("no input recording given"))?;
    let client = create_client(&config)?;

    let summary = replay_file(&client, &input).await?;
    info!(
        frames = summary.frames,
        dispatched = summary.dispatched,
        skipped = summary.skipped,
        malformed = summary.malformed,
        "Replay finished"
    );

    println!(
        "{} frames, {} dispatched, {} skipped, {} malformed",
        summary.frames, summary.dispatched, summary.skipped, summary.malformed
    );
    println!("{}", client.caches().stats());

    Ok(())
}
