//! Replays recorded gateway frames, one JSON frame per line.

use std::path::Path;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, trace, warn};

use crate::application::Client;
use crate::infrastructure::discord::gateway::{GatewayOpcode, GatewayPayload};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay input: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub dispatched: usize,
    /// Frames with an opcode other than dispatch.
    pub skipped: usize,
    pub malformed: usize,
}

/// Replays the frames in the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub async fn replay_file(client: &Client, path: &Path) -> Result<ReplaySummary, ReplayError> {
    let file = File::open(path).await?;
    debug!(path = %path.display(), "Replaying gateway recording");
    replay(client, BufReader::new(file)).await
}

/// Feeds every dispatch frame read from `reader` through
/// [`Client::handle_gateway`], in order. Blank lines are ignored and lines
/// that are not frames are logged and skipped.
///
/// # Errors
///
/// Returns an error if reading fails.
pub async fn replay<R>(client: &Client, reader: R) -> Result<ReplaySummary, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_number = 0_usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.frames += 1;

        let frame = match serde_json::from_str::<GatewayPayload>(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping malformed frame");
                summary.malformed += 1;
                continue;
            }
        };

        match (GatewayOpcode::from_u8(frame.op), frame.t.as_deref()) {
            (Some(GatewayOpcode::Dispatch), Some(event_type)) => {
                let sequence = frame.s.unwrap_or_default();
                trace!(event_type, sequence, "Replaying dispatch");
                // re-encoding a parsed value cannot fail
                let payload = serde_json::to_vec(&frame.d).unwrap_or_default();
                client.handle_gateway(event_type, sequence, &payload).await;
                summary.dispatched += 1;
            }
            (opcode, _) => {
                debug!(line = line_number, opcode = ?opcode, "Unhandled opcode");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::application::events::Event;
    use crate::application::services::event_manager::listener_fn;
    use crate::infrastructure::config::ClientConfig;

    const RECORDING: &str = r#"
{"op":10,"d":{"heartbeat_interval":41250}}
{"op":0,"t":"READY","s":1,"d":{"v":10,"user":{"id":"1","username":"me"},"guilds":[],"session_id":"abc"}}
not a frame
{"op":11}

{"op":0,"t":"RESUMED","s":2,"d":null}
"#;

    fn recording_client() -> (Client, Arc<Mutex<Vec<(&'static str, u64)>>>) {
        let client = Client::builder()
            .with_config(ClientConfig::default().with_async_events(false))
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.add_event_listeners([listener_fn(move |event: &Event| {
            sink.lock().push((event.name(), event.sequence()));
        })]);
        (client, seen)
    }

    #[tokio::test]
    async fn test_replay_dispatches_in_order() {
        let (client, seen) = recording_client();

        let summary = replay(&client, RECORDING.as_bytes()).await.unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                frames: 5,
                dispatched: 2,
                skipped: 2,
                malformed: 1,
            }
        );
        assert_eq!(
            *seen.lock(),
            vec![("Ready", 1), ("GuildsReady", 1), ("Resumed", 2)]
        );
    }

    #[tokio::test]
    async fn test_replay_file() {
        let (client, seen) = recording_client();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RECORDING.as_bytes()).unwrap();

        let summary = replay_file(&client, file.path()).await.unwrap();

        assert_eq!(summary.dispatched, 2);
        assert_eq!(seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let (client, _) = recording_client();
        let dir = tempfile::tempdir().unwrap();

        let result = replay_file(&client, &dir.path().join("missing.ndjson")).await;

        assert!(matches!(result, Err(ReplayError::Io(_))));
    }
}
