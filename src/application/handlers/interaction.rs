use tracing::warn;

use crate::application::Client;
use crate::application::events::{EventKind, InteractionCreate};
use crate::application::services::entity_builder::CacheStrategy;
use crate::infrastructure::discord::dto::InteractionPayload;

/// Gateway-delivered interactions are answered over REST, so they carry no
/// responder.
pub(super) fn interaction_create(
    client: &Client,
    _sequence: u64,
    payload: InteractionPayload,
) -> Vec<EventKind> {
    match client
        .entity_builder()
        .create_interaction(&payload, CacheStrategy::Yes)
    {
        Ok(interaction) => vec![
            InteractionCreate {
                interaction,
                responder: None,
            }
            .into(),
        ],
        Err(e) => {
            warn!(interaction_id = %payload.id, error = %e, "Dropping interaction");
            Vec::new()
        }
    }
}
