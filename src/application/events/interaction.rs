use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::domain::entities::{Interaction, InteractionResponse};
use crate::domain::errors::InteractionError;

/// One-shot reply slot for an interaction delivered over HTTP.
///
/// Clones share the slot, so only the first `respond` across all listeners
/// wins.
#[derive(Debug, Clone)]
pub struct InteractionResponder {
    slot: Arc<Mutex<Option<oneshot::Sender<InteractionResponse>>>>,
}

impl InteractionResponder {
    #[must_use]
    pub fn new(reply: oneshot::Sender<InteractionResponse>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(reply))),
        }
    }

    /// Sends the response. A dropped receiver still consumes the slot.
    pub fn respond(&self, response: InteractionResponse) -> Result<(), InteractionError> {
        let sender = self
            .slot
            .lock()
            .take()
            .ok_or(InteractionError::AlreadyReplied)?;
        // The HTTP side may have timed out and dropped its receiver.
        let _ = sender.send(response);
        Ok(())
    }

    #[must_use]
    pub fn has_replied(&self) -> bool {
        self.slot.lock().is_none()
    }
}

#[derive(Debug, Clone)]
pub struct InteractionCreate {
    pub interaction: Arc<Interaction>,
    /// Present only for interactions received through `handle_http`.
    pub responder: Option<InteractionResponder>,
}

impl InteractionCreate {
    /// Replies through the HTTP channel the interaction arrived on.
    ///
    /// # Errors
    ///
    /// `NoResponder` for gateway-delivered interactions, `AlreadyReplied`
    /// when a response was already sent.
    pub fn respond(&self, response: InteractionResponse) -> Result<(), InteractionError> {
        self.responder
            .as_ref()
            .ok_or(InteractionError::NoResponder)?
            .respond(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_reply_is_rejected() {
        let (tx, rx) = oneshot::channel();
        let responder = InteractionResponder::new(tx);
        let shared = responder.clone();

        assert!(responder.respond(InteractionResponse::deferred()).is_ok());
        assert!(shared.has_replied());
        assert!(matches!(
            shared.respond(InteractionResponse::pong()),
            Err(InteractionError::AlreadyReplied)
        ));

        let response = rx.await.unwrap();
        assert_eq!(response, InteractionResponse::deferred());
    }

    #[test]
    fn test_closed_receiver_still_consumes_slot() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let responder = InteractionResponder::new(tx);

        assert!(responder.respond(InteractionResponse::pong()).is_ok());
        assert!(responder.has_replied());
    }
}
