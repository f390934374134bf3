use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("interaction was already replied to")]
    AlreadyReplied,

    /// The interaction arrived over the gateway; reply through REST instead.
    #[error("interaction has no attached responder")]
    NoResponder,
}
