//! Listener registry and the dispatch boundary.
//!
//! Wire frames enter through [`EventManager::handle_gateway`] or
//! [`EventManager::handle_http`], are decoded and handled by the registry in
//! `application::handlers`, and every resulting event is delivered to each
//! listener. A panic in a handler or a listener is caught and logged; it
//! never reaches the receive loop or other listeners.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::FutureExt;
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

use crate::application::Client;
use crate::application::events::{Event, EventKind, InteractionCreate, InteractionResponder, RawEvent};
use crate::application::handlers;
use crate::application::services::entity_builder::CacheStrategy;
use crate::domain::entities::{InteractionKind, InteractionResponse};
use crate::infrastructure::discord::dto::InteractionPayload;
use crate::infrastructure::discord::gateway::GatewayEventType;

/// Receives every dispatched event.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: Event);
}

/// Adapts a synchronous closure into a listener.
pub struct ListenerFn<F>(F);

#[async_trait]
impl<F> EventListener for ListenerFn<F>
where
    F: Fn(&Event) + Send + Sync,
{
    async fn on_event(&self, event: Event) {
        (self.0)(&event);
    }
}

/// Wraps `f` as a shareable listener.
pub fn listener_fn<F>(f: F) -> Arc<dyn EventListener>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(ListenerFn(f))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "Unknown panic"
    }
}

pub struct EventManager {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
    async_events: bool,
    raw_events: bool,
}

impl EventManager {
    #[must_use]
    pub fn new(async_events: bool, raw_events: bool) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            async_events,
            raw_events,
        }
    }

    pub fn add_event_listeners<I>(&self, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn EventListener>>,
    {
        self.listeners.write().extend(listeners);
    }

    /// Removes listeners by identity.
    pub fn remove_event_listeners(&self, listeners: &[Arc<dyn EventListener>]) {
        self.listeners
            .write()
            .retain(|registered| !listeners.iter().any(|l| Arc::ptr_eq(registered, l)));
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Delivers `event` to every listener.
    ///
    /// In async mode each listener runs in its own task and this returns
    /// once the tasks are spawned. Otherwise listeners run in registration
    /// order before this returns.
    pub async fn dispatch(&self, event: Event) {
        let listeners = self.listeners.read().clone();
        trace!(event = event.name(), listeners = listeners.len(), "Dispatching event");

        for (index, listener) in listeners.into_iter().enumerate() {
            let event = event.clone();
            if self.async_events {
                tokio::spawn(run_listener(index, listener, event));
            } else {
                run_listener(index, listener, event).await;
            }
        }
    }

    /// Decodes and handles one gateway frame and dispatches the resulting
    /// events in handler order.
    pub async fn handle_gateway(
        &self,
        client: &Client,
        event_type: &str,
        sequence: u64,
        payload: &[u8],
    ) {
        if self.raw_events {
            let raw = RawEvent {
                event_type: event_type.to_string(),
                payload: Bytes::copy_from_slice(payload),
            };
            self.dispatch(Event::new(client.clone(), sequence, raw)).await;
        }

        let Some(tag) = GatewayEventType::from_tag(event_type) else {
            debug!(event_type, sequence, "No handler for gateway event");
            return;
        };

        let handled =
            std::panic::catch_unwind(AssertUnwindSafe(|| handlers::handle(client, tag, sequence, payload)));

        let kinds = match handled {
            Ok(Ok(kinds)) => kinds,
            Ok(Err(e)) => {
                warn!(event_type = %tag, sequence, error = %e, "Failed to decode gateway event");
                return;
            }
            Err(panic) => {
                error!(
                    event_type = %tag,
                    sequence,
                    panic = panic_message(panic.as_ref()),
                    "Gateway event handler panicked"
                );
                return;
            }
        };

        for kind in kinds {
            self.dispatch(Event::new(client.clone(), sequence, kind)).await;
        }
    }

    /// Handles an interaction delivered over HTTP. Pings are answered with a
    /// pong before any listener runs; everything else is dispatched with a
    /// responder bound to `reply`.
    pub async fn handle_http(
        &self,
        client: &Client,
        reply: oneshot::Sender<InteractionResponse>,
        payload: &[u8],
    ) {
        let interaction: InteractionPayload = match serde_json::from_slice(payload) {
            Ok(interaction) => interaction,
            Err(e) => {
                warn!(error = %e, "Failed to decode HTTP interaction");
                return;
            }
        };

        if interaction.kind == InteractionKind::Ping as u8 {
            if reply.send(InteractionResponse::pong()).is_err() {
                debug!("HTTP interaction receiver dropped before pong");
            }
            return;
        }

        let built = std::panic::catch_unwind(AssertUnwindSafe(|| {
            client
                .entity_builder()
                .create_interaction(&interaction, CacheStrategy::Yes)
        }));

        let interaction = match built {
            Ok(Ok(interaction)) => interaction,
            Ok(Err(e)) => {
                warn!(error = %e, "Dropping HTTP interaction");
                return;
            }
            Err(panic) => {
                error!(panic = panic_message(panic.as_ref()), "HTTP interaction handler panicked");
                return;
            }
        };

        let kind = EventKind::from(InteractionCreate {
            interaction,
            responder: Some(InteractionResponder::new(reply)),
        });
        self.dispatch(Event::new(client.clone(), 0, kind)).await;
    }
}

async fn run_listener(index: usize, listener: Arc<dyn EventListener>, event: Event) {
    let name = event.name();
    if let Err(panic) = AssertUnwindSafe(listener.on_event(event))
        .catch_unwind()
        .await
    {
        error!(
            listener = index,
            event = name,
            panic = panic_message(panic.as_ref()),
            "Event listener panicked"
        );
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listener_count())
            .field("async_events", &self.async_events)
            .field("raw_events", &self.raw_events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_panic_message_downcasts() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "Unknown panic");
    }

    #[test]
    fn test_remove_by_identity() {
        let manager = EventManager::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let first = {
            let counter = Arc::clone(&counter);
            listener_fn(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        };
        let second = listener_fn(|_| {});

        manager.add_event_listeners([Arc::clone(&first), Arc::clone(&second)]);
        assert_eq!(manager.listener_count(), 2);

        manager.remove_event_listeners(&[Arc::clone(&first)]);
        assert_eq!(manager.listener_count(), 1);

        // removing twice is a no-op
        manager.remove_event_listeners(&[first]);
        assert_eq!(manager.listener_count(), 1);
    }
}
