use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

use crate::application::Client;
use crate::application::events::{Event, FromEvent};
use crate::application::services::event_manager::EventListener;

struct Forward<E> {
    sender: mpsc::Sender<E>,
    /// Events waiting behind a full channel, oldest first.
    backlog: VecDeque<E>,
    draining: bool,
}

struct CollectorListener<E, F> {
    filter: F,
    forward: Arc<Mutex<Forward<E>>>,
}

impl<E: FromEvent, F> CollectorListener<E, F> {
    fn new(filter: F, sender: mpsc::Sender<E>) -> Self {
        Self {
            filter,
            forward: Arc::new(Mutex::new(Forward {
                sender,
                backlog: VecDeque::new(),
                draining: false,
            })),
        }
    }

    /// Hands `event` to the channel without waiting on the consumer.
    fn deliver(&self, event: E) {
        let mut forward = self.forward.lock();
        if forward.draining {
            forward.backlog.push_back(event);
            return;
        }
        match forward.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Closed(_)) => trace!("Collector closed, dropping event"),
            Err(TrySendError::Full(event)) => {
                forward.backlog.push_back(event);
                forward.draining = true;
                let sender = forward.sender.clone();
                drop(forward);
                tokio::spawn(drain(Arc::clone(&self.forward), sender));
            }
        }
    }
}

/// Feeds the backlog into the channel in order, waiting for the consumer.
async fn drain<E: Send>(forward: Arc<Mutex<Forward<E>>>, sender: mpsc::Sender<E>) {
    loop {
        let next = {
            let mut forward = forward.lock();
            let next = forward.backlog.pop_front();
            if next.is_none() {
                forward.draining = false;
            }
            next
        };
        let Some(event) = next else {
            return;
        };
        if sender.send(event).await.is_err() {
            let mut forward = forward.lock();
            forward.backlog.clear();
            forward.draining = false;
            trace!("Collector closed, dropping backlog");
            return;
        }
    }
}

#[async_trait]
impl<E, F> EventListener for CollectorListener<E, F>
where
    E: FromEvent,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    async fn on_event(&self, event: Event) {
        let Some(event) = event.downcast::<E>() else {
            return;
        };
        if (self.filter)(&event) {
            self.deliver(event);
        }
    }
}

/// Forwards every event of type `E` that passes a filter until torn down.
///
/// The channel holds a single event. Anything beyond that queues in order
/// behind a forwarding task, so a slow consumer never stalls dispatch or
/// other listeners, in either dispatch mode.
pub struct Collector<E> {
    client: Client,
    listener: Arc<dyn EventListener>,
    receiver: mpsc::Receiver<E>,
    _event: PhantomData<fn() -> E>,
}

impl<E: FromEvent> Collector<E> {
    pub fn new<F>(client: &Client, filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::channel(1);
        let listener: Arc<dyn EventListener> =
            Arc::new(CollectorListener::new(filter, sender));
        client.add_event_listeners([Arc::clone(&listener)]);
        Self {
            client: client.clone(),
            listener,
            receiver,
            _event: PhantomData,
        }
    }

    /// Next matching event, or `None` once torn down and drained.
    pub async fn next(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    /// Deregisters the listener and closes the channel. Events already
    /// buffered can still be read with [`Self::next`].
    pub fn teardown(&mut self) {
        self.client
            .remove_event_listeners(std::slice::from_ref(&self.listener));
        self.receiver.close();
    }
}

impl<E> Drop for Collector<E> {
    fn drop(&mut self) {
        self.client
            .remove_event_listeners(std::slice::from_ref(&self.listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{EventKind, Resumed};

    #[tokio::test]
    async fn test_collector_registers_and_deregisters() {
        let client = Client::builder().build();
        let mut collector = client.collector::<Resumed, _>(|_| true);
        assert_eq!(client.event_manager().listener_count(), 1);

        collector.teardown();
        assert_eq!(client.event_manager().listener_count(), 0);
        assert!(collector.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_deregisters() {
        let client = Client::builder().build();
        {
            let _collector = client.collector::<Resumed, _>(|_| true);
            assert_eq!(client.event_manager().listener_count(), 1);
        }
        assert_eq!(client.event_manager().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_filter_and_type_extraction() {
        let client = Client::builder().build();
        let (sender, mut receiver) = mpsc::channel(1);
        let listener = CollectorListener::new(|_: &Resumed| true, sender);

        listener
            .on_event(Event::new(client.clone(), 3, EventKind::from(Resumed)))
            .await;
        assert!(receiver.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_full_channel_queues_in_order() {
        let (sender, mut receiver) = mpsc::channel(1);
        let listener = CollectorListener::new(|_: &SequencedResumed| true, sender);

        for sequence in 1..=4 {
            listener.deliver(SequencedResumed(sequence));
        }
        assert_eq!(listener.forward.lock().backlog.len(), 3);

        let mut received = Vec::new();
        for _ in 0..4 {
            let next = tokio::time::timeout(std::time::Duration::from_secs(1), receiver.recv())
                .await
                .unwrap();
            received.extend(next.map(|event| event.0));
        }
        assert_eq!(received, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_closed_channel_drops_backlog() {
        let (sender, mut receiver) = mpsc::channel(1);
        let listener = CollectorListener::new(|_: &SequencedResumed| true, sender);
        listener.deliver(SequencedResumed(1));
        listener.deliver(SequencedResumed(2));
        receiver.close();

        while listener.forward.lock().draining {
            tokio::task::yield_now().await;
        }
        assert!(listener.forward.lock().backlog.is_empty());
        listener.deliver(SequencedResumed(3));
        assert!(listener.forward.lock().backlog.is_empty());
    }

    #[derive(Debug, Clone)]
    struct SequencedResumed(u8);

    impl FromEvent for SequencedResumed {
        fn from_event(_: &Event) -> Option<Self> {
            None
        }
    }
}
