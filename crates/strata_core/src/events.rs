//! # Event Sources
//!
//! Explicit, injectable notification plumbing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  publish   ┌──────────────┐   drain   ┌──────────────┐
//! │  Terrain     │───────────>│ EventSource  │──────────>│ SourceBinding│
//! │  data owner  │            │ (subscribers)│           │ (one owner)  │
//! └──────────────┘            └──────────────┘           └──────────────┘
//! ```
//!
//! There is no process-wide bus. Whoever produces an event owns an
//! [`EventSource`] and hands a reference to whoever wants to listen.
//! Each subscriber gets its own bounded crossbeam queue, so every listener
//! observes every event. Dropping a receiver disconnects it; the source
//! prunes dead subscribers on the next publish.
//!
//! [`SourceBinding`] is the single-owner side: binding to a new source drops
//! the previous subscription first, so a rebind never leaves a stale or
//! duplicate listener behind.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

/// Default per-subscriber queue capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A broadcast source of events of type `E`.
pub struct EventSource<E> {
    /// Live subscriber queues.
    subscribers: Mutex<Vec<Sender<E>>>,
    /// Queue capacity handed to each new subscriber.
    capacity: usize,
}

impl<E: Clone> EventSource<E> {
    /// Creates a source whose subscribers each buffer up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new subscriber and returns its receiving end.
    #[must_use]
    pub fn subscribe(&self) -> EventReceiver<E> {
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.lock().push(sender);
        EventReceiver { receiver }
    }

    /// Delivers `event` to every live subscriber (non-blocking).
    ///
    /// Subscribers whose receiver was dropped are removed. A subscriber
    /// whose queue is full misses this event.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: &E) -> usize {
        let mut subscribers = self.subscribers.lock();
        let mut delivered = 0;

        subscribers.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });

        delivered
    }

    /// Number of registered subscribers (including ones not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<E: Clone> Default for EventSource<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Receiving end of one subscription.
pub struct EventReceiver<E> {
    receiver: Receiver<E>,
}

impl<E> EventReceiver<E> {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

/// Single-owner subscription that can be re-pointed at a different source.
pub struct SourceBinding<E> {
    receiver: Option<EventReceiver<E>>,
}

impl<E: Clone> SourceBinding<E> {
    /// Creates an unbound binding.
    #[must_use]
    pub const fn new() -> Self {
        Self { receiver: None }
    }

    /// Subscribes to `source`, dropping any previous subscription first.
    pub fn bind_source(&mut self, source: &EventSource<E>) {
        // Disconnect before connecting: the old source must never deliver
        // to this binding again.
        self.receiver = None;
        self.receiver = Some(source.subscribe());
    }

    /// Drops the current subscription, if any.
    pub fn unbind(&mut self) {
        self.receiver = None;
    }

    /// Returns true if currently subscribed to a source.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }

    /// Drains pending events from the bound source. Empty when unbound.
    pub fn drain(&self) -> Vec<E> {
        self.receiver
            .as_ref()
            .map_or_else(Vec::new, EventReceiver::drain)
    }
}

impl<E: Clone> Default for SourceBinding<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Ping(u32);

    #[test]
    fn test_every_subscriber_sees_every_event() {
        let source = EventSource::new(8);
        let a = source.subscribe();
        let b = source.subscribe();

        assert_eq!(source.publish(&Ping(1)), 2);

        assert_eq!(a.drain(), vec![Ping(1)]);
        assert_eq!(b.drain(), vec![Ping(1)]);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let source = EventSource::new(8);
        let receiver = source.subscribe();
        assert_eq!(source.subscriber_count(), 1);

        drop(receiver);
        assert_eq!(source.publish(&Ping(7)), 0);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_full_queue_drops_event_but_keeps_subscriber() {
        let source = EventSource::new(1);
        let receiver = source.subscribe();

        assert_eq!(source.publish(&Ping(1)), 1);
        assert_eq!(source.publish(&Ping(2)), 0);
        assert_eq!(source.subscriber_count(), 1);
        assert_eq!(receiver.pending_count(), 1);
        assert_eq!(receiver.try_recv(), Some(Ping(1)));
    }

    #[test]
    fn test_rebind_observes_only_latest_source() {
        let first = EventSource::new(8);
        let second = EventSource::new(8);
        let mut binding = SourceBinding::new();

        binding.bind_source(&first);
        binding.bind_source(&second);

        first.publish(&Ping(1));
        second.publish(&Ping(2));

        assert_eq!(binding.drain(), vec![Ping(2)]);
        // The stale subscription was pruned, not left dangling
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);
    }

    #[test]
    fn test_rebind_same_source_does_not_duplicate() {
        let source = EventSource::new(8);
        let mut binding = SourceBinding::new();

        binding.bind_source(&source);
        binding.bind_source(&source);

        assert_eq!(source.publish(&Ping(3)), 1);
        assert_eq!(binding.drain(), vec![Ping(3)]);
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_unbound_binding_is_empty() {
        let source = EventSource::new(8);
        let mut binding = SourceBinding::new();
        assert!(!binding.is_bound());
        assert!(binding.drain().is_empty());

        binding.bind_source(&source);
        binding.unbind();
        source.publish(&Ping(4));
        assert!(binding.drain().is_empty());
        assert_eq!(source.subscriber_count(), 0);
    }
}
