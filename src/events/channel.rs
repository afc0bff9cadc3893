//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from the core library
//! to any UI layer.

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::time::Duration;

use super::Event;

/// Anything the core can hand events to.
///
/// The organizer and the monitor only ever talk to this trait, so the core
/// stays free of any UI toolkit. Implemented for [`EventSender`] and for
/// plain closures.
///
/// Closure sinks are called on the monitor's worker thread and must not
/// block, or stopping the monitor waits for them.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: Event);

    /// Deliver `event`, giving up after `timeout` if the sink is full.
    ///
    /// Hands the event back when it could not be delivered in time. Sinks
    /// that never block simply deliver it.
    fn on_event_within(&self, event: Event, _timeout: Duration) -> Option<Event> {
        self.on_event(event);
        None
    }
}

impl<F> EventSink for F
where
    F: Fn(Event) + Send + Sync,
{
    fn on_event(&self, event: Event) {
        self(event)
    }
}

/// Sends events from the core library.
///
/// This is a thin wrapper around crossbeam's Sender that can be
/// cloned and sent across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event. Non-blocking if the channel isn't full.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    /// This allows progress reporting to be optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

impl EventSink for EventSender {
    fn on_event(&self, event: Event) {
        self.send(event);
    }

    fn on_event_within(&self, event: Event, timeout: Duration) -> Option<Event> {
        match self.inner.send_timeout(event, timeout) {
            Ok(()) | Err(SendTimeoutError::Disconnected(_)) => None,
            Err(SendTimeoutError::Timeout(event)) => Some(event),
        }
    }
}

/// Receives events from the core library.
///
/// Used by UI layers to subscribe to progress updates.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Wait at most `timeout` for the next event.
    ///
    /// Returns `None` both on timeout and once every sender is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.inner.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// A bidirectional event channel for communication between
/// the core library and UI layers.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded event channel with the specified capacity.
    ///
    /// Use this if you need backpressure (e.g., slow UI that can't
    /// keep up with events).
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A no-op event sink for when you don't need progress reporting.
pub fn null_sink() -> impl EventSink {
    |_event: Event| {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MonitorEvent;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn started() -> Event {
        Event::Monitor(MonitorEvent::Started {
            path: PathBuf::from("/downloads"),
            date_based: false,
        })
    }

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.on_event(started());
        });
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Monitor(MonitorEvent::Started { path, .. }) => {
                assert_eq!(path, PathBuf::from("/downloads"));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn closures_are_sinks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sink = move |_event: Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        sink.on_event(started());
        sink.on_event(started());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (sender, receiver) = EventChannel::new();
        drop(receiver);
        sender.send(started());
        null_sink().on_event(started());
    }

    #[test]
    fn full_channel_hands_the_event_back() {
        let (sender, receiver) = EventChannel::bounded(1);

        assert!(sender
            .on_event_within(started(), Duration::from_millis(10))
            .is_none());
        let returned = sender.on_event_within(started(), Duration::from_millis(10));

        assert!(matches!(returned, Some(Event::Monitor(MonitorEvent::Started { .. }))));
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn closures_always_accept_within_a_timeout() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sink = move |_event: Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        assert!(sink.on_event_within(started(), Duration::ZERO).is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recv_timeout_returns_none_when_idle() {
        let (_sender, receiver) = EventChannel::bounded(1);
        assert!(receiver
            .recv_timeout(Duration::from_millis(10))
            .is_none());
    }
}
