//! Subscriber state machine: `open -> closed`, exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;

use super::event::Event;

/// A predicate a subscriber uses to filter events it has already matched by
/// type. Evaluated by the publisher, outside any subscriber lock.
pub type Filter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// The set of type tags a subscriber is interested in.
#[derive(Debug, Clone)]
pub enum TypeSet {
    /// Subscribed to the wildcard — every published event.
    All,
    /// Subscribed to one or more explicit type tags.
    Types(Vec<String>),
}

impl TypeSet {
    pub fn matches(&self, event_type: &str) -> bool {
        match self {
            TypeSet::All => true,
            TypeSet::Types(types) => types.iter().any(|t| t == event_type),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeSet::All)
    }
}

/// Bus-internal subscriber record. Outward-facing subscribe calls return only
/// the `ReceiverStream<Event>`; the bus keeps this handle to deliver into and
/// to retire once `closed` flips.
#[derive(Debug)]
pub struct Subscriber {
    pub id: crate::types::SubscriberId,
    pub types: TypeSet,
    pub filter: Option<Filter>,
    sender: mpsc::Sender<Event>,
    closed: AtomicBool,
}

impl Subscriber {
    pub(crate) fn new(
        id: crate::types::SubscriberId,
        types: TypeSet,
        filter: Option<Filter>,
        buffer_size: usize,
    ) -> (Arc<Self>, ReceiverStream<Event>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        let subscriber = Arc::new(Self {
            id,
            types,
            filter,
            sender: tx,
            closed: AtomicBool::new(false),
        });
        (subscriber, ReceiverStream::new(rx))
    }

    /// Returns an already-closed subscriber wired to nothing, used when the
    /// bus itself is closed and a new subscribe must yield a closed stream.
    pub(crate) fn new_closed(id: crate::types::SubscriberId) -> (Arc<Self>, ReceiverStream<Event>) {
        let (tx, rx) = mpsc::channel(1);
        let subscriber = Arc::new(Self {
            id,
            types: TypeSet::All,
            filter: None,
            sender: tx,
            closed: AtomicBool::new(true),
        });
        drop(subscriber.sender.clone());
        (subscriber, ReceiverStream::new(rx))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Transition `open -> closed` exactly once; idempotent on repeat calls.
    /// Only flips the flag — `try_send` stops admitting new events once it's
    /// set, but the queue itself only closes (so consumers observe
    /// end-of-stream) once every `Arc<Subscriber>` is dropped, which is the
    /// bus's job: `EventBus::unsubscribe`/`close` must remove this subscriber
    /// from `inner.subscribers` to actually drop its `mpsc::Sender`.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Attempt to enqueue within `publish_timeout`. Returns `true` on success.
    /// Checking `closed` and sending happen without releasing control to
    /// other subscribers in between, so we never race a concurrent close
    /// into enqueuing onto a channel whose receiver has gone away.
    pub(crate) async fn try_send(&self, event: Event, publish_timeout: Duration) -> bool {
        if self.is_closed() {
            return false;
        }
        matches!(timeout(publish_timeout, self.sender.send(event)).await, Ok(Ok(())))
    }

    /// Apply the subscriber's filter predicate, if any. A panicking predicate
    /// is treated as "does not match" and the subscriber is marked closed —
    /// the bus itself must never be poisoned by misbehaving caller code.
    pub(crate) fn passes_filter(self: &Arc<Self>, event: &Event) -> bool {
        let Some(filter) = self.filter.clone() else {
            return true;
        };
        let event = event.clone();
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || filter(&event))) {
            Ok(result) => result,
            Err(_) => {
                self.close();
                false
            }
        }
    }
}
