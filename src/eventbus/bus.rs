//! `EventBus` — in-process publish/subscribe with bounded per-subscriber
//! queues, lossy delivery under backpressure, and a periodic sweeper.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::types::{Error, EventBusConfig, Result, SubscriberId};

use super::event::{BusMetrics, BusMetricsSnapshot, Event};
use super::subscriber::{Filter, Subscriber, TypeSet};

/// A live subscription: a `Stream<Item = Event>` plus the id `unsubscribe`
/// needs to retire it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    stream: ReceiverStream<Event>,
}

impl Subscription {
    pub fn id(&self) -> &SubscriberId {
        &self.id
    }
}

impl Stream for Subscription {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        let this = self.get_mut();
        Pin::new(&mut this.stream).poll_next(cx)
    }
}

/// In-process publish/subscribe bus. Cloning shares the same underlying
/// state (it's an `Arc`-backed handle), matching the teacher's pattern of a
/// cheaply-clonable component owning an `RwLock`-guarded table.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    subscribers: RwLock<Vec<Arc<Subscriber>>>,
    metrics: BusMetrics,
    config: EventBusConfig,
    closed: AtomicBool,
    sweeper_stop: Notify,
}

impl EventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let inner = Arc::new(Inner {
            subscribers: RwLock::new(Vec::new()),
            metrics: BusMetrics::default(),
            config,
            closed: AtomicBool::new(false),
            sweeper_stop: Notify::new(),
        });
        let bus = Self { inner };
        bus.spawn_sweeper();
        bus
    }

    fn spawn_sweeper(&self) {
        let inner = self.inner.clone();
        let interval = inner.config.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut subs = inner.subscribers.write();
                        let before = subs.len();
                        subs.retain(|s| !s.is_closed());
                        let removed = before - subs.len();
                        if removed > 0 {
                            tracing::debug!(removed, "event bus sweeper removed closed subscribers");
                        }
                    }
                    _ = inner.sweeper_stop.notified() => {
                        tracing::debug!("event bus sweeper stopping");
                        return;
                    }
                }
            }
        });
    }

    pub fn metrics(&self) -> BusMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Publish an event. A no-op after the bus is closed. Never blocks beyond
    /// `publish_timeout` per subscriber; a full queue is a lossy drop, never
    /// a publisher-visible error.
    pub async fn publish(&self, event: Event) {
        if self.is_closed() {
            return;
        }
        self.inner.metrics.inc_published();

        let targets: Vec<Arc<Subscriber>> = {
            let subs = self.inner.subscribers.read();
            subs.iter()
                .filter(|s| !s.is_closed() && s.types.matches(&event.event_type))
                .cloned()
                .collect()
        };

        for subscriber in targets {
            if !subscriber.passes_filter(&event) {
                continue;
            }
            let delivered = subscriber.try_send(event.clone(), self.inner.config.publish_timeout).await;
            if delivered {
                self.inner.metrics.inc_delivered();
            } else {
                self.inner.metrics.inc_dropped();
            }
        }
    }

    /// Fire-and-forget publish: returns immediately, delivery happens on a
    /// detached task.
    pub fn publish_async(&self, event: Event) {
        let bus = self.clone();
        tokio::spawn(async move {
            bus.publish(event).await;
        });
    }

    fn new_subscription(&self, types: TypeSet, filter: Option<Filter>) -> Subscription {
        if self.is_closed() {
            let (_subscriber, stream) = Subscriber::new_closed(SubscriberId::new());
            return Subscription { id: SubscriberId::new(), stream };
        }

        let id = SubscriberId::new();
        let (subscriber, stream) = Subscriber::new(id.clone(), types, filter, self.inner.config.buffer_size);
        self.inner.subscribers.write().push(subscriber);
        self.inner.metrics.inc_subscriber_created();
        Subscription { id, stream }
    }

    pub fn subscribe(&self, event_type: impl Into<String>, filter: Option<Filter>) -> Subscription {
        self.new_subscription(TypeSet::Types(vec![event_type.into()]), filter)
    }

    pub fn subscribe_multiple(&self, event_types: Vec<String>, filter: Option<Filter>) -> Subscription {
        self.new_subscription(TypeSet::Types(event_types), filter)
    }

    pub fn subscribe_all(&self, filter: Option<Filter>) -> Subscription {
        self.new_subscription(TypeSet::All, filter)
    }

    /// Locate, close, and remove the matching subscriber; O(total subscribers).
    /// Removing it (not just flipping `closed`) drops its `mpsc::Sender` so the
    /// paired stream observes end-of-stream immediately, rather than waiting
    /// for the next sweeper tick.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut subs = self.inner.subscribers.write();
        if let Some(pos) = subs.iter().position(|s| &s.id == subscription.id()) {
            let subscriber = subs.swap_remove(pos);
            subscriber.close();
            self.inner.metrics.dec_active_subscriber();
        }
    }

    /// Subscribe, receive exactly one event, unsubscribe. Returns a
    /// cancellation error if `cancel` resolves first, or a bus-closed error
    /// if the stream ends before an event arrives.
    pub async fn wait(&self, event_type: impl Into<String>, cancel: impl std::future::Future<Output = ()>) -> Result<Event> {
        let mut subscription = self.subscribe(event_type, None);
        tokio::pin!(cancel);
        let outcome = tokio::select! {
            next = subscription.next() => next,
            _ = &mut cancel => {
                self.unsubscribe(&subscription);
                return Err(Error::cancelled("wait cancelled before an event arrived"));
            }
        };
        self.unsubscribe(&subscription);
        outcome.ok_or_else(|| Error::internal("bus-closed: subscriber stream ended"))
    }

    /// Idempotent: closes every subscriber, stops the sweeper, and makes
    /// subsequent publishes/subscribes no-ops / closed streams. Draining
    /// `subscribers` (not just flipping each `closed` flag) drops every
    /// `mpsc::Sender` so paired streams observe end-of-stream right away.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut subs = self.inner.subscribers.write();
        for subscriber in subs.drain(..) {
            subscriber.close();
        }
        self.inner.sweeper_stop.notify_waiters();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}
