//! Optional process-wide default bus.
//!
//! `init`/`emit`/`emit_async`/`on` are no-ops (or return a closed stream) when
//! nothing has called `init` yet, so call sites don't need to special-case a
//! missing bus. Tests that need a fresh instance can call `reinit`.

use std::sync::OnceLock;

use parking_lot::RwLock;

use super::bus::{EventBus, Subscription};
use super::event::Event;
use super::subscriber::Filter;
use crate::types::EventBusConfig;

static DEFAULT_BUS: OnceLock<RwLock<Option<EventBus>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<EventBus>> {
    DEFAULT_BUS.get_or_init(|| RwLock::new(None))
}

/// Initialize the process-wide default bus. Safe to call more than once;
/// later calls are no-ops unless `reinit` is used.
pub fn init(config: EventBusConfig) {
    let mut guard = slot().write();
    if guard.is_none() {
        *guard = Some(EventBus::new(config));
    }
}

/// Swap in a fresh bus, for tests that need isolation between cases.
pub fn reinit(config: EventBusConfig) {
    *slot().write() = Some(EventBus::new(config));
}

fn get() -> Option<EventBus> {
    slot().read().clone()
}

/// Publish on the default bus; a no-op if `init`/`reinit` hasn't run.
pub async fn emit(event: Event) {
    if let Some(bus) = get() {
        bus.publish(event).await;
    }
}

/// Fire-and-forget publish on the default bus; a no-op if uninitialized.
pub fn emit_async(event: Event) {
    if let Some(bus) = get() {
        bus.publish_async(event);
    }
}

/// Subscribe on the default bus. Returns `None` if uninitialized (callers
/// should treat that the same as an already-closed stream).
pub fn on(event_type: impl Into<String>, filter: Option<Filter>) -> Option<Subscription> {
    get().map(|bus| bus.subscribe(event_type, filter))
}
