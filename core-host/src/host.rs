//! # Host
//!
//! Host-thread owner of the proxy registry, the pin table and the callback
//! registry, plus the dispatcher that turns drained signal events into
//! callback invocations.
//!
//! ## Threading
//!
//! `Host` is `!Send`. Create it on the host thread and keep every call on
//! that thread. The native side only ever holds the matching
//! [`SignalSender`](core_runtime::SignalSender).
//!
//! ## Re-entrancy
//!
//! No internal borrow is held while user callbacks run or while values that
//! may own proxies are dropped. Callbacks may therefore freely create
//! proxies, subscribe, pin or issue further requests.
//!
//! ## Usage
//!
//! ```ignore
//! let (sender, receiver) = core_runtime::signal::channel(&config.signal);
//! let host = Host::new(config, receiver);
//!
//! // Host event loop
//! loop {
//!     host.wait_for_events(None);
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{EntityKey, EntityKind, NativeSession, Snapshot};
use core_runtime::config::BridgeConfig;
use core_runtime::{EventName, PendingEvent, SignalReceiver};
use tracing::{debug, debug_span, error, trace, warn};

use crate::callbacks::{Callback, CallbackRegistry, CallbackTable, Invocation};
use crate::error::Result;
use crate::pin::PinTable;
use crate::proxy::{Disposition, Entity, Proxy, ProxyId, ProxyInner, ProxyObject, ProxyRef};
use crate::registry::ProxyRegistry;

pub(crate) struct HostShared {
    registry: RefCell<ProxyRegistry>,
    pins: RefCell<PinTable>,
    callbacks: RefCell<CallbackRegistry>,
    receiver: SignalReceiver,
    config: BridgeConfig,
    next_serial: Cell<u64>,
    next_local_id: Cell<u64>,
}

impl HostShared {
    /// Called when the last handle to a proxy goes away.
    pub(crate) fn release(&self, id: ProxyId) {
        let cleared = self.registry.borrow_mut().release(id);
        let table = self.callbacks.borrow_mut().unsubscribe(id);
        trace!(proxy = %id.key, serial = id.serial, cleared, "Proxy destroyed");
        drop(table);
    }

    pub(crate) fn native(&self) -> &dyn NativeSession {
        self.config.native_session.as_ref()
    }
}

/// Handle to the host-thread bridge state. Clones share the same state.
#[derive(Clone)]
pub struct Host {
    shared: Rc<HostShared>,
}

impl Host {
    pub fn new(config: BridgeConfig, receiver: SignalReceiver) -> Self {
        debug!(?config, "Creating host");
        Self {
            shared: Rc::new(HostShared {
                registry: RefCell::new(ProxyRegistry::default()),
                pins: RefCell::new(PinTable::default()),
                callbacks: RefCell::new(CallbackRegistry::default()),
                receiver,
                config,
                next_serial: Cell::new(1),
                next_local_id: Cell::new(1),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Rc<HostShared>) -> Self {
        Self { shared }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    pub fn native(&self) -> &Arc<dyn NativeSession> {
        &self.shared.config.native_session
    }

    pub fn downgrade(&self) -> WeakHost {
        WeakHost {
            shared: Rc::downgrade(&self.shared),
        }
    }

    // ------------------------------------------------------------------
    // Proxy registry
    // ------------------------------------------------------------------

    /// Returns the live proxy for the snapshot's entity, creating one if
    /// none exists.
    ///
    /// An existing proxy is returned unchanged and `data` is discarded. The
    /// live snapshot may already carry changes applied on the host side
    /// that `data`, often a copy cached inside some other result, lacks.
    pub fn proxy_for<E: Entity>(&self, data: E::Data) -> Proxy<E> {
        let key = data.key();
        let existing = self.shared.registry.borrow().get(key);

        if let Some(existing) = existing {
            match (ProxyRef { inner: existing }).downcast::<E>() {
                Some(proxy) => return proxy,
                None => warn!(entity = %key, "Registered proxy has a different type, replacing"),
            }
        }

        self.create_proxy::<E>(key, data)
    }

    fn create_proxy<E: Entity>(&self, key: EntityKey, data: E::Data) -> Proxy<E> {
        let serial = self.shared.next_serial.get();
        self.shared.next_serial.set(serial + 1);

        let inner = Rc::new(ProxyInner::<E>::new(
            serial,
            data,
            Rc::downgrade(&self.shared),
        ));
        let erased: Rc<dyn ProxyObject> = Rc::clone(&inner) as Rc<dyn ProxyObject>;
        let displaced = self
            .shared
            .registry
            .borrow_mut()
            .install(key, serial, Rc::downgrade(&erased));
        drop(displaced);

        debug!(entity = %key, serial, "Proxy created");
        Proxy::from_inner(inner)
    }

    /// Live proxy for `key`, of any type.
    pub fn lookup(&self, key: EntityKey) -> Option<ProxyRef> {
        let inner = self.shared.registry.borrow().get(key);
        inner.map(|inner| ProxyRef { inner })
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.shared.registry.borrow().get(key).is_some()
    }

    pub fn lookup_as<E: Entity>(&self, key: EntityKey) -> Option<Proxy<E>> {
        self.lookup(key).and_then(|proxy| proxy.downcast::<E>())
    }

    /// Serial of the proxy the registry points to for `key`, if any.
    pub fn back_reference(&self, key: EntityKey) -> Option<u64> {
        self.shared.registry.borrow().back_reference(key)
    }

    pub fn live_proxies(&self) -> usize {
        self.shared.registry.borrow().live_count()
    }

    /// Allocates a key for an entity created on the host side, such as a search.
    pub fn allocate_key(&self, kind: EntityKind) -> EntityKey {
        let id = self.shared.next_local_id.get();
        self.shared.next_local_id.set(id + 1);
        EntityKey::new(kind, id)
    }

    // ------------------------------------------------------------------
    // Lifetime pins
    // ------------------------------------------------------------------

    /// Keeps `proxy` alive until [`Host::unpin`]. Returns `false` if it was
    /// already pinned.
    pub fn pin<E: Entity>(&self, proxy: &Proxy<E>) -> bool {
        let pinned = self.shared.pins.borrow_mut().pin(proxy.erase().inner);
        if pinned {
            trace!(entity = %proxy.key(), "Pinned");
        }
        pinned
    }

    /// Releases the pin for `key`. The proxy is destroyed here if nothing
    /// else holds it.
    pub fn unpin(&self, key: EntityKey) -> Result<()> {
        let released = self.shared.pins.borrow_mut().unpin(key);
        match released {
            Ok(proxy) => {
                trace!(entity = %key, "Unpinned");
                drop(proxy);
                Ok(())
            }
            Err(err) => {
                error!(entity = %key, "Unpin without a matching pin");
                Err(err)
            }
        }
    }

    pub fn is_pinned(&self, key: EntityKey) -> bool {
        self.shared.pins.borrow().is_pinned(key)
    }

    pub fn pinned_count(&self) -> usize {
        self.shared.pins.borrow().len()
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Replaces the callback table of `proxy`.
    pub fn subscribe<E: Entity>(&self, proxy: &Proxy<E>, table: CallbackTable) {
        debug!(entity = %proxy.key(), ?table, "Subscribing");
        let previous = self
            .shared
            .callbacks
            .borrow_mut()
            .subscribe(proxy.id(), table);
        drop(previous);
    }

    /// Removes the callback table of `proxy`. Returns `false` if there was none.
    pub fn unsubscribe<E: Entity>(&self, proxy: &Proxy<E>) -> bool {
        let previous = self.shared.callbacks.borrow_mut().unsubscribe(proxy.id());
        previous.is_some()
    }

    pub fn is_subscribed<E: Entity>(&self, proxy: &Proxy<E>) -> bool {
        self.shared.callbacks.borrow().is_subscribed(proxy.id())
    }

    /// Replaces the process-wide callback table.
    pub fn global_subscribe(&self, table: CallbackTable) {
        debug!(?table, "Subscribing global callbacks");
        let previous = self.shared.callbacks.borrow_mut().global_subscribe(table);
        drop(previous);
    }

    pub fn global_unsubscribe(&self) {
        let previous = self.shared.callbacks.borrow_mut().global_unsubscribe();
        drop(previous);
    }

    pub fn lookup_callback(&self, target: Option<ProxyId>, name: EventName) -> Option<Callback> {
        self.shared.callbacks.borrow().lookup(target, name)
    }

    // ------------------------------------------------------------------
    // Event delivery
    // ------------------------------------------------------------------

    pub fn pending_events(&self) -> usize {
        self.shared.receiver.pending()
    }

    /// Delivers every pending event in raise order. Returns how many were
    /// delivered.
    pub fn process_events(&self) -> usize {
        let events = self.shared.receiver.drain();
        let count = events.len();
        for event in events {
            self.dispatch(event);
        }
        count
    }

    /// Blocks until events arrive or `timeout` elapses, then delivers them.
    pub fn wait_for_events(&self, timeout: Option<Duration>) -> usize {
        if self.shared.receiver.wait_blocking(timeout) {
            self.process_events()
        } else {
            0
        }
    }

    /// Waits for events without blocking the thread, then delivers them.
    pub async fn next_events(&self) -> usize {
        self.shared.receiver.wait().await;
        self.process_events()
    }

    fn dispatch(&self, event: PendingEvent) {
        let span = debug_span!("dispatch", seq = event.seq, event = %event.name);
        let _enter = span.enter();

        let latency = event.raised_at.elapsed();
        if latency > self.shared.config.signal.slow_delivery_threshold {
            warn!(?latency, "Slow event delivery");
        }

        let target = match event.target {
            Some(key) => match self.lookup(key) {
                Some(proxy) => Some(proxy),
                None if event.name.is_completion() => {
                    error!(entity = %key, "Completion for an entity with no live proxy, dropped");
                    return;
                }
                None => {
                    trace!(entity = %key, "Target has no live proxy");
                    None
                }
            },
            None => None,
        };

        if let Some(proxy) = &target {
            match proxy.apply_event(&event) {
                Ok(Disposition::Consumed) => return,
                Ok(Disposition::Forward) => {}
                Err(err) => {
                    error!(entity = %proxy.key(), error = %err, "Failed to apply event");
                    return;
                }
            }
        }

        let callback = self.lookup_callback(target.as_ref().map(ProxyRef::id), event.name);
        match callback {
            Some(callback) => {
                let invocation = Invocation {
                    seq: event.seq,
                    name: event.name,
                    target,
                    payload: event.payload,
                };
                callback(&invocation);
            }
            None => trace!("No callback registered, event dropped"),
        }
    }

    /// Drops every callback table and pin.
    ///
    /// Outstanding operations will never complete after this.
    pub fn shutdown(&self) {
        let tables = self.shared.callbacks.borrow_mut().clear();
        let pins = self.shared.pins.borrow_mut().take_all();
        if !pins.is_empty() {
            warn!(count = pins.len(), "Shutting down with operations in progress");
        }
        drop(tables);
        drop(pins);
        debug!("Host shut down");
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("live_proxies", &self.live_proxies())
            .field("pinned", &self.pinned_count())
            .field("pending_events", &self.pending_events())
            .finish()
    }
}

/// Non-owning host handle, for closures stored inside the host.
#[derive(Clone)]
pub struct WeakHost {
    shared: Weak<HostShared>,
}

impl WeakHost {
    pub fn upgrade(&self) -> Option<Host> {
        self.shared.upgrade().map(Host::from_shared)
    }
}
