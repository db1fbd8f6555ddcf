//! Host-visible proxies for native entities.
//!
//! A [`Proxy<E>`] wraps exactly one native entity for its whole lifetime. It
//! holds the entity key, the latest snapshot, the entity-specific host state
//! `E` (operation slots and similar) and a weak link back to the [`Host`].
//!
//! Proxies are reference counted on the host thread only (`Rc`), so they can
//! never reach the native thread. Dropping the last handle destroys the proxy
//! and clears its registry back-reference, provided that back-reference still
//! carries this proxy's serial.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bridge_traits::{EntityKey, EntityKind, NativeSession, Snapshot};
use core_runtime::PendingEvent;

use crate::error::{HostError, Result};
use crate::host::{Host, HostShared};

/// A native entity type as seen by the host.
pub trait Entity: Sized + 'static {
    const KIND: EntityKind;

    /// Snapshot type the native side hands over.
    type Data: Snapshot;

    /// Builds the host-side state for a freshly created proxy.
    fn from_snapshot(data: &Self::Data) -> Self;

    /// Lets the entity react to an event targeted at it before any
    /// subscribed callback runs.
    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        let _ = (proxy, event);
        Ok(Disposition::Forward)
    }

    /// Runs when the proxy is destroyed, after its registry entry and
    /// callback table are gone. Not called once the host itself is gone.
    fn on_release(&self, key: EntityKey, native: &dyn NativeSession) {
        let _ = (key, native);
    }
}

/// What the dispatcher does after [`Entity::apply_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Continue to the callback registry.
    Forward,
    /// The entity delivered the event itself.
    Consumed,
}

/// Identity of one proxy instance.
///
/// `serial` distinguishes successive proxies for the same entity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyId {
    pub key: EntityKey,
    pub serial: u64,
}

// ============================================================================
// Type-erased proxy
// ============================================================================

pub(crate) trait ProxyObject: 'static {
    fn id(&self) -> ProxyId;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;

    fn apply_event(self: Rc<Self>, event: &PendingEvent) -> Result<Disposition>;
}

pub(crate) struct ProxyInner<E: Entity> {
    id: ProxyId,
    data: RefCell<E::Data>,
    state: E,
    shared: Weak<HostShared>,
}

impl<E: Entity> ProxyInner<E> {
    pub(crate) fn new(serial: u64, data: E::Data, shared: Weak<HostShared>) -> Self {
        let key = data.key();
        Self {
            id: ProxyId { key, serial },
            state: E::from_snapshot(&data),
            data: RefCell::new(data),
            shared,
        }
    }
}

impl<E: Entity> ProxyObject for ProxyInner<E> {
    fn id(&self) -> ProxyId {
        self.id
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn apply_event(self: Rc<Self>, event: &PendingEvent) -> Result<Disposition> {
        E::apply_event(&Proxy { inner: self }, event)
    }
}

impl<E: Entity> Drop for ProxyInner<E> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.release(self.id);
            self.state.on_release(self.id.key, shared.native());
        }
    }
}

/// A proxy of unknown entity type.
#[derive(Clone)]
pub struct ProxyRef {
    pub(crate) inner: Rc<dyn ProxyObject>,
}

impl ProxyRef {
    pub fn id(&self) -> ProxyId {
        self.inner.id()
    }

    pub fn key(&self) -> EntityKey {
        self.inner.id().key
    }

    pub fn kind(&self) -> EntityKind {
        self.key().kind
    }

    /// Recovers the typed proxy, or `None` if it wraps another entity type.
    pub fn downcast<E: Entity>(&self) -> Option<Proxy<E>> {
        Rc::clone(&self.inner)
            .into_any()
            .downcast::<ProxyInner<E>>()
            .ok()
            .map(|inner| Proxy { inner })
    }

    pub fn ptr_eq(a: &ProxyRef, b: &ProxyRef) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn apply_event(&self, event: &PendingEvent) -> Result<Disposition> {
        Rc::clone(&self.inner).apply_event(event)
    }
}

impl fmt::Debug for ProxyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProxyRef").field(&self.id()).finish()
    }
}

// ============================================================================
// Typed proxy
// ============================================================================

/// Host-side handle to a native entity of type `E`.
pub struct Proxy<E: Entity> {
    inner: Rc<ProxyInner<E>>,
}

impl<E: Entity> Proxy<E> {
    pub(crate) fn from_inner(inner: Rc<ProxyInner<E>>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> ProxyId {
        self.inner.id
    }

    pub fn key(&self) -> EntityKey {
        self.inner.id.key
    }

    /// Borrows the current snapshot.
    ///
    /// Do not hold the borrow across calls back into the host.
    pub fn data(&self) -> Ref<'_, E::Data> {
        self.inner.data.borrow()
    }

    /// Clones the current snapshot.
    pub fn snapshot(&self) -> E::Data {
        self.inner.data.borrow().clone()
    }

    /// Mutates the snapshot in place.
    pub fn update_data<T>(&self, f: impl FnOnce(&mut E::Data) -> T) -> T {
        f(&mut self.inner.data.borrow_mut())
    }

    /// Entity-specific host state.
    pub fn state(&self) -> &E {
        &self.inner.state
    }

    /// The host this proxy belongs to.
    pub fn host(&self) -> Result<Host> {
        self.inner
            .shared
            .upgrade()
            .map(Host::from_shared)
            .ok_or(HostError::HostShutdown)
    }

    pub fn erase(&self) -> ProxyRef {
        ProxyRef {
            inner: Rc::clone(&self.inner) as Rc<dyn ProxyObject>,
        }
    }

    pub fn downgrade(&self) -> WeakProxy<E> {
        WeakProxy {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(a: &Proxy<E>, b: &Proxy<E>) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Number of strong handles, pins included.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl<E: Entity> Clone for Proxy<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Entity> PartialEq for Proxy<E> {
    fn eq(&self, other: &Self) -> bool {
        Proxy::ptr_eq(self, other)
    }
}

impl<E: Entity> Eq for Proxy<E> {}

impl<E: Entity> fmt::Debug for Proxy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.inner.id)
            .field("data", &self.inner.data)
            .finish()
    }
}

/// Non-owning proxy handle, for callbacks that must not keep their target alive.
pub struct WeakProxy<E: Entity> {
    inner: Weak<ProxyInner<E>>,
}

impl<E: Entity> WeakProxy<E> {
    pub fn upgrade(&self) -> Option<Proxy<E>> {
        self.inner.upgrade().map(|inner| Proxy { inner })
    }
}

impl<E: Entity> Clone for WeakProxy<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
