//! Native entity to proxy back-references.
//!
//! At most one live proxy exists per [`EntityKey`]. Slots hold weak
//! references, so the registry never keeps a proxy alive; only handles held
//! by scripting code and the pin table do.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use bridge_traits::EntityKey;

use crate::proxy::{ProxyId, ProxyObject};

struct Slot {
    serial: u64,
    proxy: Weak<dyn ProxyObject>,
}

#[derive(Default)]
pub(crate) struct ProxyRegistry {
    slots: HashMap<EntityKey, Slot>,
}

impl ProxyRegistry {
    /// Live proxy for `key`, if one exists.
    pub(crate) fn get(&self, key: EntityKey) -> Option<Rc<dyn ProxyObject>> {
        self.slots.get(&key).and_then(|slot| slot.proxy.upgrade())
    }

    /// Points the back-reference for `key` at a new proxy.
    ///
    /// Returns the displaced reference so the caller can drop it after the
    /// registry borrow ends.
    pub(crate) fn install(
        &mut self,
        key: EntityKey,
        serial: u64,
        proxy: Weak<dyn ProxyObject>,
    ) -> Option<Weak<dyn ProxyObject>> {
        self.slots
            .insert(key, Slot { serial, proxy })
            .map(|slot| slot.proxy)
    }

    /// Clears the back-reference for `id.key` if it still belongs to `id`.
    ///
    /// Returns `false` when a newer proxy owns the slot.
    pub(crate) fn release(&mut self, id: ProxyId) -> bool {
        match self.slots.get(&id.key) {
            Some(slot) if slot.serial == id.serial => {
                self.slots.remove(&id.key);
                true
            }
            _ => false,
        }
    }

    /// Serial of the proxy the back-reference points to.
    pub(crate) fn back_reference(&self, key: EntityKey) -> Option<u64> {
        self.slots.get(&key).map(|slot| slot.serial)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.proxy.strong_count() > 0)
            .count()
    }
}
