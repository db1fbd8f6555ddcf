//! Lifetime pins.
//!
//! A pinned proxy is kept alive by a strong handle in this table until the
//! completion of the operation that pinned it. Pins are flags, not counters:
//! at most one operation is outstanding per entity.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use bridge_traits::EntityKey;

use crate::error::{HostError, Result};
use crate::proxy::ProxyObject;

#[derive(Default)]
pub(crate) struct PinTable {
    pins: HashMap<EntityKey, Rc<dyn ProxyObject>>,
}

impl PinTable {
    /// Pins `proxy`. Returns `false` if it was already pinned.
    pub(crate) fn pin(&mut self, proxy: Rc<dyn ProxyObject>) -> bool {
        match self.pins.entry(proxy.id().key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(proxy);
                true
            }
        }
    }

    /// Removes the pin for `key` and hands back the strong handle.
    ///
    /// The caller drops it once no host borrow is active, since that drop
    /// may destroy the proxy.
    pub(crate) fn unpin(&mut self, key: EntityKey) -> Result<Rc<dyn ProxyObject>> {
        self.pins.remove(&key).ok_or(HostError::NotPinned { key })
    }

    pub(crate) fn is_pinned(&self, key: EntityKey) -> bool {
        self.pins.contains_key(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.pins.len()
    }

    pub(crate) fn take_all(&mut self) -> Vec<Rc<dyn ProxyObject>> {
        self.pins.drain().map(|(_, proxy)| proxy).collect()
    }
}
