//! # Callback Registry
//!
//! Named callback tables, one per subscribed proxy plus one process-wide
//! table.
//!
//! ## Replace-all
//!
//! Subscribing installs a whole table. A second subscribe discards the first
//! table entirely; entries are never merged:
//!
//! ```ignore
//! host.subscribe(&playlist, CallbackTable::new().on(EventName::TracksAdded, on_added));
//! host.subscribe(&playlist, CallbackTable::new().on(EventName::PlaylistRenamed, on_renamed));
//! // `on_added` is gone.
//! ```
//!
//! ## Lookup order
//!
//! [`CallbackRegistry::lookup`] checks the target's own table first and
//! falls back to the global table only when the target has no entry for that
//! name. Events whose target has no live proxy only see the global table.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use core_runtime::{EventName, EventPayload};

use crate::error::{HostError, Result};
use crate::proxy::{Entity, Proxy, ProxyId, ProxyRef};

/// A delivered event as seen by a callback.
#[derive(Debug)]
pub struct Invocation {
    pub seq: u64,
    pub name: EventName,
    /// The target proxy, when it is alive.
    pub target: Option<ProxyRef>,
    pub payload: EventPayload,
}

impl Invocation {
    /// The target as a typed proxy.
    pub fn target_as<E: Entity>(&self) -> Option<Proxy<E>> {
        self.target.as_ref().and_then(|target| target.downcast::<E>())
    }
}

pub type Callback = Rc<dyn Fn(&Invocation)>;

/// Event name to callback map.
#[derive(Clone, Default)]
pub struct CallbackTable {
    entries: HashMap<EventName, Callback>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `callback` for `name`, replacing any earlier entry in this table.
    pub fn on<F>(mut self, name: EventName, callback: F) -> Self
    where
        F: Fn(&Invocation) + 'static,
    {
        self.entries.insert(name, Rc::new(callback));
        self
    }

    pub fn insert(&mut self, name: EventName, callback: Callback) -> Option<Callback> {
        self.entries.insert(name, callback)
    }

    /// Adds a callback under its scripting-side name (e.g. `"tracksAdded"`).
    pub fn insert_named(&mut self, name: &str, callback: Callback) -> Result<()> {
        let name: EventName = name
            .parse()
            .map_err(|_| HostError::InvalidArgument(format!("unknown event name '{}'", name)))?;
        self.entries.insert(name, callback);
        Ok(())
    }

    pub fn get(&self, name: EventName) -> Option<&Callback> {
        self.entries.get(&name)
    }

    pub fn contains(&self, name: EventName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("CallbackTable").field("names", &names).finish()
    }
}

/// Per-proxy and global callback tables.
#[derive(Default)]
pub struct CallbackRegistry {
    entities: HashMap<ProxyId, CallbackTable>,
    global: CallbackTable,
}

impl CallbackRegistry {
    /// Installs `table` for `target`, returning the table it replaced.
    pub fn subscribe(&mut self, target: ProxyId, table: CallbackTable) -> Option<CallbackTable> {
        self.entities.insert(target, table)
    }

    pub fn unsubscribe(&mut self, target: ProxyId) -> Option<CallbackTable> {
        self.entities.remove(&target)
    }

    /// Installs the process-wide table, returning the one it replaced.
    pub fn global_subscribe(&mut self, table: CallbackTable) -> CallbackTable {
        std::mem::replace(&mut self.global, table)
    }

    pub fn global_unsubscribe(&mut self) -> CallbackTable {
        std::mem::take(&mut self.global)
    }

    /// Entity table first, then the global table.
    pub fn lookup(&self, target: Option<ProxyId>, name: EventName) -> Option<Callback> {
        target
            .and_then(|id| self.entities.get(&id))
            .and_then(|table| table.get(name))
            .or_else(|| self.global.get(name))
            .cloned()
    }

    pub fn is_subscribed(&self, target: ProxyId) -> bool {
        self.entities.contains_key(&target)
    }

    /// Removes every table. Returned so the caller can drop them outside any borrow.
    pub fn clear(&mut self) -> Vec<CallbackTable> {
        let mut tables: Vec<CallbackTable> = self.entities.drain().map(|(_, t)| t).collect();
        tables.push(std::mem::take(&mut self.global));
        tables
    }
}
