//! # Core Host
//!
//! Host-thread side of the native bridge.
//!
//! ## Overview
//!
//! The native client library runs on its own background thread and reports
//! back through a [`SignalSender`](core_runtime::SignalSender). Everything in
//! this crate lives on the single host thread instead:
//!
//! - [`Host`] owns the proxy registry, the pin table and the callback
//!   registry, and drains the signal into callback invocations.
//! - [`Proxy`] is the host-side handle for one native entity. At most one
//!   live proxy exists per entity.
//! - [`Operation`] is the per-entity browse/search state machine that pins
//!   its proxy while the native side is working.
//! - [`CallbackTable`] maps event names to host callbacks, per proxy or
//!   process wide.
//!
//! ## Defining an entity
//!
//! ```ignore
//! use bridge_traits::{AlbumBrowseData, AlbumData, EntityKind};
//! use core_host::{Entity, Operation};
//!
//! pub struct AlbumState {
//!     browse: Operation<AlbumState, AlbumBrowseData>,
//! }
//!
//! impl Entity for AlbumState {
//!     const KIND: EntityKind = EntityKind::Album;
//!     type Data = AlbumData;
//!
//!     fn from_snapshot(data: &AlbumData) -> Self {
//!         Self { browse: Operation::new(data.key) }
//!     }
//! }
//! ```

pub mod callbacks;
pub mod error;
pub mod host;
pub mod operation;
mod pin;
pub mod proxy;
mod registry;

pub use callbacks::{Callback, CallbackTable, Invocation};
pub use error::{HostError, Result};
pub use host::{Host, WeakHost};
pub use operation::{CompletionCallback, Operation, OperationState, RequestOutcome};
pub use proxy::{Disposition, Entity, Proxy, ProxyId, ProxyRef, WeakProxy};
