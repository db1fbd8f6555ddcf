//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `bridge-inmemory`). Host applications can
//! depend on `native-bridge-workspace` and enable the documented features
//! without wiring each crate individually.

#[cfg(feature = "service")]
pub use core_service as service;

#[cfg(feature = "inmemory")]
pub use bridge_inmemory as inmemory;
