//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the native bridge:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - The bridge event vocabulary
//! - The cross-thread signal between the native thread and the host thread
//!
//! ## Overview
//!
//! Everything in this crate is `Send + Sync`: it is shared between the native
//! library's background thread and the host thread. Host-only state (proxies,
//! pins, callback tables) lives in `core-host`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod signal;

pub use error::{Error, Result};
pub use events::{EventName, EventPayload};
pub use signal::{PendingEvent, SignalReceiver, SignalSender};
