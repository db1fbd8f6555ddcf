//! # In-Memory Native Library
//!
//! A [`NativeSession`](bridge_traits::NativeSession) implementation that
//! simulates the native client library with a seeded catalogue and a real
//! background thread.
//!
//! ## Overview
//!
//! - [`Catalogue`] holds users, artists, albums, tracks, playlists and
//!   containers, and answers browses, searches and link lookups
//! - [`InMemorySession`] accepts requests on the calling thread and completes
//!   them on its worker thread through the
//!   [`SignalSender`](core_runtime::SignalSender) it was spawned with
//! - [`demo`] seeds a small fixed catalogue
//!
//! Playback is simulated: [`InMemorySession::advance_playback`] moves the
//! play position, hands silence to an attached audio sink and raises
//! `endOfTrack` when the track runs out.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_inmemory::{demo, InMemoryConfig, InMemorySession};
//! use core_runtime::signal::channel;
//!
//! let (sender, receiver) = channel(&SignalConfig::default());
//! let native = Arc::new(InMemorySession::spawn(
//!     demo::catalogue(),
//!     InMemoryConfig::default().with_native_audio(true),
//!     sender,
//! )?);
//!
//! let config = BridgeConfig::builder()
//!     .native_session(native.clone())
//!     .native_audio(true)
//!     .build()?;
//! let session = Session::new(config, receiver)?;
//! ```

pub mod catalogue;
pub mod demo;
mod session;
mod worker;

pub use catalogue::Catalogue;
pub use session::{InMemoryConfig, InMemorySession};
