//! # Native Bridge Traits
//!
//! The contract between the host-side bridge and the native client library.
//!
//! ## Overview
//!
//! The native library runs its own background thread and owns every domain
//! object. This crate describes that library from the host's point of view:
//!
//! - [`NativeSession`](native::NativeSession) - outgoing requests (browse, search,
//!   playback, playlist editing, lookups)
//! - [`model`] - identity keys and plain-data snapshots of native objects,
//!   browse/search results and change notifications
//! - [`AudioSink`](playback::AudioSink) - optional host audio output
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to the host
//!
//! ## Fail-Fast Strategy
//!
//! The host refuses to start without a native session:
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//!
//! let config = BridgeConfig::builder()
//!     .native_session(native)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! All calls use [`BridgeError`](error::BridgeError). Native refusals
//! (permission, creation, playability) are distinct variants and must never
//! be folded into a generic failure.
//!
//! ## Thread Safety
//!
//! Every trait here is `Send + Sync`: implementations are shared with the
//! native background thread.

pub mod error;
pub mod logging;
pub mod model;
pub mod native;
pub mod playback;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use model::{
    AlbumBrowseData, AlbumData, ArtistBrowseData, ArtistBrowseKind, ArtistData, ContainerChange,
    ContainerItem, EntityKey, EntityKind, FolderBoundary, LinkTarget, PlaylistChange,
    PlaylistContainerData, PlaylistData, PlaylistFolderData, PlaylistTrackData, SearchPage,
    SearchQuery, SearchResultData, Snapshot, TrackAvailability, TrackData, UserData,
};
pub use native::NativeSession;
pub use playback::{AudioFormat, AudioSink, SampleType};
