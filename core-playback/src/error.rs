//! # Playback Error Types
//!
//! Error types for player operations.

use bridge_traits::{BridgeError, EntityKey};
use core_host::HostError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    // ========================================================================
    // Refusals
    // ========================================================================
    /// The track is unavailable, not streamable or banned in this region.
    #[error("Track not playable: {0}")]
    UnplayableTrack(EntityKey),

    /// No audio sink is registered and native audio output is disabled.
    #[error("No playback sink: register an audio sink or enable native audio")]
    NoPlaybackSink,

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Attempted operation when no track is loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Seek position is past the end of the loaded track.
    #[error("Seek to {second}s is beyond the track length of {duration}s")]
    SeekOutOfRange { second: u32, duration: u32 },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// The native library failed the request.
    #[error("Native error: {0}")]
    Native(BridgeError),

    /// Host-side failure (shutdown, lifetime violation).
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl PlaybackError {
    /// Returns `true` if the request was refused before any state changed.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            PlaybackError::UnplayableTrack(_)
                | PlaybackError::NoPlaybackSink
                | PlaybackError::NoTrackLoaded
                | PlaybackError::SeekOutOfRange { .. }
        )
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotPlayable(key) => PlaybackError::UnplayableTrack(key),
            BridgeError::NoAudioSink => PlaybackError::NoPlaybackSink,
            other => PlaybackError::Native(other),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
