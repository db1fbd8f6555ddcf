//! # Playback Module
//!
//! Host-side control of the native player.
//!
//! ## Overview
//!
//! This module handles:
//! - The session [`Player`]: play, seek, pause, resume and stop
//! - Playback refusals (`UnplayableTrack`, `NoPlaybackSink`) raised before
//!   any player state changes
//! - `endOfTrack` delivery from the native playback thread
//! - [`BufferedSink`], an [`AudioSink`](bridge_traits::AudioSink) that queues
//!   PCM for a host audio output

pub mod error;
pub mod player;
pub mod sink;

pub use error::{PlaybackError, Result};
pub use player::{PlaybackStatus, Player, PlayerSnapshot, PlayerState};
pub use sink::BufferedSink;
