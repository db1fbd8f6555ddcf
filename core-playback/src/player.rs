//! # Player
//!
//! The session-wide player. There is exactly one per host, keyed by
//! [`EntityKey::PLAYER`]; [`Player::new`] returns the live instance when one
//! exists.
//!
//! ## Output
//!
//! Audio either plays through the native library's own output
//! (`BridgeConfig::native_audio`) or is delivered to an [`AudioSink`]
//! registered with [`Player::use_audio_sink`]. Starting playback with
//! neither configured fails with [`PlaybackError::NoPlaybackSink`].
//!
//! ## End of track
//!
//! When the native library finishes a track it raises `endOfTrack` at the
//! player. The player returns to [`PlaybackStatus::Stopped`] before the event
//! reaches the player's callback table (or the global table).

use std::cell::Cell;
use std::sync::Arc;

use bridge_traits::{AudioSink, EntityKey, EntityKind, Snapshot, TrackData};
use core_catalog::Track;
use core_host::{CallbackTable, Disposition, Entity, Host, Proxy};
use core_runtime::{EventName, PendingEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlaybackError, Result};

/// Playback status as tracked on the host thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Host-side player snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub key: EntityKey,
    pub status: PlaybackStatus,
    pub track: Option<TrackData>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            key: EntityKey::PLAYER,
            status: PlaybackStatus::Stopped,
            track: None,
        }
    }
}

impl Snapshot for PlayerSnapshot {
    fn key(&self) -> EntityKey {
        self.key
    }
}

#[derive(Debug)]
pub struct PlayerState {
    sink_attached: Cell<bool>,
}

impl Entity for PlayerState {
    const KIND: EntityKind = EntityKind::Player;
    type Data = PlayerSnapshot;

    fn from_snapshot(_: &PlayerSnapshot) -> Self {
        Self {
            sink_attached: Cell::new(false),
        }
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> core_host::Result<Disposition> {
        if event.name == EventName::EndOfTrack {
            let finished = proxy.update_data(|data| {
                data.status = PlaybackStatus::Stopped;
                data.track.take()
            });
            debug!(track = ?finished.map(|track| track.key), "End of track");
        }
        Ok(Disposition::Forward)
    }
}

/// Handle to the session player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player(Proxy<PlayerState>);

impl Player {
    /// Returns the host's player, creating it on first use.
    ///
    /// The player lives only as long as some `Player` handle does. Dropping
    /// the last one forgets its status, its attached sink flag and the
    /// table installed with [`Player::on`]; `endOfTrack` then reaches the
    /// global table only. `Session` keeps a handle for its whole lifetime;
    /// hosts driving a bare [`Host`] must keep one themselves.
    pub fn new(host: &Host) -> Self {
        let proxy = host
            .lookup_as::<PlayerState>(EntityKey::PLAYER)
            .unwrap_or_else(|| host.proxy_for::<PlayerState>(PlayerSnapshot::default()));
        Self(proxy)
    }

    pub fn key(&self) -> EntityKey {
        self.0.key()
    }

    pub fn proxy(&self) -> &Proxy<PlayerState> {
        &self.0
    }

    pub fn status(&self) -> PlaybackStatus {
        self.0.data().status
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    /// The loaded track, if any.
    pub fn current_track(&self) -> Result<Option<Track>> {
        let track = self.0.data().track.clone();
        match track {
            Some(data) => Ok(Some(Track::from_data(&self.0.host()?, data))),
            None => Ok(None),
        }
    }

    /// Whether started playback would have somewhere to go.
    pub fn has_output(&self) -> Result<bool> {
        let host = self.0.host()?;
        Ok(host.config().native_audio || self.0.state().sink_attached.get())
    }

    /// Loads and starts `track`.
    ///
    /// # Errors
    ///
    /// - `UnplayableTrack` if the track is not available to this user; the
    ///   player is left as it was
    /// - `NoPlaybackSink` if no audio output is configured
    pub fn play(&self, track: &Track) -> Result<()> {
        if !track.is_playable() {
            return Err(PlaybackError::UnplayableTrack(track.key()));
        }
        if !self.has_output()? {
            return Err(PlaybackError::NoPlaybackSink);
        }

        self.0.host()?.native().issue_play(track.key())?;
        let data = track.snapshot();
        info!(track = %data.key, name = %data.name, "Playback started");
        self.0.update_data(|player| {
            player.status = PlaybackStatus::Playing;
            player.track = Some(data);
        });
        Ok(())
    }

    /// Seeks within the loaded track.
    pub fn seek(&self, second: u32) -> Result<()> {
        let duration = match &self.0.data().track {
            Some(track) => track.duration_ms / 1000,
            None => return Err(PlaybackError::NoTrackLoaded),
        };
        if second > duration {
            return Err(PlaybackError::SeekOutOfRange { second, duration });
        }
        self.0.host()?.native().issue_seek(second)?;
        debug!(second, "Seek");
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.ensure_loaded()?;
        self.0.host()?.native().issue_pause()?;
        self.0
            .update_data(|player| player.status = PlaybackStatus::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        self.ensure_loaded()?;
        self.0.host()?.native().issue_resume()?;
        self.0
            .update_data(|player| player.status = PlaybackStatus::Playing);
        Ok(())
    }

    /// Stops playback and unloads the track. Stopping an idle player is a
    /// no-op.
    pub fn stop(&self) -> Result<()> {
        if self.0.data().track.is_none() {
            return Ok(());
        }
        self.0.host()?.native().issue_stop()?;
        self.0.update_data(|player| {
            player.status = PlaybackStatus::Stopped;
            player.track = None;
        });
        info!("Playback stopped");
        Ok(())
    }

    /// Playback position in seconds; 0 when nothing is loaded.
    pub fn current_second(&self) -> Result<u32> {
        if self.0.data().track.is_none() {
            return Ok(0);
        }
        Ok(self.0.host()?.native().current_second())
    }

    /// Routes decoded audio to `sink` instead of the native output.
    pub fn use_audio_sink(&self, sink: Arc<dyn AudioSink>) -> Result<()> {
        self.0.host()?.native().attach_audio_sink(sink)?;
        self.0.state().sink_attached.set(true);
        debug!("Audio sink attached");
        Ok(())
    }

    /// Installs `table` as the player's callbacks (`endOfTrack`).
    ///
    /// The table is dropped together with the last player handle.
    pub fn on(&self, table: CallbackTable) -> Result<()> {
        self.0.host()?.subscribe(&self.0, table);
        Ok(())
    }

    pub fn off(&self) -> Result<()> {
        self.0.host()?.unsubscribe(&self.0);
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.0.data().track.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        Ok(())
    }
}
