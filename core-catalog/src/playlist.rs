//! # Playlists
//!
//! Playlist handles, playlist editing and change notifications.
//!
//! ## Editing
//!
//! Track edits are validated locally (`IndexOutOfRange`, `InvalidArgument`)
//! before the native call and refused natively with `PermissionDenied` when
//! the session user may not edit the playlist. The local track list is not
//! touched by the edit itself: the native library reports every change back
//! as a notification, and the proxy applies it to its snapshot before any
//! subscribed callback runs.
//!
//! ## Notifications
//!
//! ```ignore
//! playlist.on(
//!     CallbackTable::new()
//!         .on(EventName::TracksAdded, |inv| println!("added to {:?}", inv.target))
//!         .on(EventName::PlaylistRenamed, |_| println!("renamed")),
//! )?;
//! ```
//!
//! `on` replaces the whole table and starts native notifications; `off`
//! stops them. Dropping the last handle to a playlist that `on` was called
//! on does the same as `off`.
//!
//! Snapshots of proxies already alive are never overwritten by copies from
//! other results, such as a container listing, so applied changes stay.

use std::cell::Cell;

use chrono::{DateTime, Utc};

use bridge_traits::{
    model::{move_positions, remove_positions},
    EntityKey, EntityKind, NativeSession, PlaylistChange, PlaylistData, PlaylistTrackData,
};
use core_host::{CallbackTable, Disposition, Entity, HostError, Proxy, Result};
use core_runtime::{EventPayload, PendingEvent};
use tracing::{debug, warn};

use crate::track::Track;
use crate::user::User;

#[derive(Debug, Default)]
pub struct PlaylistState {
    /// Whether `on` has turned native change notifications on.
    notifications: Cell<bool>,
}

impl Entity for PlaylistState {
    const KIND: EntityKind = EntityKind::Playlist;
    type Data = PlaylistData;

    fn from_snapshot(_: &PlaylistData) -> Self {
        PlaylistState::default()
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        if let EventPayload::Playlist(change) = &event.payload {
            proxy.update_data(|data| apply_change(data, change));
        }
        Ok(Disposition::Forward)
    }

    fn on_release(&self, key: EntityKey, native: &dyn NativeSession) {
        if self.notifications.get() {
            crate::stop_notifications(key, native);
        }
    }
}

/// Applies a change notification to a playlist snapshot.
///
/// Positions outside the current list are ignored.
pub fn apply_change(data: &mut PlaylistData, change: &PlaylistChange) {
    match change {
        PlaylistChange::Renamed { name } => data.name = name.clone(),
        PlaylistChange::TracksAdded { tracks, position } => {
            let at = (*position).min(data.tracks.len());
            data.tracks.splice(at..at, tracks.iter().cloned());
        }
        PlaylistChange::TracksRemoved { positions } => {
            remove_positions(&mut data.tracks, positions);
        }
        PlaylistChange::TracksMoved {
            positions,
            new_position,
        } => move_positions(&mut data.tracks, positions, *new_position),
        PlaylistChange::TrackCreatedChanged {
            position,
            creator,
            create_time,
        } => {
            if let Some(entry) = entry_at(data, *position) {
                entry.creator = creator.clone();
                entry.create_time = *create_time;
            }
        }
        PlaylistChange::TrackSeenChanged { position, seen } => {
            if let Some(entry) = entry_at(data, *position) {
                entry.seen = *seen;
            }
        }
        PlaylistChange::TrackMessageChanged { position, message } => {
            if let Some(entry) = entry_at(data, *position) {
                entry.message = message.clone();
            }
        }
    }
}

fn entry_at(data: &mut PlaylistData, position: usize) -> Option<&mut PlaylistTrackData> {
    let key = data.key;
    let entry = data.tracks.get_mut(position);
    if entry.is_none() {
        warn!(playlist = %key, position, "Change for a position outside the playlist");
    }
    entry
}

entity_handle!(
    /// A playlist.
    Playlist => PlaylistState
);

/// A track together with its playlist entry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistTrack {
    pub track: Track,
    pub creator: Option<User>,
    pub seen: bool,
    pub create_time: DateTime<Utc>,
    pub message: Option<String>,
}

impl Playlist {
    pub fn name(&self) -> String {
        self.0.data().name.clone()
    }

    /// Renames the playlist.
    pub fn set_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(HostError::InvalidArgument(
                "Playlist name must not be empty".to_string(),
            ));
        }
        self.0.host()?.native().rename_playlist(self.key(), name)?;
        self.0.update_data(|data| data.name = name.to_string());
        Ok(())
    }

    pub fn link(&self) -> String {
        self.0.data().link.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    pub fn description(&self) -> Option<String> {
        self.0.data().description.clone()
    }

    pub fn owner(&self) -> Result<Option<User>> {
        let owner = self.0.data().owner.clone();
        match owner {
            Some(data) => Ok(Some(User::from_data(&self.0.host()?, data))),
            None => Ok(None),
        }
    }

    pub fn is_collaborative(&self) -> bool {
        self.0.data().collaborative
    }

    pub fn set_collaborative(&self, collaborative: bool) -> Result<()> {
        self.0
            .host()?
            .native()
            .set_collaborative(self.key(), collaborative)?;
        self.0.update_data(|data| data.collaborative = collaborative);
        Ok(())
    }

    pub fn num_tracks(&self) -> usize {
        self.0.data().tracks.len()
    }

    /// The track at `position` with its entry metadata.
    pub fn track(&self, position: usize) -> Result<PlaylistTrack> {
        let entry = {
            let data = self.0.data();
            HostError::check_index(position, data.tracks.len())?;
            data.tracks[position].clone()
        };
        self.entry_handle(entry)
    }

    pub fn tracks(&self) -> Result<Vec<PlaylistTrack>> {
        let entries = self.0.data().tracks.clone();
        entries
            .into_iter()
            .map(|entry| self.entry_handle(entry))
            .collect()
    }

    fn entry_handle(&self, entry: PlaylistTrackData) -> Result<PlaylistTrack> {
        let host = self.0.host()?;
        Ok(PlaylistTrack {
            track: Track::from_data(&host, entry.track),
            creator: entry.creator.map(|data| User::from_data(&host, data)),
            seen: entry.seen,
            create_time: entry.create_time,
            message: entry.message,
        })
    }

    /// Inserts `tracks` before `position`. A position equal to the track
    /// count appends.
    pub fn add_tracks(&self, tracks: &[Track], position: usize) -> Result<()> {
        if tracks.is_empty() {
            return Err(HostError::InvalidArgument(
                "No tracks to add".to_string(),
            ));
        }
        crate::check_insert_position(position, self.num_tracks())?;

        let keys = crate::entity_key_list(tracks, Track::key);
        self.0
            .host()?
            .native()
            .add_tracks(self.key(), &keys, position)?;
        debug!(playlist = %self.key(), count = keys.len(), position, "Tracks added");
        Ok(())
    }

    pub fn remove_tracks(&self, positions: &[usize]) -> Result<()> {
        self.check_positions(positions)?;
        self.0
            .host()?
            .native()
            .remove_tracks(self.key(), positions)?;
        debug!(playlist = %self.key(), ?positions, "Tracks removed");
        Ok(())
    }

    /// Moves the tracks at `positions` in front of the track currently at
    /// `new_position`.
    pub fn reorder_tracks(&self, positions: &[usize], new_position: usize) -> Result<()> {
        self.check_positions(positions)?;
        crate::check_insert_position(new_position, self.num_tracks())?;
        self.0
            .host()?
            .native()
            .reorder_tracks(self.key(), positions, new_position)?;
        debug!(playlist = %self.key(), ?positions, new_position, "Tracks reordered");
        Ok(())
    }

    fn check_positions(&self, positions: &[usize]) -> Result<()> {
        if positions.is_empty() {
            return Err(HostError::InvalidArgument(
                "No track positions given".to_string(),
            ));
        }
        let len = self.num_tracks();
        positions
            .iter()
            .try_for_each(|&position| HostError::check_index(position, len))
    }

    /// Installs `table` as this playlist's callbacks and starts native
    /// change notifications.
    pub fn on(&self, table: CallbackTable) -> Result<()> {
        let host = self.0.host()?;
        if !self.0.state().notifications.get() {
            host.native().set_notifications(self.key(), true)?;
            self.0.state().notifications.set(true);
        }
        host.subscribe(&self.0, table);
        Ok(())
    }

    /// Removes this playlist's callbacks and stops native notifications.
    pub fn off(&self) -> Result<()> {
        let host = self.0.host()?;
        host.unsubscribe(&self.0);
        if self.0.state().notifications.replace(false) {
            host.native().set_notifications(self.key(), false)?;
        }
        Ok(())
    }

    /// Whether native change notifications are on for this playlist.
    pub fn is_observed(&self) -> bool {
        self.0.state().notifications.get()
    }
}
