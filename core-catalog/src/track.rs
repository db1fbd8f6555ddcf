//! Track handles.

use bridge_traits::{EntityKind, TrackAvailability, TrackData};
use core_host::{Entity, Result};
use tracing::debug;

use crate::album::Album;
use crate::artist::Artist;

/// Tracks carry no host state beyond their snapshot.
#[derive(Debug)]
pub struct TrackState;

impl Entity for TrackState {
    const KIND: EntityKind = EntityKind::Track;
    type Data = TrackData;

    fn from_snapshot(_: &TrackData) -> Self {
        TrackState
    }
}

entity_handle!(
    /// A track.
    Track => TrackState
);

impl Track {
    pub fn name(&self) -> String {
        self.0.data().name.clone()
    }

    pub fn link(&self) -> String {
        self.0.data().link.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    /// Duration in whole seconds.
    pub fn duration(&self) -> u32 {
        self.0.data().duration_ms / 1000
    }

    pub fn duration_ms(&self) -> u32 {
        self.0.data().duration_ms
    }

    /// Popularity from 0 to 100.
    pub fn popularity(&self) -> u8 {
        self.0.data().popularity
    }

    pub fn availability(&self) -> TrackAvailability {
        self.0.data().availability
    }

    pub fn is_playable(&self) -> bool {
        self.0.data().is_playable()
    }

    pub fn is_starred(&self) -> bool {
        self.0.data().starred
    }

    /// Stars or unstars the track for the session user.
    pub fn set_starred(&self, starred: bool) -> Result<()> {
        let host = self.0.host()?;
        host.native().set_starred(&[self.key()], starred)?;
        self.0.update_data(|data| data.starred = starred);
        debug!(track = %self.key(), starred, "Track starred flag changed");
        Ok(())
    }

    pub fn artists(&self) -> Result<Vec<Artist>> {
        let host = self.0.host()?;
        let artists = self.0.data().artists.clone();
        Ok(crate::handles(&host, &artists, Artist::from_data))
    }

    pub fn album(&self) -> Result<Option<Album>> {
        let host = self.0.host()?;
        let album = self.0.data().album.clone();
        Ok(album.map(|data| Album::from_data(&host, data)))
    }
}

/// Stars or unstars several tracks with one native call.
pub fn set_starred(tracks: &[Track], starred: bool) -> Result<()> {
    let Some(first) = tracks.first() else {
        return Ok(());
    };
    let host = first.0.host()?;
    let keys = crate::entity_key_list(tracks, Track::key);
    host.native().set_starred(&keys, starred)?;
    for track in tracks {
        track.0.update_data(|data| data.starred = starred);
    }
    Ok(())
}
