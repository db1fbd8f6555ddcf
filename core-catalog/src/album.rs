//! Album handles and album browse.

use std::rc::Rc;

use bridge_traits::{AlbumBrowseData, AlbumData, EntityKind};
use core_host::{
    Disposition, Entity, HostError, Operation, OperationState, Proxy, RequestOutcome, Result,
};
use core_runtime::{EventName, EventPayload, PendingEvent};

use crate::artist::Artist;
use crate::track::Track;

pub struct AlbumState {
    browse: Operation<AlbumState, AlbumBrowseData>,
}

impl Entity for AlbumState {
    const KIND: EntityKind = EntityKind::Album;
    type Data = AlbumData;

    fn from_snapshot(data: &AlbumData) -> Self {
        Self {
            browse: Operation::new(data.key),
        }
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        if event.name != EventName::BrowseComplete {
            return Ok(Disposition::Forward);
        }
        crate::complete_from_event(&proxy.state().browse, proxy, event, |payload| {
            match payload {
                EventPayload::AlbumBrowse(result) => Some((**result).clone()),
                _ => None,
            }
        })
    }
}

entity_handle!(
    /// An album. Tracks, review, copyrights and artist need a browse.
    Album => AlbumState
);

impl Album {
    pub fn name(&self) -> String {
        self.0.data().name.clone()
    }

    pub fn link(&self) -> String {
        self.0.data().link.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    /// JPEG cover art, base64 encoded, once the native side has loaded it.
    pub fn cover(&self) -> Option<String> {
        self.0.data().cover_base64.clone()
    }

    /// Starts an album browse. `callback` runs on the host thread once the
    /// browse completes, or immediately if it already has.
    ///
    /// # Errors
    ///
    /// - `OperationAlreadyInProgress` if a browse is running (reject policy)
    /// - the native error if the browse could not be issued
    pub fn browse<F>(&self, callback: F) -> Result<RequestOutcome>
    where
        F: Fn(Album, Result<()>) + 'static,
    {
        let key = self.key();
        self.0.state().browse.request(
            &self.0,
            Rc::new(move |proxy: Proxy<AlbumState>, result: Result<()>| {
                callback(Album(proxy), result)
            }),
            move |native| native.issue_album_browse(key),
        )
    }

    pub fn browse_state(&self) -> OperationState {
        self.0.state().browse.state()
    }

    pub fn is_browsed(&self) -> bool {
        self.0.state().browse.is_complete()
    }

    pub fn tracks(&self) -> Result<Vec<Track>> {
        let result = self.0.state().browse.result()?;
        let host = self.0.host()?;
        Ok(crate::handles(&host, &result.tracks, Track::from_data))
    }

    pub fn num_tracks(&self) -> Result<usize> {
        Ok(self.0.state().browse.result()?.tracks.len())
    }

    pub fn track(&self, index: usize) -> Result<Track> {
        let result = self.0.state().browse.result()?;
        let data = result
            .tracks
            .get(index)
            .cloned()
            .ok_or(HostError::IndexOutOfRange {
                index,
                len: result.tracks.len(),
            })?;
        Ok(Track::from_data(&self.0.host()?, data))
    }

    pub fn review(&self) -> Result<String> {
        Ok(self.0.state().browse.result()?.review.clone())
    }

    pub fn copyrights(&self) -> Result<Vec<String>> {
        Ok(self.0.state().browse.result()?.copyrights.clone())
    }

    pub fn artist(&self) -> Result<Option<Artist>> {
        let result = self.0.state().browse.result()?;
        let host = self.0.host()?;
        Ok(result
            .artist
            .clone()
            .map(|data| Artist::from_data(&host, data)))
    }
}
