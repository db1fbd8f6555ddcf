//! Artist handles and artist browse.

use std::cell::Cell;
use std::rc::Rc;

use bridge_traits::{ArtistBrowseData, ArtistBrowseKind, ArtistData, EntityKind};
use core_host::{Disposition, Entity, Operation, OperationState, Proxy, RequestOutcome, Result};
use core_runtime::{EventName, EventPayload, PendingEvent};

use crate::album::Album;
use crate::track::Track;

pub struct ArtistState {
    browse: Operation<ArtistState, ArtistBrowseData>,
    browse_kind: Cell<Option<ArtistBrowseKind>>,
}

impl Entity for ArtistState {
    const KIND: EntityKind = EntityKind::Artist;
    type Data = ArtistData;

    fn from_snapshot(data: &ArtistData) -> Self {
        Self {
            browse: Operation::new(data.key),
            browse_kind: Cell::new(None),
        }
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        if event.name != EventName::BrowseComplete {
            return Ok(Disposition::Forward);
        }
        crate::complete_from_event(&proxy.state().browse, proxy, event, |payload| {
            match payload {
                EventPayload::ArtistBrowse(result) => Some((**result).clone()),
                _ => None,
            }
        })
    }
}

entity_handle!(
    /// An artist. Tracks, albums, similar artists and biography need a browse.
    Artist => ArtistState
);

impl Artist {
    pub fn name(&self) -> String {
        self.0.data().name.clone()
    }

    pub fn link(&self) -> String {
        self.0.data().link.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    /// Starts an artist browse of the given kind.
    ///
    /// Only the first request reaches the native library. Later requests,
    /// whatever their kind, are rejected while it runs and answered from the
    /// cached result once it completes.
    pub fn browse<F>(&self, kind: ArtistBrowseKind, callback: F) -> Result<RequestOutcome>
    where
        F: Fn(Artist, Result<()>) + 'static,
    {
        let key = self.key();
        let state = self.0.state();
        let outcome = state.browse.request(
            &self.0,
            Rc::new(move |proxy: Proxy<ArtistState>, result: Result<()>| {
                callback(Artist(proxy), result)
            }),
            move |native| native.issue_artist_browse(key, kind),
        )?;
        if outcome == RequestOutcome::Issued {
            state.browse_kind.set(Some(kind));
        }
        Ok(outcome)
    }

    pub fn browse_state(&self) -> OperationState {
        self.0.state().browse.state()
    }

    /// The kind of the browse that was issued, if any.
    pub fn browse_kind(&self) -> Option<ArtistBrowseKind> {
        self.0.state().browse_kind.get()
    }

    pub fn tracks(&self) -> Result<Vec<Track>> {
        let result = self.0.state().browse.result()?;
        Ok(crate::handles(&self.0.host()?, &result.tracks, Track::from_data))
    }

    pub fn tophit_tracks(&self) -> Result<Vec<Track>> {
        let result = self.0.state().browse.result()?;
        Ok(crate::handles(
            &self.0.host()?,
            &result.tophit_tracks,
            Track::from_data,
        ))
    }

    pub fn albums(&self) -> Result<Vec<Album>> {
        let result = self.0.state().browse.result()?;
        Ok(crate::handles(&self.0.host()?, &result.albums, Album::from_data))
    }

    pub fn similar_artists(&self) -> Result<Vec<Artist>> {
        let result = self.0.state().browse.result()?;
        Ok(crate::handles(
            &self.0.host()?,
            &result.similar_artists,
            Artist::from_data,
        ))
    }

    pub fn biography(&self) -> Result<String> {
        Ok(self.0.state().browse.result()?.biography.clone())
    }
}
