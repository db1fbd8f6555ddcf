//! The native background thread.
//!
//! Every event the in-memory session produces is raised from this thread,
//! in the order the commands were queued.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::error::Result;
use bridge_traits::{
    ArtistBrowseKind, AudioFormat, ContainerChange, EntityKey, PlaylistChange, SearchQuery,
};
use core_runtime::{EventName, SignalSender};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::catalogue::Catalogue;
use crate::session::State;

/// Audio delivered to an attached sink per simulated second, in frames.
const FRAMES_PER_SECOND_DELIVERED: usize = 441;

pub(crate) enum Command {
    AlbumBrowse(EntityKey),
    ArtistBrowse(EntityKey, ArtistBrowseKind),
    Search(EntityKey, SearchQuery),
    PlaylistChanged(EntityKey, PlaylistChange),
    ContainerChanged(EntityKey, ContainerChange),
    Advance(u32),
    Shutdown,
}

pub(crate) struct Worker {
    pub(crate) shared: Arc<Mutex<State>>,
    pub(crate) commands: Receiver<Command>,
    pub(crate) signal: SignalSender,
    pub(crate) latency: Duration,
    pub(crate) format: AudioFormat,
}

impl Worker {
    pub(crate) fn run(self) {
        debug!("Native worker running");
        while let Ok(command) = self.commands.recv() {
            match command {
                Command::AlbumBrowse(album) => self.complete(
                    album,
                    EventName::BrowseComplete,
                    |catalogue| catalogue.album_browse(album),
                    |signal, result| signal.album_browse_complete(album, result),
                ),
                Command::ArtistBrowse(artist, kind) => self.complete(
                    artist,
                    EventName::BrowseComplete,
                    |catalogue| catalogue.artist_browse(artist, kind),
                    |signal, result| signal.artist_browse_complete(artist, result),
                ),
                Command::Search(search, query) => self.complete(
                    search,
                    EventName::SearchComplete,
                    |catalogue| Ok(catalogue.search(&query)),
                    |signal, result| signal.search_complete(search, result),
                ),
                Command::PlaylistChanged(playlist, change) => {
                    self.signal.playlist_changed(playlist, change)
                }
                Command::ContainerChanged(container, change) => {
                    self.signal.container_changed(container, change)
                }
                Command::Advance(seconds) => self.advance(seconds),
                Command::Shutdown => break,
            }
        }
        debug!("Native worker stopped");
    }

    /// Produces a request result from the catalogue and raises it, or raises
    /// a failure for `target`.
    fn complete<T>(
        &self,
        target: EntityKey,
        name: EventName,
        produce: impl FnOnce(&Catalogue) -> Result<T>,
        deliver: impl FnOnce(&SignalSender, T),
    ) {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let outcome = {
            let mut state = self.shared.lock();
            match state.fail_next.take() {
                Some(message) => Err(message),
                None => produce(&state.catalogue).map_err(|err| err.to_string()),
            }
        };

        match outcome {
            Ok(result) => deliver(&self.signal, result),
            Err(message) => {
                debug!(entity = %target, %message, "Request failed");
                self.signal.request_failed(target, name, message);
            }
        }
    }

    fn advance(&self, seconds: u32) {
        let (sink, finished) = {
            let mut state = self.shared.lock();
            let finished = match state.playback.as_mut() {
                Some(playback) if !playback.paused => {
                    playback.position = playback.position.saturating_add(seconds);
                    playback.position >= playback.track.duration_ms / 1000
                }
                _ => return,
            };
            if finished {
                state.playback = None;
            }
            (state.sink.clone(), finished)
        };

        if let Some(sink) = sink {
            let channels = usize::from(self.format.channels);
            let frames = FRAMES_PER_SECOND_DELIVERED * seconds as usize;
            let accepted = sink.deliver(&self.format, &vec![0i16; frames * channels]);
            trace!(frames, accepted, "Audio delivered");
        }

        if finished {
            self.signal.end_of_track();
        }
    }
}
