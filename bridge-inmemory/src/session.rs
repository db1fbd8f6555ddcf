//! [`NativeSession`] backed by the in-memory catalogue.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{
    ArtistBrowseKind, AudioFormat, AudioSink, ContainerChange, EntityKey, EntityKind, LinkTarget,
    NativeSession, PlaylistChange, PlaylistContainerData, PlaylistData, SearchQuery, TrackData,
    UserData,
};
use core_runtime::SignalSender;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::catalogue::Catalogue;
use crate::worker::{Command, Worker};

/// Settings for the in-memory native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InMemoryConfig {
    /// The library plays through its own (silent) output device.
    pub native_audio: bool,
    /// Delay before each browse or search completes.
    pub latency: Duration,
    /// Format of the audio handed to an attached sink.
    pub playback_format: AudioFormat,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            native_audio: false,
            latency: Duration::ZERO,
            playback_format: AudioFormat::default(),
        }
    }
}

impl InMemoryConfig {
    pub fn with_native_audio(mut self, enabled: bool) -> Self {
        self.native_audio = enabled;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

pub(crate) struct Playback {
    pub(crate) track: TrackData,
    pub(crate) position: u32,
    pub(crate) paused: bool,
}

/// State shared between the calling thread and the worker.
pub(crate) struct State {
    pub(crate) catalogue: Catalogue,
    pub(crate) notifications: HashSet<EntityKey>,
    pub(crate) playback: Option<Playback>,
    pub(crate) sink: Option<Arc<dyn AudioSink>>,
    pub(crate) fail_next: Option<String>,
}

/// A native client library simulated in memory.
///
/// Requests are accepted on the calling thread and completed on a dedicated
/// worker thread, which raises every event through the [`SignalSender`] the
/// session was spawned with.
pub struct InMemorySession {
    shared: Arc<Mutex<State>>,
    commands: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
    native_audio: bool,
}

impl InMemorySession {
    /// Starts the worker thread.
    pub fn spawn(catalogue: Catalogue, config: InMemoryConfig, signal: SignalSender) -> Result<Self> {
        let shared = Arc::new(Mutex::new(State {
            catalogue,
            notifications: HashSet::new(),
            playback: None,
            sink: None,
            fail_next: None,
        }));
        let (commands, receiver) = crossbeam_channel::unbounded();
        let worker = Worker {
            shared: Arc::clone(&shared),
            commands: receiver,
            signal,
            latency: config.latency,
            format: config.playback_format,
        };

        let handle = std::thread::Builder::new()
            .name("inmemory-native".to_string())
            .spawn(move || worker.run())
            .map_err(|err| {
                BridgeError::NotAvailable(format!("Failed to start native worker: {}", err))
            })?;

        info!(native_audio = config.native_audio, "In-memory native session started");
        Ok(Self {
            shared,
            commands,
            worker: Mutex::new(Some(handle)),
            native_audio: config.native_audio,
        })
    }

    /// Plays `seconds` of the loaded track. Reaching the end raises
    /// `endOfTrack`.
    pub fn advance_playback(&self, seconds: u32) -> Result<()> {
        self.send(Command::Advance(seconds))
    }

    /// Makes the next browse or search complete with a failure.
    pub fn fail_next_request(&self, message: impl Into<String>) {
        self.shared.lock().fail_next = Some(message.into());
    }

    pub fn notifications_enabled(&self, entity: EntityKey) -> bool {
        self.shared.lock().notifications.contains(&entity)
    }

    pub fn is_playing(&self) -> bool {
        self.shared
            .lock()
            .playback
            .as_ref()
            .is_some_and(|playback| !playback.paused)
    }

    /// Stops the worker thread. Further requests fail with `NotAvailable`.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                warn!("Native worker panicked");
            }
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| BridgeError::NotAvailable("Native worker has stopped".to_string()))
    }

    fn ensure_running(&self) -> Result<()> {
        if self.worker.lock().is_some() {
            Ok(())
        } else {
            Err(BridgeError::NotAvailable("Native worker has stopped".to_string()))
        }
    }

    fn notify_playlist(&self, playlist: EntityKey, change: PlaylistChange) -> Result<()> {
        if self.notifications_enabled(playlist) {
            self.send(Command::PlaylistChanged(playlist, change))?;
        }
        Ok(())
    }

    fn notify_container(&self, container: EntityKey, change: ContainerChange) -> Result<()> {
        if self.notifications_enabled(container) {
            self.send(Command::ContainerChanged(container, change))?;
        }
        Ok(())
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl NativeSession for InMemorySession {
    fn issue_album_browse(&self, album: EntityKey) -> Result<()> {
        self.shared.lock().catalogue.album(album)?;
        self.send(Command::AlbumBrowse(album))
    }

    fn issue_artist_browse(&self, artist: EntityKey, kind: ArtistBrowseKind) -> Result<()> {
        self.shared.lock().catalogue.artist(artist)?;
        self.send(Command::ArtistBrowse(artist, kind))
    }

    fn issue_search(&self, search: EntityKey, query: &SearchQuery) -> Result<()> {
        debug!(%search, query = %query.query, "Search accepted");
        self.send(Command::Search(search, query.clone()))
    }

    fn issue_play(&self, track: EntityKey) -> Result<()> {
        self.ensure_running()?;
        let mut state = self.shared.lock();
        let data = state.catalogue.track(track)?;
        if !data.is_playable() {
            return Err(BridgeError::NotPlayable(track));
        }
        if !self.native_audio && state.sink.is_none() {
            return Err(BridgeError::NoAudioSink);
        }
        debug!(%track, "Playback started");
        state.playback = Some(Playback {
            track: data,
            position: 0,
            paused: false,
        });
        Ok(())
    }

    fn issue_seek(&self, second: u32) -> Result<()> {
        let mut state = self.shared.lock();
        let playback = state
            .playback
            .as_mut()
            .ok_or_else(|| BridgeError::OperationFailed("No track loaded".to_string()))?;
        playback.position = second;
        Ok(())
    }

    fn issue_pause(&self) -> Result<()> {
        self.set_paused(true)
    }

    fn issue_resume(&self) -> Result<()> {
        self.set_paused(false)
    }

    fn issue_stop(&self) -> Result<()> {
        let sink = {
            let mut state = self.shared.lock();
            state.playback = None;
            state.sink.clone()
        };
        if let Some(sink) = sink {
            sink.flush();
        }
        Ok(())
    }

    fn current_second(&self) -> u32 {
        self.shared
            .lock()
            .playback
            .as_ref()
            .map_or(0, |playback| playback.position)
    }

    fn attach_audio_sink(&self, sink: Arc<dyn AudioSink>) -> Result<()> {
        self.shared.lock().sink = Some(sink);
        Ok(())
    }

    fn set_starred(&self, tracks: &[EntityKey], starred: bool) -> Result<()> {
        self.shared.lock().catalogue.set_starred(tracks, starred)
    }

    fn rename_playlist(&self, playlist: EntityKey, name: &str) -> Result<()> {
        let change = self.shared.lock().catalogue.rename_playlist(playlist, name)?;
        self.notify_playlist(playlist, change)
    }

    fn set_collaborative(&self, playlist: EntityKey, collaborative: bool) -> Result<()> {
        self.shared
            .lock()
            .catalogue
            .set_collaborative(playlist, collaborative)
    }

    fn add_tracks(&self, playlist: EntityKey, tracks: &[EntityKey], position: usize) -> Result<()> {
        let change = self
            .shared
            .lock()
            .catalogue
            .add_tracks(playlist, tracks, position)?;
        self.notify_playlist(playlist, change)
    }

    fn remove_tracks(&self, playlist: EntityKey, positions: &[usize]) -> Result<()> {
        let change = self
            .shared
            .lock()
            .catalogue
            .remove_tracks(playlist, positions)?;
        self.notify_playlist(playlist, change)
    }

    fn reorder_tracks(
        &self,
        playlist: EntityKey,
        positions: &[usize],
        new_position: usize,
    ) -> Result<()> {
        let change = self
            .shared
            .lock()
            .catalogue
            .reorder_tracks(playlist, positions, new_position)?;
        self.notify_playlist(playlist, change)
    }

    fn add_playlist(&self, container: EntityKey, name: &str) -> Result<PlaylistData> {
        let (playlist, change) = self
            .shared
            .lock()
            .catalogue
            .create_playlist(container, name)?;
        self.notify_container(container, change)?;
        Ok(playlist)
    }

    fn add_folder(&self, container: EntityKey, index: usize, name: &str) -> Result<()> {
        let changes = self
            .shared
            .lock()
            .catalogue
            .create_folder(container, index, name)?;
        changes
            .into_iter()
            .try_for_each(|change| self.notify_container(container, change))
    }

    fn remove_playlist(&self, container: EntityKey, index: usize) -> Result<()> {
        let change = self
            .shared
            .lock()
            .catalogue
            .remove_entry(container, index)?;
        self.notify_container(container, change)
    }

    fn move_playlist(&self, container: EntityKey, index: usize, new_position: usize) -> Result<()> {
        let change = self
            .shared
            .lock()
            .catalogue
            .move_entry(container, index, new_position)?;
        self.notify_container(container, change)
    }

    fn set_notifications(&self, entity: EntityKey, enabled: bool) -> Result<()> {
        let mut state = self.shared.lock();
        match entity.kind {
            EntityKind::Playlist => {
                state.catalogue.playlist(entity)?;
            }
            EntityKind::PlaylistContainer => {
                state.catalogue.container(entity)?;
            }
            _ => {
                return Err(BridgeError::OperationFailed(format!(
                    "{} has no change notifications",
                    entity
                )))
            }
        }
        if enabled {
            state.notifications.insert(entity);
        } else {
            state.notifications.remove(&entity);
        }
        debug!(%entity, enabled, "Notifications toggled");
        Ok(())
    }

    fn session_user(&self) -> Result<UserData> {
        self.shared.lock().catalogue.session_user()
    }

    fn session_container(&self) -> Result<PlaylistContainerData> {
        let state = self.shared.lock();
        let user = state.catalogue.session_user()?;
        state.catalogue.container_of(user.key)
    }

    fn published_container(&self, user: EntityKey) -> Result<PlaylistContainerData> {
        self.shared.lock().catalogue.container_of(user)
    }

    fn starred_playlist(&self, user: EntityKey) -> Result<PlaylistData> {
        self.shared.lock().catalogue.starred_playlist(user)
    }

    fn resolve_link(&self, link: &str) -> Result<LinkTarget> {
        self.shared.lock().catalogue.resolve(link)
    }
}

impl InMemorySession {
    fn set_paused(&self, paused: bool) -> Result<()> {
        let mut state = self.shared.lock();
        match state.playback.as_mut() {
            Some(playback) => {
                playback.paused = paused;
                Ok(())
            }
            None => Err(BridgeError::OperationFailed("No track loaded".to_string())),
        }
    }
}
