//! Native client library boundary.
//!
//! [`NativeSession`] is every outgoing call the host makes into the native
//! library. Calls return as soon as the request is accepted; anything
//! asynchronous (browse, search, end of track, change notifications) comes
//! back later as an event raised from the native background thread.
//!
//! Implementations must never call back into host-owned objects. The only
//! way back is the cross-thread signal they were constructed with.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    ArtistBrowseKind, EntityKey, LinkTarget, PlaylistContainerData, PlaylistData, SearchQuery,
    UserData,
};
use crate::playback::AudioSink;

/// Outgoing calls into the native client library.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::{EntityKey, NativeSession};
///
/// fn browse(native: &dyn NativeSession) -> bridge_traits::error::Result<()> {
///     // Accepted now, completion arrives later as `browseComplete`.
///     native.issue_album_browse(EntityKey::album(42))
/// }
/// ```
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait NativeSession: Send + Sync {
    // ------------------------------------------------------------------
    // Asynchronous requests
    // ------------------------------------------------------------------

    /// Starts an album browse. Completion is raised for `album`.
    fn issue_album_browse(&self, album: EntityKey) -> Result<()>;

    /// Starts an artist browse of the given kind. Completion is raised for `artist`.
    fn issue_artist_browse(&self, artist: EntityKey, kind: ArtistBrowseKind) -> Result<()>;

    /// Starts a search. `search` is a host-allocated key the completion is raised for.
    fn issue_search(&self, search: EntityKey, query: &SearchQuery) -> Result<()>;

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    fn issue_play(&self, track: EntityKey) -> Result<()>;

    fn issue_seek(&self, second: u32) -> Result<()>;

    fn issue_pause(&self) -> Result<()>;

    fn issue_resume(&self) -> Result<()>;

    fn issue_stop(&self) -> Result<()>;

    /// Playback position of the loaded track, in whole seconds.
    fn current_second(&self) -> u32;

    /// Routes decoded audio to `sink` instead of the native output.
    fn attach_audio_sink(&self, sink: Arc<dyn AudioSink>) -> Result<()>;

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn set_starred(&self, tracks: &[EntityKey], starred: bool) -> Result<()>;

    fn rename_playlist(&self, playlist: EntityKey, name: &str) -> Result<()>;

    fn set_collaborative(&self, playlist: EntityKey, collaborative: bool) -> Result<()>;

    fn add_tracks(&self, playlist: EntityKey, tracks: &[EntityKey], position: usize)
        -> Result<()>;

    fn remove_tracks(&self, playlist: EntityKey, positions: &[usize]) -> Result<()>;

    fn reorder_tracks(
        &self,
        playlist: EntityKey,
        positions: &[usize],
        new_position: usize,
    ) -> Result<()>;

    /// Creates a playlist at the end of the container.
    fn add_playlist(&self, container: EntityKey, name: &str) -> Result<PlaylistData>;

    fn add_folder(&self, container: EntityKey, index: usize, name: &str) -> Result<()>;

    fn remove_playlist(&self, container: EntityKey, index: usize) -> Result<()>;

    fn move_playlist(&self, container: EntityKey, index: usize, new_position: usize)
        -> Result<()>;

    /// Starts or stops change notifications for a playlist or container.
    fn set_notifications(&self, entity: EntityKey, enabled: bool) -> Result<()>;

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    fn session_user(&self) -> Result<UserData>;

    fn session_container(&self) -> Result<PlaylistContainerData>;

    fn published_container(&self, user: EntityKey) -> Result<PlaylistContainerData>;

    fn starred_playlist(&self, user: EntityKey) -> Result<PlaylistData>;

    fn resolve_link(&self, link: &str) -> Result<LinkTarget>;
}
