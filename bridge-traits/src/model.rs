//! # Native Entity Model
//!
//! Identity keys and plain-data snapshots of the objects owned by the native
//! client library.
//!
//! ## Overview
//!
//! The native library owns every track, album, artist, playlist, folder,
//! container and user. The host never holds a native pointer: it holds an
//! [`EntityKey`] plus the most recent snapshot the native side handed over.
//! Snapshots are cheap to clone and serialize so host bindings can ship them
//! straight to scripting code.
//!
//! Browse and search results ([`AlbumBrowseData`], [`ArtistBrowseData`],
//! [`SearchResultData`]) only exist once the matching asynchronous request
//! completes and are immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity
// ============================================================================

/// Kind of native object a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Track,
    Album,
    Artist,
    Playlist,
    PlaylistFolder,
    PlaylistContainer,
    User,
    Search,
    Player,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Album => "album",
            EntityKind::Artist => "artist",
            EntityKind::Playlist => "playlist",
            EntityKind::PlaylistFolder => "playlistFolder",
            EntityKind::PlaylistContainer => "playlistContainer",
            EntityKind::User => "user",
            EntityKind::Search => "search",
            EntityKind::Player => "player",
        }
    }
}

/// Stable identity of a native object.
///
/// Two snapshots with the same key describe the same native object, which is
/// what the host registry uses to hand out one proxy per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityKey {
    /// The player is a process-wide singleton.
    pub const PLAYER: EntityKey = EntityKey::new(EntityKind::Player, 0);

    pub const fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub const fn track(id: u64) -> Self {
        Self::new(EntityKind::Track, id)
    }

    pub const fn album(id: u64) -> Self {
        Self::new(EntityKind::Album, id)
    }

    pub const fn artist(id: u64) -> Self {
        Self::new(EntityKind::Artist, id)
    }

    pub const fn playlist(id: u64) -> Self {
        Self::new(EntityKind::Playlist, id)
    }

    pub const fn folder(id: u64) -> Self {
        Self::new(EntityKind::PlaylistFolder, id)
    }

    pub const fn container(id: u64) -> Self {
        Self::new(EntityKind::PlaylistContainer, id)
    }

    pub const fn user(id: u64) -> Self {
        Self::new(EntityKind::User, id)
    }

    pub const fn search(id: u64) -> Self {
        Self::new(EntityKind::Search, id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// Implemented by every snapshot type so the host can key it.
pub trait Snapshot: Clone + fmt::Debug + 'static {
    fn key(&self) -> EntityKey;
}

macro_rules! impl_snapshot {
    ($($ty:ty),* $(,)?) => {
        $(impl Snapshot for $ty {
            fn key(&self) -> EntityKey {
                self.key
            }
        })*
    };
}

// ============================================================================
// Resident snapshots
// ============================================================================

/// Playability of a track as reported by the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackAvailability {
    Unavailable,
    Available,
    NotStreamable,
    BannedByArtist,
}

impl TrackAvailability {
    pub fn is_playable(&self) -> bool {
        matches!(self, TrackAvailability::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackData {
    pub key: EntityKey,
    pub name: String,
    pub link: String,
    pub duration_ms: u32,
    pub popularity: u8,
    pub availability: TrackAvailability,
    pub starred: bool,
    pub loaded: bool,
    pub artists: Vec<ArtistData>,
    pub album: Option<AlbumData>,
}

impl TrackData {
    pub fn is_playable(&self) -> bool {
        self.availability.is_playable()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumData {
    pub key: EntityKey,
    pub name: String,
    pub link: String,
    /// JPEG cover, base64 encoded, once the native image has loaded.
    pub cover_base64: Option<String>,
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistData {
    pub key: EntityKey,
    pub name: String,
    pub link: String,
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub key: EntityKey,
    pub link: String,
    pub canonical_name: String,
    pub display_name: String,
    pub loaded: bool,
}

/// A track as it sits inside a playlist, with its per-entry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrackData {
    pub track: TrackData,
    pub creator: Option<UserData>,
    pub seen: bool,
    pub create_time: DateTime<Utc>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistData {
    pub key: EntityKey,
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub collaborative: bool,
    pub loaded: bool,
    pub owner: Option<UserData>,
    pub tracks: Vec<PlaylistTrackData>,
}

/// Folder markers come in start/end pairs inside a container listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderBoundary {
    FolderStart,
    FolderEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistFolderData {
    pub key: EntityKey,
    pub name: String,
    pub boundary: FolderBoundary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ContainerItem {
    Playlist(PlaylistData),
    Folder(PlaylistFolderData),
}

impl ContainerItem {
    pub fn key(&self) -> EntityKey {
        match self {
            ContainerItem::Playlist(p) => p.key,
            ContainerItem::Folder(f) => f.key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContainerData {
    pub key: EntityKey,
    pub owner: Option<UserData>,
    pub loaded: bool,
    pub items: Vec<ContainerItem>,
}

impl_snapshot!(
    TrackData,
    AlbumData,
    ArtistData,
    UserData,
    PlaylistData,
    PlaylistFolderData,
    PlaylistContainerData,
);

/// Result of resolving a `spotify:` style link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LinkTarget {
    Track(TrackData),
    Album(AlbumData),
    Artist(ArtistData),
    Playlist(PlaylistData),
    User(UserData),
}

// ============================================================================
// Browse and search results
// ============================================================================

/// Which parts of an artist a browse should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtistBrowseKind {
    #[default]
    Full,
    NoTracks,
    NoAlbums,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumBrowseData {
    pub tracks: Vec<TrackData>,
    pub review: String,
    pub copyrights: Vec<String>,
    pub artist: Option<ArtistData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistBrowseData {
    pub tracks: Vec<TrackData>,
    pub tophit_tracks: Vec<TrackData>,
    pub albums: Vec<AlbumData>,
    pub similar_artists: Vec<ArtistData>,
    pub biography: String,
}

/// Offset and limit for one search category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub offset: u32,
    pub limit: u32,
}

impl SearchPage {
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

/// Search request as handed to the native library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    pub tracks: SearchPage,
    pub albums: SearchPage,
    pub artists: SearchPage,
    pub playlists: SearchPage,
}

impl SearchQuery {
    /// Builds a query that uses the same page for every category.
    pub fn uniform(query: impl Into<String>, page: SearchPage) -> Self {
        Self {
            query: query.into(),
            tracks: page,
            albums: page,
            artists: page,
            playlists: page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultData {
    pub did_you_mean: Option<String>,
    pub link: String,
    pub tracks: Vec<TrackData>,
    pub albums: Vec<AlbumData>,
    pub artists: Vec<ArtistData>,
    pub playlists: Vec<PlaylistData>,
    pub total_tracks: u32,
    pub total_albums: u32,
    pub total_artists: u32,
    pub total_playlists: u32,
}

// ============================================================================
// Change notifications
// ============================================================================

/// A change to a playlist the native library reports after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlaylistChange {
    Renamed {
        name: String,
    },
    TracksAdded {
        tracks: Vec<PlaylistTrackData>,
        position: usize,
    },
    TracksRemoved {
        positions: Vec<usize>,
    },
    TracksMoved {
        positions: Vec<usize>,
        new_position: usize,
    },
    TrackCreatedChanged {
        position: usize,
        creator: Option<UserData>,
        create_time: DateTime<Utc>,
    },
    TrackSeenChanged {
        position: usize,
        seen: bool,
    },
    TrackMessageChanged {
        position: usize,
        message: Option<String>,
    },
}

/// A change to a playlist container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContainerChange {
    PlaylistAdded { item: ContainerItem, position: usize },
    PlaylistRemoved { position: usize },
    PlaylistMoved { position: usize, new_position: usize },
}

/// Removes the entries at `positions`, keeping the order of the rest.
///
/// Positions past the end are ignored.
pub fn remove_positions<T>(items: &mut Vec<T>, positions: &[usize]) -> Vec<T> {
    let mut sorted: Vec<usize> = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut removed = Vec::with_capacity(sorted.len());
    for &pos in sorted.iter().rev() {
        if pos < items.len() {
            removed.push(items.remove(pos));
        }
    }
    removed.reverse();
    removed
}

/// Moves the entries at `positions` so they start in front of the entry that
/// was at `new_position` before the move.
///
/// Moved entries keep their relative order. A `new_position` equal to the
/// length appends them.
pub fn move_positions<T>(items: &mut Vec<T>, positions: &[usize], new_position: usize) {
    let shift = positions
        .iter()
        .filter(|&&p| p < new_position && p < items.len())
        .count();
    let moved = remove_positions(items, positions);
    let insert_at = new_position.saturating_sub(shift).min(items.len());
    for (offset, item) in moved.into_iter().enumerate() {
        items.insert(insert_at + offset, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_display() {
        assert_eq!(EntityKey::track(7).to_string(), "track:7");
        assert_eq!(EntityKey::container(1).to_string(), "playlistContainer:1");
        assert_eq!(EntityKey::PLAYER.to_string(), "player:0");
    }

    #[test]
    fn test_keys_of_different_kinds_differ() {
        assert_ne!(EntityKey::track(1), EntityKey::album(1));
    }

    #[test]
    fn test_only_available_tracks_are_playable() {
        assert!(TrackAvailability::Available.is_playable());
        assert!(!TrackAvailability::Unavailable.is_playable());
        assert!(!TrackAvailability::NotStreamable.is_playable());
        assert!(!TrackAvailability::BannedByArtist.is_playable());
    }

    #[test]
    fn test_remove_positions_keeps_order() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        let removed = remove_positions(&mut items, &[3, 1, 9]);
        assert_eq!(removed, vec!['b', 'd']);
        assert_eq!(items, vec!['a', 'c', 'e']);
    }

    #[test]
    fn test_move_positions_forward() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        move_positions(&mut items, &[0, 1], 4);
        assert_eq!(items, vec!['c', 'd', 'a', 'b', 'e']);
    }

    #[test]
    fn test_move_positions_backward() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        move_positions(&mut items, &[3, 4], 1);
        assert_eq!(items, vec!['a', 'd', 'e', 'b', 'c']);
    }

    #[test]
    fn test_move_positions_to_end() {
        let mut items = vec!['a', 'b', 'c'];
        move_positions(&mut items, &[0], 3);
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_container_item_serialization_is_tagged() {
        let item = ContainerItem::Folder(PlaylistFolderData {
            key: EntityKey::folder(4),
            name: "Rock".into(),
            boundary: FolderBoundary::FolderStart,
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "folder");
        assert_eq!(json["data"]["boundary"], "FOLDER_START");
    }
}
