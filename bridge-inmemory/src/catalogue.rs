//! Seeded catalogue behind the in-memory session.
//!
//! The catalogue is plain data: it answers lookups, browses and searches, and
//! applies edits after checking ownership. Edits return the change
//! notification the session raises for subscribed entities.

use std::collections::{BTreeMap, BTreeSet};

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::model::{move_positions, remove_positions};
use bridge_traits::{
    AlbumBrowseData, AlbumData, ArtistBrowseData, ArtistBrowseKind, ArtistData, ContainerChange,
    ContainerItem, EntityKey, FolderBoundary, LinkTarget, PlaylistChange, PlaylistContainerData,
    PlaylistData, PlaylistFolderData, PlaylistTrackData, SearchPage, SearchQuery,
    SearchResultData, TrackData, UserData,
};
use chrono::{DateTime, Utc};

/// Longest playlist or folder name the catalogue accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Starred playlists are synthesized per user under this id offset.
const STARRED_PLAYLIST_BASE: u64 = 1_000_000;

const TOP_HITS: usize = 3;

#[derive(Debug, Clone)]
enum Slot {
    Playlist(EntityKey),
    Folder(PlaylistFolderData),
}

#[derive(Debug, Clone)]
struct AlbumRecord {
    data: AlbumData,
    artist: EntityKey,
    review: String,
    copyrights: Vec<String>,
}

#[derive(Debug, Clone)]
struct ArtistRecord {
    data: ArtistData,
    biography: String,
}

#[derive(Debug, Clone)]
struct ContainerRecord {
    owner: EntityKey,
    slots: Vec<Slot>,
}

/// In-memory music catalogue with one logged-in user.
#[derive(Debug, Clone)]
pub struct Catalogue {
    session_user: EntityKey,
    users: BTreeMap<EntityKey, UserData>,
    artists: BTreeMap<EntityKey, ArtistRecord>,
    albums: BTreeMap<EntityKey, AlbumRecord>,
    tracks: BTreeMap<EntityKey, TrackData>,
    playlists: BTreeMap<EntityKey, PlaylistData>,
    containers: BTreeMap<EntityKey, ContainerRecord>,
    starred: BTreeSet<EntityKey>,
    next_id: u64,
}

impl Catalogue {
    /// An empty catalogue logged in as `session_user`.
    pub fn new(session_user: UserData) -> Self {
        let mut catalogue = Self {
            session_user: session_user.key,
            users: BTreeMap::new(),
            artists: BTreeMap::new(),
            albums: BTreeMap::new(),
            tracks: BTreeMap::new(),
            playlists: BTreeMap::new(),
            containers: BTreeMap::new(),
            starred: BTreeSet::new(),
            next_id: 1000,
        };
        catalogue.add_user(session_user);
        catalogue
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Adds a user with an empty playlist container.
    pub fn add_user(&mut self, user: UserData) -> &mut Self {
        self.containers
            .entry(EntityKey::container(user.key.id))
            .or_insert_with(|| ContainerRecord {
                owner: user.key,
                slots: Vec::new(),
            });
        self.users.insert(user.key, user);
        self
    }

    pub fn add_artist(&mut self, artist: ArtistData, biography: &str) -> &mut Self {
        self.artists.insert(
            artist.key,
            ArtistRecord {
                data: artist,
                biography: biography.to_string(),
            },
        );
        self
    }

    pub fn add_album(
        &mut self,
        album: AlbumData,
        artist: EntityKey,
        review: &str,
        copyrights: &[&str],
    ) -> &mut Self {
        self.albums.insert(
            album.key,
            AlbumRecord {
                data: album,
                artist,
                review: review.to_string(),
                copyrights: copyrights.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    pub fn add_track(&mut self, track: TrackData) -> &mut Self {
        self.tracks.insert(track.key, track);
        self
    }

    /// Adds a playlist and appends it to its owner's container.
    pub fn add_playlist(&mut self, playlist: PlaylistData) -> &mut Self {
        if let Some(owner) = &playlist.owner {
            if let Some(record) = self.containers.get_mut(&EntityKey::container(owner.key.id)) {
                record.slots.push(Slot::Playlist(playlist.key));
            }
        }
        self.playlists.insert(playlist.key, playlist);
        self
    }

    /// Appends a folder holding `playlists` to `owner`'s container.
    pub fn add_folder(&mut self, owner: EntityKey, name: &str, playlists: &[EntityKey]) -> &mut Self {
        let folder = self.allocate(EntityKey::folder);
        if let Some(record) = self.containers.get_mut(&EntityKey::container(owner.id)) {
            record.slots.push(Slot::Folder(folder_marker(
                folder,
                name,
                FolderBoundary::FolderStart,
            )));
            record
                .slots
                .extend(playlists.iter().copied().map(Slot::Playlist));
            record
                .slots
                .push(Slot::Folder(folder_marker(folder, name, FolderBoundary::FolderEnd)));
        }
        self
    }

    pub fn star(&mut self, track: EntityKey) -> &mut Self {
        self.starred.insert(track);
        self
    }

    fn allocate(&mut self, key: fn(u64) -> EntityKey) -> EntityKey {
        self.next_id += 1;
        key(self.next_id)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn session_user(&self) -> Result<UserData> {
        self.user(self.session_user)
    }

    pub fn user(&self, key: EntityKey) -> Result<UserData> {
        self.users
            .get(&key)
            .cloned()
            .ok_or(BridgeError::UnknownEntity(key))
    }

    pub fn track(&self, key: EntityKey) -> Result<TrackData> {
        self.tracks
            .get(&key)
            .map(|track| self.with_starred(track))
            .ok_or(BridgeError::UnknownEntity(key))
    }

    pub fn album(&self, key: EntityKey) -> Result<AlbumData> {
        self.albums
            .get(&key)
            .map(|record| record.data.clone())
            .ok_or(BridgeError::UnknownEntity(key))
    }

    pub fn artist(&self, key: EntityKey) -> Result<ArtistData> {
        self.artists
            .get(&key)
            .map(|record| record.data.clone())
            .ok_or(BridgeError::UnknownEntity(key))
    }

    pub fn playlist(&self, key: EntityKey) -> Result<PlaylistData> {
        if key.id > STARRED_PLAYLIST_BASE {
            return self.starred_playlist(EntityKey::user(key.id - STARRED_PLAYLIST_BASE));
        }
        let mut playlist = self
            .playlists
            .get(&key)
            .cloned()
            .ok_or(BridgeError::UnknownEntity(key))?;
        for entry in &mut playlist.tracks {
            if let Some(track) = self.tracks.get(&entry.track.key) {
                entry.track = self.with_starred(track);
            }
        }
        Ok(playlist)
    }

    pub fn container(&self, key: EntityKey) -> Result<PlaylistContainerData> {
        let record = self
            .containers
            .get(&key)
            .ok_or(BridgeError::UnknownEntity(key))?;
        let items = record
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Playlist(playlist) => self.playlist(*playlist).ok().map(ContainerItem::Playlist),
                Slot::Folder(folder) => Some(ContainerItem::Folder(folder.clone())),
            })
            .collect();
        Ok(PlaylistContainerData {
            key,
            owner: self.users.get(&record.owner).cloned(),
            loaded: true,
            items,
        })
    }

    pub fn container_of(&self, user: EntityKey) -> Result<PlaylistContainerData> {
        self.user(user)?;
        self.container(EntityKey::container(user.id))
    }

    /// The user's starred tracks as a read-only playlist.
    ///
    /// Stars are only tracked for the session user.
    pub fn starred_playlist(&self, user: EntityKey) -> Result<PlaylistData> {
        let owner = self.user(user)?;
        let tracks = if user == self.session_user {
            self.starred
                .iter()
                .filter_map(|key| self.track(*key).ok())
                .map(|track| PlaylistTrackData {
                    track,
                    creator: Some(owner.clone()),
                    seen: true,
                    create_time: DateTime::<Utc>::default(),
                    message: None,
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(PlaylistData {
            key: EntityKey::playlist(STARRED_PLAYLIST_BASE + user.id),
            name: "Starred".to_string(),
            link: format!("{}:starred", owner.link),
            description: None,
            collaborative: false,
            loaded: true,
            owner: Some(owner),
            tracks,
        })
    }

    /// Resolves `spotify:<kind>:<id>` links. Users are addressed by
    /// canonical name.
    pub fn resolve(&self, link: &str) -> Result<LinkTarget> {
        let invalid = || BridgeError::InvalidLink(link.to_string());
        let parts: Vec<&str> = link.split(':').collect();
        let (kind, id) = match parts.as_slice() {
            ["spotify", kind, id] => (*kind, *id),
            _ => return Err(invalid()),
        };

        if kind == "user" {
            return self
                .users
                .values()
                .find(|user| user.canonical_name == id)
                .cloned()
                .map(LinkTarget::User)
                .ok_or_else(invalid);
        }

        let id: u64 = id.parse().map_err(|_| invalid())?;
        match kind {
            "track" => self.track(EntityKey::track(id)).map(LinkTarget::Track),
            "album" => self.album(EntityKey::album(id)).map(LinkTarget::Album),
            "artist" => self.artist(EntityKey::artist(id)).map(LinkTarget::Artist),
            "playlist" => self.playlist(EntityKey::playlist(id)).map(LinkTarget::Playlist),
            _ => Err(invalid()),
        }
    }

    // ------------------------------------------------------------------
    // Browse and search
    // ------------------------------------------------------------------

    pub fn album_browse(&self, key: EntityKey) -> Result<AlbumBrowseData> {
        let record = self
            .albums
            .get(&key)
            .ok_or(BridgeError::UnknownEntity(key))?;
        Ok(AlbumBrowseData {
            tracks: self.tracks_where(|track| track.album.as_ref().map(|a| a.key) == Some(key)),
            review: record.review.clone(),
            copyrights: record.copyrights.clone(),
            artist: self.artist(record.artist).ok(),
        })
    }

    pub fn artist_browse(&self, key: EntityKey, kind: ArtistBrowseKind) -> Result<ArtistBrowseData> {
        let record = self
            .artists
            .get(&key)
            .ok_or(BridgeError::UnknownEntity(key))?;
        let all_tracks = self.tracks_where(|track| track.artists.iter().any(|a| a.key == key));

        let mut tophit_tracks = all_tracks.clone();
        tophit_tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        tophit_tracks.truncate(TOP_HITS);

        let tracks = match kind {
            ArtistBrowseKind::NoTracks => Vec::new(),
            _ => all_tracks,
        };
        let albums = match kind {
            ArtistBrowseKind::NoAlbums => Vec::new(),
            _ => self
                .albums
                .values()
                .filter(|album| album.artist == key)
                .map(|album| album.data.clone())
                .collect(),
        };

        Ok(ArtistBrowseData {
            tracks,
            tophit_tracks,
            albums,
            similar_artists: self
                .artists
                .values()
                .filter(|artist| artist.data.key != key)
                .map(|artist| artist.data.clone())
                .collect(),
            biography: record.biography.clone(),
        })
    }

    /// Case-insensitive name search, paged independently per category.
    pub fn search(&self, query: &SearchQuery) -> SearchResultData {
        let needle = query.query.to_lowercase();
        let matches = |name: &str| name.to_lowercase().contains(&needle);

        let tracks = self.tracks_where(|track| {
            matches(&track.name) || track.artists.iter().any(|artist| matches(&artist.name))
        });
        let albums: Vec<AlbumData> = self
            .albums
            .values()
            .filter(|album| matches(&album.data.name))
            .map(|album| album.data.clone())
            .collect();
        let artists: Vec<ArtistData> = self
            .artists
            .values()
            .filter(|artist| matches(&artist.data.name))
            .map(|artist| artist.data.clone())
            .collect();
        let playlists: Vec<PlaylistData> = self
            .playlists
            .keys()
            .filter_map(|key| self.playlist(*key).ok())
            .filter(|playlist| matches(&playlist.name))
            .collect();

        let nothing_found =
            tracks.is_empty() && albums.is_empty() && artists.is_empty() && playlists.is_empty();

        SearchResultData {
            did_you_mean: if nothing_found {
                self.suggest(&needle)
            } else {
                None
            },
            link: format!("spotify:search:{}", query.query.replace(' ', "+")),
            total_tracks: tracks.len() as u32,
            total_albums: albums.len() as u32,
            total_artists: artists.len() as u32,
            total_playlists: playlists.len() as u32,
            tracks: page(tracks, query.tracks),
            albums: page(albums, query.albums),
            artists: page(artists, query.artists),
            playlists: page(playlists, query.playlists),
        }
    }

    /// An artist or track name sharing the query's first three letters.
    fn suggest(&self, needle: &str) -> Option<String> {
        let prefix: String = needle.chars().take(3).collect();
        if prefix.chars().count() < 3 {
            return None;
        }
        self.artists
            .values()
            .map(|artist| &artist.data.name)
            .chain(self.tracks.values().map(|track| &track.name))
            .find(|name| name.to_lowercase().starts_with(&prefix))
            .cloned()
    }

    fn tracks_where(&self, filter: impl Fn(&TrackData) -> bool) -> Vec<TrackData> {
        self.tracks
            .values()
            .filter(|track| filter(track))
            .map(|track| self.with_starred(track))
            .collect()
    }

    fn with_starred(&self, track: &TrackData) -> TrackData {
        let mut track = track.clone();
        track.starred = self.starred.contains(&track.key);
        track
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn set_starred(&mut self, tracks: &[EntityKey], starred: bool) -> Result<()> {
        if let Some(unknown) = tracks.iter().find(|key| !self.tracks.contains_key(key)) {
            return Err(BridgeError::UnknownEntity(*unknown));
        }
        for key in tracks {
            if starred {
                self.starred.insert(*key);
            } else {
                self.starred.remove(key);
            }
        }
        Ok(())
    }

    pub fn rename_playlist(&mut self, key: EntityKey, name: &str) -> Result<PlaylistChange> {
        self.check_owner(key)?;
        if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(BridgeError::OperationFailed(format!(
                "Invalid playlist name: {:?}",
                name
            )));
        }
        self.playlist_mut(key)?.name = name.to_string();
        Ok(PlaylistChange::Renamed {
            name: name.to_string(),
        })
    }

    pub fn set_collaborative(&mut self, key: EntityKey, collaborative: bool) -> Result<()> {
        self.check_owner(key)?;
        self.playlist_mut(key)?.collaborative = collaborative;
        Ok(())
    }

    pub fn add_tracks(
        &mut self,
        key: EntityKey,
        tracks: &[EntityKey],
        position: usize,
    ) -> Result<PlaylistChange> {
        self.check_editable(key)?;
        let creator = self.session_user()?;
        let entries = tracks
            .iter()
            .map(|track| {
                Ok(PlaylistTrackData {
                    track: self.track(*track)?,
                    creator: Some(creator.clone()),
                    seen: true,
                    create_time: Utc::now(),
                    message: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let playlist = self.playlist_mut(key)?;
        check_position(position, playlist.tracks.len() + 1)?;
        playlist
            .tracks
            .splice(position..position, entries.iter().cloned());
        Ok(PlaylistChange::TracksAdded {
            tracks: entries,
            position,
        })
    }

    pub fn remove_tracks(&mut self, key: EntityKey, positions: &[usize]) -> Result<PlaylistChange> {
        self.check_editable(key)?;
        let playlist = self.playlist_mut(key)?;
        let len = playlist.tracks.len();
        positions
            .iter()
            .try_for_each(|&position| check_position(position, len))?;
        remove_positions(&mut playlist.tracks, positions);
        Ok(PlaylistChange::TracksRemoved {
            positions: positions.to_vec(),
        })
    }

    pub fn reorder_tracks(
        &mut self,
        key: EntityKey,
        positions: &[usize],
        new_position: usize,
    ) -> Result<PlaylistChange> {
        self.check_editable(key)?;
        let playlist = self.playlist_mut(key)?;
        let len = playlist.tracks.len();
        positions
            .iter()
            .try_for_each(|&position| check_position(position, len))?;
        check_position(new_position, len + 1)?;
        move_positions(&mut playlist.tracks, positions, new_position);
        Ok(PlaylistChange::TracksMoved {
            positions: positions.to_vec(),
            new_position,
        })
    }

    /// Creates a playlist owned by the session user at the end of `container`.
    pub fn create_playlist(
        &mut self,
        container: EntityKey,
        name: &str,
    ) -> Result<(PlaylistData, ContainerChange)> {
        self.check_container_owner(container)?;
        if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(BridgeError::CreationFailed(format!(
                "Invalid playlist name: {:?}",
                name
            )));
        }

        let key = self.allocate(EntityKey::playlist);
        let owner = self.session_user()?;
        let playlist = PlaylistData {
            key,
            name: name.to_string(),
            link: format!("spotify:playlist:{}", key.id),
            description: None,
            collaborative: false,
            loaded: true,
            owner: Some(owner),
            tracks: Vec::new(),
        };
        self.playlists.insert(key, playlist.clone());

        let slots = self.slots_mut(container)?;
        let position = slots.len();
        slots.push(Slot::Playlist(key));
        Ok((
            playlist.clone(),
            ContainerChange::PlaylistAdded {
                item: ContainerItem::Playlist(playlist),
                position,
            },
        ))
    }

    /// Inserts an empty folder (start and end marker) before `index`.
    pub fn create_folder(
        &mut self,
        container: EntityKey,
        index: usize,
        name: &str,
    ) -> Result<Vec<ContainerChange>> {
        self.check_container_owner(container)?;
        if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(BridgeError::CreationFailed(format!(
                "Invalid folder name: {:?}",
                name
            )));
        }
        check_position(index, self.slots_mut(container)?.len() + 1)?;

        let folder = self.allocate(EntityKey::folder);
        let start = folder_marker(folder, name, FolderBoundary::FolderStart);
        let end = folder_marker(folder, name, FolderBoundary::FolderEnd);

        let slots = self.slots_mut(container)?;
        slots.insert(index, Slot::Folder(start.clone()));
        slots.insert(index + 1, Slot::Folder(end.clone()));
        Ok(vec![
            ContainerChange::PlaylistAdded {
                item: ContainerItem::Folder(start),
                position: index,
            },
            ContainerChange::PlaylistAdded {
                item: ContainerItem::Folder(end),
                position: index + 1,
            },
        ])
    }

    pub fn remove_entry(&mut self, container: EntityKey, index: usize) -> Result<ContainerChange> {
        self.check_container_owner(container)?;
        let slots = self.slots_mut(container)?;
        check_position(index, slots.len())?;
        slots.remove(index);
        Ok(ContainerChange::PlaylistRemoved { position: index })
    }

    /// Moves an entry. Folder markers cannot cross their partner marker.
    pub fn move_entry(
        &mut self,
        container: EntityKey,
        index: usize,
        new_position: usize,
    ) -> Result<ContainerChange> {
        self.check_container_owner(container)?;
        let slots = self.slots_mut(container)?;
        check_position(index, slots.len())?;
        check_position(new_position, slots.len() + 1)?;

        if let Slot::Folder(folder) = &slots[index] {
            let partner = slots.iter().position(|slot| {
                matches!(slot, Slot::Folder(other)
                    if other.key == folder.key && other.boundary != folder.boundary)
            });
            if let Some(partner) = partner {
                let crosses = match folder.boundary {
                    FolderBoundary::FolderStart => new_position > partner,
                    FolderBoundary::FolderEnd => new_position <= partner,
                };
                if crosses {
                    return Err(BridgeError::NotMovable(format!(
                        "Folder {:?} cannot be moved across its own boundary",
                        folder.name
                    )));
                }
            }
        }

        move_positions(slots, &[index], new_position);
        Ok(ContainerChange::PlaylistMoved {
            position: index,
            new_position,
        })
    }

    fn playlist_mut(&mut self, key: EntityKey) -> Result<&mut PlaylistData> {
        self.playlists
            .get_mut(&key)
            .ok_or(BridgeError::UnknownEntity(key))
    }

    fn slots_mut(&mut self, container: EntityKey) -> Result<&mut Vec<Slot>> {
        self.containers
            .get_mut(&container)
            .map(|record| &mut record.slots)
            .ok_or(BridgeError::UnknownEntity(container))
    }

    fn check_owner(&self, key: EntityKey) -> Result<()> {
        let playlist = self
            .playlists
            .get(&key)
            .ok_or(BridgeError::UnknownEntity(key))?;
        let owned = playlist
            .owner
            .as_ref()
            .is_some_and(|owner| owner.key == self.session_user);
        if owned {
            Ok(())
        } else {
            Err(BridgeError::PermissionDenied(format!(
                "{} is owned by another user",
                key
            )))
        }
    }

    fn check_editable(&self, key: EntityKey) -> Result<()> {
        let collaborative = self
            .playlists
            .get(&key)
            .ok_or(BridgeError::UnknownEntity(key))?
            .collaborative;
        if collaborative {
            Ok(())
        } else {
            self.check_owner(key)
        }
    }

    fn check_container_owner(&self, container: EntityKey) -> Result<()> {
        let record = self
            .containers
            .get(&container)
            .ok_or(BridgeError::UnknownEntity(container))?;
        if record.owner == self.session_user {
            Ok(())
        } else {
            Err(BridgeError::PermissionDenied(format!(
                "{} belongs to another user",
                container
            )))
        }
    }
}

fn folder_marker(key: EntityKey, name: &str, boundary: FolderBoundary) -> PlaylistFolderData {
    PlaylistFolderData {
        key,
        name: name.to_string(),
        boundary,
    }
}

fn check_position(position: usize, len: usize) -> Result<()> {
    if position < len {
        Ok(())
    } else {
        Err(BridgeError::OperationFailed(format!(
            "Position {} out of range",
            position
        )))
    }
}

fn page<T>(items: Vec<T>, page: SearchPage) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn names(tracks: &[TrackData]) -> Vec<&str> {
        tracks.iter().map(|track| track.name.as_str()).collect()
    }

    #[test]
    fn test_album_browse_lists_album_tracks() {
        let catalogue = demo::catalogue();
        let browse = catalogue.album_browse(demo::AURORA).unwrap();
        assert_eq!(names(&browse.tracks), vec!["First Light", "Polar Night", "Magnetic"]);
        assert_eq!(browse.artist.unwrap().key, demo::NORTHERN_LIGHTS);
        assert!(!browse.review.is_empty());
    }

    #[test]
    fn test_artist_browse_kinds() {
        let catalogue = demo::catalogue();
        let full = catalogue
            .artist_browse(demo::NORTHERN_LIGHTS, ArtistBrowseKind::Full)
            .unwrap();
        assert_eq!(full.tracks.len(), 3);
        assert_eq!(full.tophit_tracks[0].key, demo::FIRST_LIGHT);
        assert_eq!(full.albums.len(), 1);

        let no_tracks = catalogue
            .artist_browse(demo::NORTHERN_LIGHTS, ArtistBrowseKind::NoTracks)
            .unwrap();
        assert!(no_tracks.tracks.is_empty());
        assert_eq!(no_tracks.tophit_tracks.len(), 3);
    }

    #[test]
    fn test_search_pages_categories_independently() {
        let catalogue = demo::catalogue();
        let mut query = SearchQuery::uniform("", SearchPage::new(0, 2));
        query.tracks = SearchPage::new(4, 10);

        let result = catalogue.search(&query);
        assert_eq!(result.total_tracks, 6);
        assert_eq!(result.tracks.len(), 2);
        assert_eq!(result.albums.len(), 2);
        assert_eq!(result.link, "spotify:search:");
    }

    #[test]
    fn test_search_suggests_when_nothing_matches() {
        let catalogue = demo::catalogue();
        let result = catalogue.search(&SearchQuery::uniform("velvet", SearchPage::new(0, 10)));
        assert_eq!(result.artists.len(), 1);
        assert_eq!(result.did_you_mean, None);

        let result = catalogue.search(&SearchQuery::uniform("velvte tied", SearchPage::new(0, 10)));
        assert_eq!(result.did_you_mean.as_deref(), Some("Velvet Tide"));
    }

    #[test]
    fn test_resolve_links() {
        let catalogue = demo::catalogue();
        assert!(matches!(
            catalogue.resolve("spotify:track:1"),
            Ok(LinkTarget::Track(track)) if track.key == demo::FIRST_LIGHT
        ));
        assert!(matches!(
            catalogue.resolve("spotify:user:bob"),
            Ok(LinkTarget::User(user)) if user.key == demo::BOB
        ));
        assert_eq!(
            catalogue.resolve("spotify:track:99"),
            Err(BridgeError::UnknownEntity(EntityKey::track(99)))
        );
        assert!(matches!(
            catalogue.resolve("http://example.com"),
            Err(BridgeError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_editing_requires_ownership_or_collaboration() {
        let mut catalogue = demo::catalogue();
        assert!(matches!(
            catalogue.add_tracks(demo::ROAD_TRIP, &[demo::MAGNETIC], 0),
            Err(BridgeError::PermissionDenied(_))
        ));
        assert!(catalogue
            .add_tracks(demo::SHARED, &[demo::MAGNETIC], 0)
            .is_ok());
        assert!(matches!(
            catalogue.rename_playlist(demo::SHARED, "Mine now"),
            Err(BridgeError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_folder_cannot_cross_its_end_marker() {
        let mut catalogue = demo::catalogue();
        // Alice: [Morning, Friends start, Shared, Friends end]
        assert!(matches!(
            catalogue.move_entry(demo::ALICE_CONTAINER, 1, 4),
            Err(BridgeError::NotMovable(_))
        ));
        assert!(matches!(
            catalogue.move_entry(demo::ALICE_CONTAINER, 3, 1),
            Err(BridgeError::NotMovable(_))
        ));
        assert!(catalogue.move_entry(demo::ALICE_CONTAINER, 0, 4).is_ok());
    }

    #[test]
    fn test_starred_playlist_follows_stars() {
        let mut catalogue = demo::catalogue();
        catalogue.set_starred(&[demo::UNDERTOW], true).unwrap();

        let starred = catalogue.starred_playlist(demo::ALICE).unwrap();
        let keys: Vec<EntityKey> = starred.tracks.iter().map(|e| e.track.key).collect();
        assert_eq!(keys, vec![demo::MAGNETIC, demo::UNDERTOW]);
        assert_eq!(catalogue.playlist(starred.key).unwrap(), starred);
    }
}
