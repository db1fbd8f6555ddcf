#![allow(dead_code)]

use std::sync::Arc;

use bridge_traits::native::MockNativeSession;
use bridge_traits::{
    AlbumData, ArtistData, EntityKey, PlaylistContainerData, PlaylistData, PlaylistTrackData,
    TrackAvailability, TrackData, UserData,
};
use chrono::{TimeZone, Utc};
use core_host::Host;
use core_runtime::config::BridgeConfig;
use core_runtime::signal::channel;
use core_runtime::SignalSender;

pub fn host(native: MockNativeSession) -> (Host, SignalSender) {
    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .build()
        .unwrap();
    let (sender, receiver) = channel(&config.signal);
    (Host::new(config, receiver), sender)
}

pub fn artist(id: u64) -> ArtistData {
    ArtistData {
        key: EntityKey::artist(id),
        name: format!("Artist {}", id),
        link: format!("spotify:artist:{}", id),
        loaded: true,
    }
}

pub fn album(id: u64) -> AlbumData {
    AlbumData {
        key: EntityKey::album(id),
        name: format!("Album {}", id),
        link: format!("spotify:album:{}", id),
        cover_base64: Some("/9j/4AAQ".to_string()),
        loaded: true,
    }
}

pub fn track(id: u64) -> TrackData {
    TrackData {
        key: EntityKey::track(id),
        name: format!("Track {}", id),
        link: format!("spotify:track:{}", id),
        duration_ms: 215_500,
        popularity: 42,
        availability: TrackAvailability::Available,
        starred: false,
        loaded: true,
        artists: vec![artist(1)],
        album: Some(album(1)),
    }
}

pub fn user(id: u64) -> UserData {
    UserData {
        key: EntityKey::user(id),
        link: format!("spotify:user:user{}", id),
        canonical_name: format!("user{}", id),
        display_name: format!("User {}", id),
        loaded: true,
    }
}

pub fn entry(id: u64) -> PlaylistTrackData {
    PlaylistTrackData {
        track: track(id),
        creator: Some(user(1)),
        seen: false,
        create_time: Utc.with_ymd_and_hms(2011, 3, 1, 12, 0, 0).unwrap(),
        message: None,
    }
}

pub fn playlist(id: u64, tracks: &[u64]) -> PlaylistData {
    PlaylistData {
        key: EntityKey::playlist(id),
        name: format!("Playlist {}", id),
        link: format!("spotify:user:user1:playlist:{}", id),
        description: Some("Songs".to_string()),
        collaborative: false,
        loaded: true,
        owner: Some(user(1)),
        tracks: tracks.iter().map(|&t| entry(t)).collect(),
    }
}

pub fn container(id: u64, playlists: &[u64]) -> PlaylistContainerData {
    PlaylistContainerData {
        key: EntityKey::container(id),
        owner: Some(user(1)),
        loaded: true,
        items: playlists
            .iter()
            .map(|&p| bridge_traits::ContainerItem::Playlist(playlist(p, &[])))
            .collect(),
    }
}
