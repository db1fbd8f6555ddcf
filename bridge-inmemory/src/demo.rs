//! A small fixed catalogue for tests and demos.
//!
//! | Key | Entity |
//! |-----|--------|
//! | `user:1` | alice, the session user |
//! | `user:2` | bob |
//! | `artist:1`, `artist:2` | Northern Lights, Velvet Tide |
//! | `album:1`, `album:2` | Aurora, Low Water |
//! | `track:1`..`track:6` | three tracks per album; `track:6` is banned |
//! | `playlist:1` | Morning, alice's |
//! | `playlist:2` | Road Trip, bob's |
//! | `playlist:3` | Shared, bob's, collaborative |
//!
//! Alice's container lists Morning, then a "Friends" folder holding Shared.

use bridge_traits::{
    AlbumData, ArtistData, EntityKey, PlaylistData, PlaylistTrackData, TrackAvailability,
    TrackData, UserData,
};
use chrono::{TimeZone, Utc};

use crate::catalogue::Catalogue;

pub const ALICE: EntityKey = EntityKey::user(1);
pub const BOB: EntityKey = EntityKey::user(2);
pub const ALICE_CONTAINER: EntityKey = EntityKey::container(1);
pub const BOB_CONTAINER: EntityKey = EntityKey::container(2);

pub const NORTHERN_LIGHTS: EntityKey = EntityKey::artist(1);
pub const VELVET_TIDE: EntityKey = EntityKey::artist(2);

pub const AURORA: EntityKey = EntityKey::album(1);
pub const LOW_WATER: EntityKey = EntityKey::album(2);

pub const FIRST_LIGHT: EntityKey = EntityKey::track(1);
pub const POLAR_NIGHT: EntityKey = EntityKey::track(2);
pub const MAGNETIC: EntityKey = EntityKey::track(3);
pub const UNDERTOW: EntityKey = EntityKey::track(4);
pub const SLOW_CURRENT: EntityKey = EntityKey::track(5);
pub const RIPTIDE: EntityKey = EntityKey::track(6);

pub const MORNING: EntityKey = EntityKey::playlist(1);
pub const ROAD_TRIP: EntityKey = EntityKey::playlist(2);
pub const SHARED: EntityKey = EntityKey::playlist(3);

fn user(key: EntityKey, canonical_name: &str, display_name: &str) -> UserData {
    UserData {
        key,
        link: format!("spotify:user:{}", canonical_name),
        canonical_name: canonical_name.to_string(),
        display_name: display_name.to_string(),
        loaded: true,
    }
}

fn artist(key: EntityKey, name: &str) -> ArtistData {
    ArtistData {
        key,
        name: name.to_string(),
        link: format!("spotify:artist:{}", key.id),
        loaded: true,
    }
}

fn album(key: EntityKey, name: &str) -> AlbumData {
    AlbumData {
        key,
        name: name.to_string(),
        link: format!("spotify:album:{}", key.id),
        cover_base64: Some("/9j/4AAQSkZJRgABAQ".to_string()),
        loaded: true,
    }
}

fn track(
    key: EntityKey,
    name: &str,
    seconds: u32,
    popularity: u8,
    artist: &ArtistData,
    album: &AlbumData,
) -> TrackData {
    TrackData {
        key,
        name: name.to_string(),
        link: format!("spotify:track:{}", key.id),
        duration_ms: seconds * 1000,
        popularity,
        availability: TrackAvailability::Available,
        starred: false,
        loaded: true,
        artists: vec![artist.clone()],
        album: Some(album.clone()),
    }
}

fn playlist(
    key: EntityKey,
    name: &str,
    owner: &UserData,
    collaborative: bool,
    tracks: &[&TrackData],
) -> PlaylistData {
    let added = Utc.with_ymd_and_hms(2011, 3, 1, 12, 0, 0).single();
    PlaylistData {
        key,
        name: name.to_string(),
        link: format!("spotify:playlist:{}", key.id),
        description: None,
        collaborative,
        loaded: true,
        owner: Some(owner.clone()),
        tracks: tracks
            .iter()
            .map(|track| PlaylistTrackData {
                track: (*track).clone(),
                creator: Some(owner.clone()),
                seen: false,
                create_time: added.unwrap_or_default(),
                message: None,
            })
            .collect(),
    }
}

/// Builds the demo catalogue, logged in as alice.
pub fn catalogue() -> Catalogue {
    let alice = user(ALICE, "alice", "Alice");
    let bob = user(BOB, "bob", "Bob");

    let northern = artist(NORTHERN_LIGHTS, "Northern Lights");
    let velvet = artist(VELVET_TIDE, "Velvet Tide");
    let aurora = album(AURORA, "Aurora");
    let low_water = album(LOW_WATER, "Low Water");

    let first_light = track(FIRST_LIGHT, "First Light", 215, 80, &northern, &aurora);
    let polar_night = track(POLAR_NIGHT, "Polar Night", 187, 65, &northern, &aurora);
    let magnetic = track(MAGNETIC, "Magnetic", 242, 71, &northern, &aurora);
    let undertow = track(UNDERTOW, "Undertow", 198, 55, &velvet, &low_water);
    let slow_current = track(SLOW_CURRENT, "Slow Current", 305, 40, &velvet, &low_water);
    let mut riptide = track(RIPTIDE, "Riptide", 176, 30, &velvet, &low_water);
    riptide.availability = TrackAvailability::BannedByArtist;

    let mut catalogue = Catalogue::new(alice.clone());
    catalogue
        .add_user(bob.clone())
        .add_artist(northern, "Icelandic synth trio.")
        .add_artist(velvet, "Slow-burning dream pop from the coast.")
        .add_album(
            aurora,
            NORTHERN_LIGHTS,
            "A cold, glittering debut.",
            &["(C) 2010 Polar Records"],
        )
        .add_album(
            low_water,
            VELVET_TIDE,
            "Patient and warm.",
            &["(C) 2009 Harbour", "(P) 2009 Harbour"],
        );

    let morning = playlist(MORNING, "Morning", &alice, false, &[&first_light, &polar_night]);
    let road_trip = playlist(ROAD_TRIP, "Road Trip", &bob, false, &[&undertow, &slow_current]);
    let shared = playlist(SHARED, "Shared", &bob, true, &[&magnetic]);

    for track in [first_light, polar_night, magnetic, undertow, slow_current, riptide] {
        catalogue.add_track(track);
    }
    catalogue
        .add_playlist(morning)
        .add_playlist(road_trip)
        .add_playlist(shared)
        .add_folder(ALICE, "Friends", &[SHARED])
        .star(MAGNETIC);
    catalogue
}
