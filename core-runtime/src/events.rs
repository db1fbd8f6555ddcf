//! # Bridge Event Vocabulary
//!
//! Names and payloads of every event the native library raises toward the
//! host thread.
//!
//! ## Overview
//!
//! Events fall in two groups:
//! - **Completions** (`browseComplete`, `searchComplete`): consumed by the
//!   target entity's operation state machine and delivered to the callback
//!   passed to the request.
//! - **Notifications** (`endOfTrack`, playlist and container changes): applied
//!   to the target's snapshot, then delivered to whatever callback table is
//!   subscribed for that name.
//!
//! Event names keep the camelCase spelling scripting code subscribes with:
//!
//! ```rust
//! use core_runtime::events::EventName;
//!
//! let name: EventName = "tracksAdded".parse().unwrap();
//! assert_eq!(name, EventName::TracksAdded);
//! assert_eq!(name.as_str(), "tracksAdded");
//! ```

use bridge_traits::{
    AlbumBrowseData, ArtistBrowseData, ContainerChange, PlaylistChange, SearchResultData,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================================================
// Event names
// ============================================================================

/// Name of an event, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    BrowseComplete,
    SearchComplete,
    EndOfTrack,
    PlaylistRenamed,
    TracksAdded,
    TracksRemoved,
    TracksMoved,
    TrackCreatedChanged,
    TrackSeenChanged,
    TrackMessageChanged,
    PlaylistAdded,
    PlaylistRemoved,
    PlaylistMoved,
}

impl EventName {
    pub const ALL: [EventName; 13] = [
        EventName::BrowseComplete,
        EventName::SearchComplete,
        EventName::EndOfTrack,
        EventName::PlaylistRenamed,
        EventName::TracksAdded,
        EventName::TracksRemoved,
        EventName::TracksMoved,
        EventName::TrackCreatedChanged,
        EventName::TrackSeenChanged,
        EventName::TrackMessageChanged,
        EventName::PlaylistAdded,
        EventName::PlaylistRemoved,
        EventName::PlaylistMoved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::BrowseComplete => "browseComplete",
            EventName::SearchComplete => "searchComplete",
            EventName::EndOfTrack => "endOfTrack",
            EventName::PlaylistRenamed => "playlistRenamed",
            EventName::TracksAdded => "tracksAdded",
            EventName::TracksRemoved => "tracksRemoved",
            EventName::TracksMoved => "tracksMoved",
            EventName::TrackCreatedChanged => "trackCreatedChanged",
            EventName::TrackSeenChanged => "trackSeenChanged",
            EventName::TrackMessageChanged => "trackMessageChanged",
            EventName::PlaylistAdded => "playlistAdded",
            EventName::PlaylistRemoved => "playlistRemoved",
            EventName::PlaylistMoved => "playlistMoved",
        }
    }

    /// Completion events finish an operation instead of notifying subscribers.
    pub fn is_completion(&self) -> bool {
        matches!(self, EventName::BrowseComplete | EventName::SearchComplete)
    }

    pub fn for_playlist_change(change: &PlaylistChange) -> Self {
        match change {
            PlaylistChange::Renamed { .. } => EventName::PlaylistRenamed,
            PlaylistChange::TracksAdded { .. } => EventName::TracksAdded,
            PlaylistChange::TracksRemoved { .. } => EventName::TracksRemoved,
            PlaylistChange::TracksMoved { .. } => EventName::TracksMoved,
            PlaylistChange::TrackCreatedChanged { .. } => EventName::TrackCreatedChanged,
            PlaylistChange::TrackSeenChanged { .. } => EventName::TrackSeenChanged,
            PlaylistChange::TrackMessageChanged { .. } => EventName::TrackMessageChanged,
        }
    }

    pub fn for_container_change(change: &ContainerChange) -> Self {
        match change {
            ContainerChange::PlaylistAdded { .. } => EventName::PlaylistAdded,
            ContainerChange::PlaylistRemoved { .. } => EventName::PlaylistRemoved,
            ContainerChange::PlaylistMoved { .. } => EventName::PlaylistMoved,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Data carried alongside an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventPayload {
    /// No data (end of track).
    Empty,
    AlbumBrowse(Box<AlbumBrowseData>),
    ArtistBrowse(Box<ArtistBrowseData>),
    Search(Box<SearchResultData>),
    /// The native library gave up on a browse or search.
    Failed { message: String },
    Playlist(PlaylistChange),
    Container(ContainerChange),
}

impl EventPayload {
    /// Returns a human-readable description of the payload.
    pub fn description(&self) -> &str {
        match self {
            EventPayload::Empty => "No payload",
            EventPayload::AlbumBrowse(_) => "Album browse result",
            EventPayload::ArtistBrowse(_) => "Artist browse result",
            EventPayload::Search(_) => "Search result",
            EventPayload::Failed { .. } => "Native request failed",
            EventPayload::Playlist(_) => "Playlist change",
            EventPayload::Container(_) => "Playlist container change",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            EventPayload::Failed { .. } => EventSeverity::Warning,
            EventPayload::AlbumBrowse(_)
            | EventPayload::ArtistBrowse(_)
            | EventPayload::Search(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Failure message if the native request failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            EventPayload::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_strings() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "trackStarred".parse::<EventName>().unwrap_err();
        assert!(matches!(err, Error::UnknownEvent(name) if name == "trackStarred"));
    }

    #[test]
    fn test_serde_uses_subscriber_spelling() {
        let json = serde_json::to_string(&EventName::TrackSeenChanged).unwrap();
        assert_eq!(json, "\"trackSeenChanged\"");
    }

    #[test]
    fn test_change_kinds_map_to_names() {
        let change = PlaylistChange::TracksMoved {
            positions: vec![0],
            new_position: 2,
        };
        assert_eq!(EventName::for_playlist_change(&change), EventName::TracksMoved);

        let change = ContainerChange::PlaylistRemoved { position: 1 };
        assert_eq!(
            EventName::for_container_change(&change),
            EventName::PlaylistRemoved
        );
    }

    #[test]
    fn test_completion_classification() {
        assert!(EventName::BrowseComplete.is_completion());
        assert!(EventName::SearchComplete.is_completion());
        assert!(!EventName::EndOfTrack.is_completion());
    }

    #[test]
    fn test_payload_severity() {
        let failed = EventPayload::Failed {
            message: "timeout".into(),
        };
        assert_eq!(failed.severity(), EventSeverity::Warning);
        assert_eq!(failed.failure(), Some("timeout"));
        assert_eq!(EventPayload::Empty.severity(), EventSeverity::Debug);
        assert_eq!(EventPayload::Empty.failure(), None);
    }
}
