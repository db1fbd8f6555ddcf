#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use bridge_traits::native::MockNativeSession;
use bridge_traits::{AlbumBrowseData, AlbumData, EntityKey, EntityKind, NativeSession, PlaylistData};
use core_host::{
    CompletionCallback, Disposition, Entity, Host, HostError, Operation, Proxy, RequestOutcome,
};
use core_runtime::config::{BridgeConfig, ReentryPolicy};
use core_runtime::signal::channel;
use core_runtime::{EventName, EventPayload, PendingEvent, SignalSender};

/// Album entity with a single browse operation.
pub struct TestAlbum {
    pub browse: Operation<TestAlbum, AlbumBrowseData>,
}

impl Entity for TestAlbum {
    const KIND: EntityKind = EntityKind::Album;
    type Data = AlbumData;

    fn from_snapshot(data: &AlbumData) -> Self {
        Self {
            browse: Operation::new(data.key),
        }
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> core_host::Result<Disposition> {
        match (event.name, &event.payload) {
            (EventName::BrowseComplete, EventPayload::AlbumBrowse(result)) => {
                proxy.state().browse.complete(proxy, Ok((**result).clone()))?;
                Ok(Disposition::Consumed)
            }
            (EventName::BrowseComplete, EventPayload::Failed { message }) => {
                proxy.state().browse.complete(proxy, Err(message.clone()))?;
                Ok(Disposition::Consumed)
            }
            _ => Ok(Disposition::Forward),
        }
    }
}

pub fn browse(
    album: &Proxy<TestAlbum>,
    callback: CompletionCallback<TestAlbum>,
) -> core_host::Result<RequestOutcome> {
    let key = album.key();
    album
        .state()
        .browse
        .request(album, callback, move |native| native.issue_album_browse(key))
}

/// Playlist entity without operations. Turns native notifications off on
/// release if something turned them on.
pub struct TestPlaylist {
    pub notifications: Cell<bool>,
}

impl Entity for TestPlaylist {
    const KIND: EntityKind = EntityKind::Playlist;
    type Data = PlaylistData;

    fn from_snapshot(_: &PlaylistData) -> Self {
        TestPlaylist {
            notifications: Cell::new(false),
        }
    }

    fn on_release(&self, key: EntityKey, native: &dyn NativeSession) {
        if self.notifications.get() {
            let _ = native.set_notifications(key, false);
        }
    }
}

pub fn album_data(id: u64, name: &str) -> AlbumData {
    AlbumData {
        key: EntityKey::album(id),
        name: name.to_string(),
        link: format!("spotify:album:{}", id),
        cover_base64: None,
        loaded: true,
    }
}

pub fn playlist_data(id: u64, name: &str) -> PlaylistData {
    PlaylistData {
        key: EntityKey::playlist(id),
        name: name.to_string(),
        link: format!("spotify:playlist:{}", id),
        description: None,
        collaborative: false,
        loaded: true,
        owner: None,
        tracks: Vec::new(),
    }
}

pub fn browse_result(review: &str) -> AlbumBrowseData {
    AlbumBrowseData {
        review: review.to_string(),
        ..Default::default()
    }
}

pub fn host_with(native: MockNativeSession, policy: ReentryPolicy) -> (Host, SignalSender) {
    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .reentry_policy(policy)
        .build()
        .unwrap();
    let (sender, receiver) = channel(&config.signal);
    (Host::new(config, receiver), sender)
}

pub fn host(native: MockNativeSession) -> (Host, SignalSender) {
    host_with(native, ReentryPolicy::Reject)
}

pub type Outcomes = Rc<RefCell<Vec<core_host::Result<()>>>>;

/// Completion callback that records every outcome it receives.
pub fn recording_callback(outcomes: &Outcomes) -> CompletionCallback<TestAlbum> {
    let outcomes = Rc::clone(outcomes);
    Rc::new(move |_: Proxy<TestAlbum>, result: core_host::Result<()>| {
        outcomes.borrow_mut().push(result)
    })
}

pub fn is_failure(result: &core_host::Result<()>, message: &str) -> bool {
    matches!(result, Err(HostError::OperationFailed(m)) if m == message)
}
