use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::native::MockNativeSession;
use bridge_traits::{
    AudioFormat, AudioSink, BridgeError, EntityKey, LinkTarget, PlaylistContainerData,
    TrackAvailability, TrackData, UserData,
};
use core_host::CallbackTable;
use core_playback::BufferedSink;
use core_runtime::config::{BridgeConfig, SignalConfig};
use core_runtime::signal::channel;
use core_runtime::{EventName, SignalSender};
use core_service::{CoreError, Link, Session};

fn user() -> UserData {
    UserData {
        key: EntityKey::user(1),
        link: "spotify:user:alice".to_string(),
        canonical_name: "alice".to_string(),
        display_name: "Alice".to_string(),
        loaded: true,
    }
}

fn track(id: u64) -> TrackData {
    TrackData {
        key: EntityKey::track(id),
        name: format!("Track {}", id),
        link: format!("spotify:track:{}", id),
        duration_ms: 200_000,
        popularity: 70,
        availability: TrackAvailability::Available,
        starred: false,
        loaded: true,
        artists: Vec::new(),
        album: None,
    }
}

fn session(native: MockNativeSession) -> (Session, SignalSender) {
    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .native_audio(true)
        .build()
        .unwrap();
    let (sender, receiver) = channel(&config.signal);
    (Session::new(config, receiver).unwrap(), sender)
}

#[test]
fn test_configured_sink_is_attached_at_startup() {
    let mut native = MockNativeSession::new();
    native
        .expect_attach_audio_sink()
        .times(1)
        .returning(|sink| {
            sink.deliver(&AudioFormat::default(), &[1, 2]);
            Ok(())
        });

    let sink = BufferedSink::new(64);
    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .audio_sink(Arc::new(sink.clone()) as Arc<dyn AudioSink>)
        .build()
        .unwrap();
    let (_sender, receiver) = channel(&config.signal);
    let session = Session::new(config, receiver).unwrap();

    assert!(session.player().has_output().unwrap());
    assert_eq!(sink.available_frames(), 1);
}

#[test]
fn test_refused_sink_fails_startup() {
    let mut native = MockNativeSession::new();
    native
        .expect_attach_audio_sink()
        .returning(|_| Err(BridgeError::OperationFailed("device busy".into())));

    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .audio_sink(Arc::new(BufferedSink::new(64)) as Arc<dyn AudioSink>)
        .build()
        .unwrap();
    let (_sender, receiver) = channel(&config.signal);

    assert!(matches!(
        Session::new(config, receiver),
        Err(CoreError::Playback(_))
    ));
}

#[test]
fn test_session_user_and_container_are_stable_handles() {
    let mut native = MockNativeSession::new();
    native.expect_session_user().returning(|| Ok(user()));
    native.expect_session_container().returning(|| {
        Ok(PlaylistContainerData {
            key: EntityKey::container(1),
            owner: Some(user()),
            loaded: true,
            items: Vec::new(),
        })
    });
    let (session, _tx) = session(native);

    let me = session.session_user().unwrap();
    assert_eq!(me.canonical_name(), "alice");
    assert_eq!(session.session_user().unwrap(), me);

    let container = session.playlist_container().unwrap();
    assert_eq!(container.owner().unwrap(), Some(me));
    assert_eq!(session.playlist_container().unwrap(), container);
}

#[test]
fn test_resolve_link_returns_registry_handle() {
    let mut native = MockNativeSession::new();
    native
        .expect_resolve_link()
        .withf(|link| link == "spotify:track:7")
        .returning(|_| Ok(LinkTarget::Track(track(7))));
    native
        .expect_resolve_link()
        .withf(|link| link == "spotify:nonsense")
        .returning(|link| Err(BridgeError::InvalidLink(link.to_string())));
    let (session, _tx) = session(native);

    let link = session.resolve_link("spotify:track:7").unwrap();
    let resolved = link.as_track().unwrap();
    assert_eq!(resolved.key(), EntityKey::track(7));
    assert_eq!(session.resolve_link("spotify:track:7").unwrap(), link);
    assert!(matches!(link, Link::Track(_)));

    assert!(session.resolve_link("spotify:nonsense").is_err());
}

#[test]
fn test_global_table_on_off() {
    let (session, tx) = session(MockNativeSession::new());
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);

    session.on(CallbackTable::new().on(EventName::EndOfTrack, move |_| *counter.borrow_mut() += 1));
    tx.end_of_track();
    assert_eq!(session.process_events(), 1);

    session.off();
    tx.end_of_track();
    session.process_events();

    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_wait_for_events_times_out() {
    let (session, _tx) = session(MockNativeSession::new());
    assert_eq!(session.wait_for_events(Some(Duration::from_millis(10))), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = BridgeConfig::builder()
        .native_session(Arc::new(MockNativeSession::new()))
        .build()
        .unwrap();
    let mut invalid = config.clone();
    invalid.search_defaults.limit = 0;
    let (_sender, receiver) = channel(&SignalConfig::default());

    assert!(matches!(
        Session::new(invalid, receiver),
        Err(CoreError::InitializationFailed(_))
    ));
}

#[tokio::test]
async fn test_next_events_wakes_on_native_thread() {
    let (session, tx) = session(MockNativeSession::new());
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    session.on(CallbackTable::new().on(EventName::EndOfTrack, move |_| *counter.borrow_mut() += 1));

    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        tx.end_of_track();
    });

    assert_eq!(session.next_events().await, 1);
    assert_eq!(*hits.borrow(), 1);
}
