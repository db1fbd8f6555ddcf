use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use bridge_traits::native::MockNativeSession;
use bridge_traits::{
    AudioSink, BridgeError, EntityKey, TrackAvailability, TrackData,
};
use core_catalog::Track;
use core_host::{CallbackTable, Host};
use core_playback::{BufferedSink, PlaybackError, PlaybackStatus, Player};
use core_runtime::config::BridgeConfig;
use core_runtime::signal::channel;
use core_runtime::{EventName, SignalSender};
use mockall::predicate::eq;

fn host_with_audio(native: MockNativeSession, native_audio: bool) -> (Host, SignalSender) {
    let config = BridgeConfig::builder()
        .native_session(Arc::new(native))
        .native_audio(native_audio)
        .build()
        .unwrap();
    let (sender, receiver) = channel(&config.signal);
    (Host::new(config, receiver), sender)
}

fn track(id: u64, availability: TrackAvailability) -> TrackData {
    TrackData {
        key: EntityKey::track(id),
        name: format!("Track {}", id),
        link: format!("spotify:track:{}", id),
        duration_ms: 185_000,
        popularity: 10,
        availability,
        starred: false,
        loaded: true,
        artists: Vec::new(),
        album: None,
    }
}

fn playing(native: &mut MockNativeSession, id: u64) {
    native
        .expect_issue_play()
        .with(eq(EntityKey::track(id)))
        .times(1)
        .returning(|_| Ok(()));
}

#[test]
fn test_unplayable_track_is_refused_without_state_change() {
    let mut native = MockNativeSession::new();
    native.expect_issue_play().never();
    let (host, _tx) = host_with_audio(native, true);

    let player = Player::new(&host);
    let banned = Track::from_data(&host, track(1, TrackAvailability::BannedByArtist));

    let err = player.play(&banned).unwrap_err();
    assert_eq!(err, PlaybackError::UnplayableTrack(EntityKey::track(1)));
    assert!(err.is_refusal());
    assert_eq!(player.status(), PlaybackStatus::Stopped);
    assert!(player.current_track().unwrap().is_none());
}

#[test]
fn test_native_refusal_keeps_previous_track() {
    let mut native = MockNativeSession::new();
    playing(&mut native, 1);
    native
        .expect_issue_play()
        .with(eq(EntityKey::track(2)))
        .returning(|key| Err(BridgeError::NotPlayable(key)));
    let (host, _tx) = host_with_audio(native, true);

    let player = Player::new(&host);
    let first = Track::from_data(&host, track(1, TrackAvailability::Available));
    let second = Track::from_data(&host, track(2, TrackAvailability::Available));

    player.play(&first).unwrap();
    let err = player.play(&second).unwrap_err();

    assert_eq!(err, PlaybackError::UnplayableTrack(EntityKey::track(2)));
    assert_eq!(player.current_track().unwrap(), Some(first));
    assert!(player.is_playing());
}

#[test]
fn test_play_without_output_fails() {
    let mut native = MockNativeSession::new();
    native.expect_issue_play().never();
    let (host, _tx) = host_with_audio(native, false);

    let player = Player::new(&host);
    let song = Track::from_data(&host, track(1, TrackAvailability::Available));

    assert_eq!(player.play(&song), Err(PlaybackError::NoPlaybackSink));
    assert!(!player.has_output().unwrap());
}

#[test]
fn test_attached_sink_enables_playback() {
    let mut native = MockNativeSession::new();
    native
        .expect_attach_audio_sink()
        .times(1)
        .returning(|_| Ok(()));
    playing(&mut native, 1);
    let (host, _tx) = host_with_audio(native, false);

    let player = Player::new(&host);
    let sink: Arc<dyn AudioSink> = Arc::new(BufferedSink::new(4096));
    player.use_audio_sink(sink).unwrap();

    let song = Track::from_data(&host, track(1, TrackAvailability::Available));
    player.play(&song).unwrap();
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn test_player_is_a_singleton() {
    let (host, _tx) = host_with_audio(MockNativeSession::new(), true);
    let a = Player::new(&host);
    let b = Player::new(&host);
    assert_eq!(a, b);
    assert_eq!(a.key(), EntityKey::PLAYER);
}

#[test]
fn test_pause_resume_stop() {
    let mut native = MockNativeSession::new();
    playing(&mut native, 1);
    native.expect_issue_pause().times(1).returning(|| Ok(()));
    native.expect_issue_resume().times(1).returning(|| Ok(()));
    native.expect_issue_stop().times(1).returning(|| Ok(()));
    native.expect_current_second().returning(|| 42);
    let (host, _tx) = host_with_audio(native, true);

    let player = Player::new(&host);
    assert_eq!(player.pause(), Err(PlaybackError::NoTrackLoaded));
    assert_eq!(player.current_second().unwrap(), 0);

    let song = Track::from_data(&host, track(1, TrackAvailability::Available));
    player.play(&song).unwrap();
    assert_eq!(player.current_second().unwrap(), 42);

    player.pause().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Paused);
    player.resume().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Playing);
    player.stop().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Stopped);

    // Second stop does not reach the native library.
    player.stop().unwrap();
}

#[test]
fn test_seek_is_bounded_by_track_length() {
    let mut native = MockNativeSession::new();
    playing(&mut native, 1);
    native
        .expect_issue_seek()
        .with(eq(185))
        .times(1)
        .returning(|_| Ok(()));
    let (host, _tx) = host_with_audio(native, true);

    let player = Player::new(&host);
    assert_eq!(player.seek(10), Err(PlaybackError::NoTrackLoaded));

    let song = Track::from_data(&host, track(1, TrackAvailability::Available));
    player.play(&song).unwrap();

    assert_eq!(
        player.seek(186),
        Err(PlaybackError::SeekOutOfRange {
            second: 186,
            duration: 185
        })
    );
    player.seek(185).unwrap();
}

#[test]
fn test_end_of_track_stops_player_before_callback() {
    let mut native = MockNativeSession::new();
    playing(&mut native, 1);
    let (host, tx) = host_with_audio(native, true);

    let player = Player::new(&host);
    let song = Track::from_data(&host, track(1, TrackAvailability::Available));
    player.play(&song).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let observed = player.clone();
    player
        .on(CallbackTable::new().on(EventName::EndOfTrack, move |inv| {
            assert_eq!(inv.target.as_ref().map(|t| t.key()), Some(EntityKey::PLAYER));
            log.borrow_mut().push(observed.status());
        }))
        .unwrap();

    std::thread::spawn(move || tx.end_of_track()).join().unwrap();
    assert_eq!(host.process_events(), 1);

    assert_eq!(*seen.borrow(), vec![PlaybackStatus::Stopped]);
    assert!(player.current_track().unwrap().is_none());
}

#[test]
fn test_end_of_track_falls_back_to_global_table() {
    let (host, tx) = host_with_audio(MockNativeSession::new(), true);
    let player = Player::new(&host);

    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    host.global_subscribe(
        CallbackTable::new().on(EventName::EndOfTrack, move |_| *counter.borrow_mut() += 1),
    );

    tx.end_of_track();
    host.process_events();
    assert_eq!(*hits.borrow(), 1);

    // A player table takes precedence once installed.
    player.on(CallbackTable::new().on(EventName::EndOfTrack, |_| {})).unwrap();
    tx.end_of_track();
    host.process_events();
    assert_eq!(*hits.borrow(), 1);

    player.off().unwrap();
    tx.end_of_track();
    host.process_events();
    assert_eq!(*hits.borrow(), 2);
}

#[test]
fn test_player_table_goes_with_last_handle() {
    let (host, tx) = host_with_audio(MockNativeSession::new(), true);
    let hits = Rc::new(RefCell::new(Vec::new()));

    let global = Rc::clone(&hits);
    host.global_subscribe(
        CallbackTable::new().on(EventName::EndOfTrack, move |_| global.borrow_mut().push("global")),
    );
    let player = Player::new(&host);
    let local = Rc::clone(&hits);
    player
        .on(CallbackTable::new().on(EventName::EndOfTrack, move |_| local.borrow_mut().push("player")))
        .unwrap();

    tx.end_of_track();
    host.process_events();
    drop(player);
    assert!(!host.contains(EntityKey::PLAYER));

    tx.end_of_track();
    host.process_events();
    assert_eq!(*hits.borrow(), vec!["player", "global"]);

    // A fresh player starts from scratch.
    assert_eq!(Player::new(&host).status(), PlaybackStatus::Stopped);
}
