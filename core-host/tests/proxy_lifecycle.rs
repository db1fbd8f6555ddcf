mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bridge_traits::native::MockNativeSession;
use bridge_traits::{EntityKey, PlaylistChange};
use common::*;
use core_host::{CallbackTable, Invocation, Proxy};
use core_runtime::EventName;
use mockall::predicate::eq;

#[test]
fn test_same_entity_yields_same_proxy() {
    let (host, _sender) = host(MockNativeSession::new());

    let first = host.proxy_for::<TestAlbum>(album_data(1, "Blue"));
    let second = host.proxy_for::<TestAlbum>(album_data(1, "Blue (Remastered)"));

    assert!(Proxy::ptr_eq(&first, &second));
    assert_eq!(second.data().name, "Blue");
    assert_eq!(host.live_proxies(), 1);
}

#[test]
fn test_distinct_entities_yield_distinct_proxies() {
    let (host, _sender) = host(MockNativeSession::new());

    let a = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    let b = host.proxy_for::<TestAlbum>(album_data(2, "B"));

    assert!(!Proxy::ptr_eq(&a, &b));
    assert_eq!(host.live_proxies(), 2);
}

#[test]
fn test_back_reference_cleared_when_last_handle_dropped() {
    let (host, _sender) = host(MockNativeSession::new());
    let key = EntityKey::album(1);

    let album = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    let clone = album.clone();
    assert_eq!(host.back_reference(key), Some(album.id().serial));

    drop(album);
    assert!(host.back_reference(key).is_some());

    drop(clone);
    assert_eq!(host.back_reference(key), None);
    assert!(host.lookup(key).is_none());
    assert_eq!(host.live_proxies(), 0);
}

#[test]
fn test_recreated_proxy_gets_fresh_identity() {
    let (host, _sender) = host(MockNativeSession::new());

    let first = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    let first_id = first.id();
    drop(first);

    let second = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    assert_eq!(second.key(), first_id.key);
    assert_ne!(second.id().serial, first_id.serial);
    assert_eq!(host.back_reference(first_id.key), Some(second.id().serial));
}

#[test]
fn test_weak_proxy_does_not_keep_alive() {
    let (host, _sender) = host(MockNativeSession::new());

    let album = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    let weak = album.downgrade();
    assert!(weak.upgrade().is_some());

    drop(album);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_pin_keeps_proxy_alive() {
    let (host, _sender) = host(MockNativeSession::new());
    let key = EntityKey::album(1);

    let album = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    assert!(host.pin(&album));
    assert!(!host.pin(&album));
    drop(album);

    assert!(host.lookup_as::<TestAlbum>(key).is_some());
    assert!(host.is_pinned(key));

    host.unpin(key).unwrap();
    assert!(host.lookup(key).is_none());
    assert!(!host.is_pinned(key));
}

#[test]
fn test_unpin_without_pin_is_an_error() {
    let (host, _sender) = host(MockNativeSession::new());
    let err = host.unpin(EntityKey::album(9)).unwrap_err();
    assert!(err.is_programming_error());
}

#[test]
fn test_events_delivered_in_raise_order() {
    let (host, sender) = host(MockNativeSession::new());
    let playlist = host.proxy_for::<TestPlaylist>(playlist_data(5, "Mix"));
    let order = Rc::new(RefCell::new(Vec::new()));

    let renamed = Rc::clone(&order);
    let removed = Rc::clone(&order);
    host.subscribe(
        &playlist,
        CallbackTable::new()
            .on(EventName::PlaylistRenamed, move |inv: &Invocation| {
                renamed.borrow_mut().push((inv.seq, inv.name))
            })
            .on(EventName::TracksRemoved, move |inv: &Invocation| {
                removed.borrow_mut().push((inv.seq, inv.name))
            }),
    );

    let native = sender.clone();
    std::thread::spawn(move || {
        native.playlist_changed(
            EntityKey::playlist(5),
            PlaylistChange::Renamed {
                name: "New".to_string(),
            },
        );
        native.playlist_changed(
            EntityKey::playlist(5),
            PlaylistChange::TracksRemoved { positions: vec![0] },
        );
    })
    .join()
    .unwrap();

    assert_eq!(host.process_events(), 2);
    let order = order.borrow();
    assert_eq!(order[0].1, EventName::PlaylistRenamed);
    assert_eq!(order[1].1, EventName::TracksRemoved);
    assert!(order[0].0 < order[1].0);
}

#[test]
fn test_resubscribe_replaces_whole_table() {
    let (host, sender) = host(MockNativeSession::new());
    let playlist = host.proxy_for::<TestPlaylist>(playlist_data(5, "Mix"));
    let hits = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&hits);
    host.subscribe(
        &playlist,
        CallbackTable::new().on(EventName::TracksRemoved, move |_: &Invocation| {
            first.borrow_mut().push("first")
        }),
    );
    let second = Rc::clone(&hits);
    host.subscribe(
        &playlist,
        CallbackTable::new().on(EventName::PlaylistRenamed, move |_: &Invocation| {
            second.borrow_mut().push("second")
        }),
    );

    sender.playlist_changed(
        EntityKey::playlist(5),
        PlaylistChange::TracksRemoved { positions: vec![0] },
    );
    sender.playlist_changed(
        EntityKey::playlist(5),
        PlaylistChange::Renamed {
            name: "x".to_string(),
        },
    );
    host.process_events();

    assert_eq!(*hits.borrow(), vec!["second"]);
}

#[test]
fn test_untargeted_event_reaches_global_table() {
    let (host, sender) = host(MockNativeSession::new());
    let seen = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&seen);
    host.global_subscribe(CallbackTable::new().on(
        EventName::EndOfTrack,
        move |inv: &Invocation| {
            assert!(inv.target.is_none());
            *counter.borrow_mut() += 1;
        },
    ));

    sender.end_of_track();
    assert_eq!(host.process_events(), 1);
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_entity_table_wins_over_global() {
    let (host, sender) = host(MockNativeSession::new());
    let playlist = host.proxy_for::<TestPlaylist>(playlist_data(5, "Mix"));
    let hits = Rc::new(RefCell::new(Vec::new()));

    let global = Rc::clone(&hits);
    host.global_subscribe(CallbackTable::new().on(
        EventName::PlaylistRenamed,
        move |_: &Invocation| global.borrow_mut().push("global"),
    ));
    let entity = Rc::clone(&hits);
    host.subscribe(
        &playlist,
        CallbackTable::new().on(EventName::PlaylistRenamed, move |inv: &Invocation| {
            assert!(inv.target_as::<TestPlaylist>().is_some());
            entity.borrow_mut().push("entity")
        }),
    );

    sender.playlist_changed(
        EntityKey::playlist(5),
        PlaylistChange::Renamed {
            name: "x".to_string(),
        },
    );
    host.process_events();

    assert_eq!(*hits.borrow(), vec!["entity"]);
}

#[test]
fn test_subscribing_alone_never_calls_native() {
    // A mock with no expectations panics on any native call.
    let (host, _sender) = host(MockNativeSession::new());

    let playlist = host.proxy_for::<TestPlaylist>(playlist_data(5, "Mix"));
    host.subscribe(&playlist, CallbackTable::new());
    assert!(host.is_subscribed(&playlist));

    drop(playlist);
    assert_eq!(host.live_proxies(), 0);
}

#[test]
fn test_release_hook_runs_when_last_handle_dropped() {
    let mut native = MockNativeSession::new();
    native
        .expect_set_notifications()
        .with(eq(EntityKey::playlist(5)), eq(false))
        .times(1)
        .returning(|_, _| Ok(()));
    let (host, _sender) = host(native);

    let playlist = host.proxy_for::<TestPlaylist>(playlist_data(5, "Mix"));
    playlist.state().notifications.set(true);
    let other = playlist.clone();

    drop(playlist);
    assert_eq!(host.live_proxies(), 1);
    drop(other);
    assert_eq!(host.live_proxies(), 0);
    assert!(!host.contains(EntityKey::playlist(5)));
}

#[test]
fn test_callback_may_reenter_host() {
    let (host, sender) = host(MockNativeSession::new());
    let weak_host = host.downgrade();
    let created = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&created);
    host.global_subscribe(CallbackTable::new().on(
        EventName::EndOfTrack,
        move |_: &Invocation| {
            let host = weak_host.upgrade().unwrap();
            let album = host.proxy_for::<TestAlbum>(album_data(3, "C"));
            host.pin(&album);
            host.global_unsubscribe();
            *slot.borrow_mut() = Some(album.key());
        },
    ));

    sender.end_of_track();
    host.process_events();

    assert_eq!(*created.borrow(), Some(EntityKey::album(3)));
    assert!(host.is_pinned(EntityKey::album(3)));
    assert!(host.lookup_callback(None, EventName::EndOfTrack).is_none());
}

#[test]
fn test_wait_for_events_times_out() {
    let (host, _sender) = host(MockNativeSession::new());
    assert_eq!(host.wait_for_events(Some(Duration::from_millis(10))), 0);
}

#[test]
fn test_wait_for_events_wakes_on_raise() {
    let (host, sender) = host(MockNativeSession::new());

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        sender.end_of_track();
    });

    assert_eq!(host.wait_for_events(Some(Duration::from_secs(5))), 1);
    handle.join().unwrap();
}

#[tokio::test]
async fn test_next_events_wakes_async_host() {
    let (host, sender) = host(MockNativeSession::new());

    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        sender.end_of_track();
    });

    let delivered = tokio::time::timeout(Duration::from_secs(5), host.next_events())
        .await
        .unwrap();
    assert_eq!(delivered, 1);
    handle.join().unwrap();
}

#[test]
fn test_shutdown_releases_pins_and_callbacks() {
    let (host, _sender) = host(MockNativeSession::new());
    let album = host.proxy_for::<TestAlbum>(album_data(1, "A"));
    host.pin(&album);
    host.global_subscribe(CallbackTable::new().on(EventName::EndOfTrack, |_: &Invocation| {}));
    drop(album);

    host.shutdown();

    assert_eq!(host.pinned_count(), 0);
    assert_eq!(host.live_proxies(), 0);
    assert!(host.lookup_callback(None, EventName::EndOfTrack).is_none());
}
