//! Drives a full session against the in-memory native library.
//!
//! ```text
//! cargo run --example session_demo --features inmemory
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use core_catalog::SearchCategory;
use core_runtime::config::{BridgeConfig, SignalConfig};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::signal::channel;
use native_bridge_workspace::inmemory::{demo, InMemoryConfig, InMemorySession};
use native_bridge_workspace::service::{Link, Session};
use tracing::info;

fn pump_until(session: &Session, done: impl Fn() -> bool) -> Result<()> {
    for _ in 0..100 {
        if done() {
            return Ok(());
        }
        session.wait_for_events(Some(Duration::from_millis(50)));
    }
    bail!("timed out waiting for the native library")
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_env_filter())?;

    let native_config = InMemoryConfig::default()
        .with_native_audio(true)
        .with_latency(Duration::from_millis(20));
    let (sender, receiver) = channel(&SignalConfig::default());
    let native = Arc::new(InMemorySession::spawn(
        demo::catalogue(),
        native_config,
        sender,
    )?);

    let config = BridgeConfig::builder()
        .native_session(native.clone())
        .native_audio(true)
        .build()?;
    let session = Session::new(config, receiver)?;

    let user = session.session_user()?;
    info!(user = %user.display_name(), "Logged in");

    let search = session.search("light");
    let done = Rc::new(Cell::new(false));
    let flag = Rc::clone(&done);
    search.execute(move |_, _| flag.set(true))?;
    pump_until(&session, || done.get())?;
    info!(
        query = %search.query(),
        tracks = search.total(SearchCategory::Tracks)?,
        "Search finished"
    );

    let Link::Album(album) = session.resolve_link("spotify:album:1")? else {
        bail!("expected an album link");
    };
    let browsed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&browsed);
    album.browse(move |_, _| flag.set(true))?;
    pump_until(&session, || browsed.get())?;
    for track in album.tracks()? {
        info!(track = %track.name(), seconds = track.duration(), "Album track");
    }

    let first = album.track(0).context("album has no tracks")?;
    let player = session.player();
    player.play(&first)?;
    player.seek(first.duration().saturating_sub(2))?;
    native.advance_playback(5)?;
    pump_until(&session, || !player.is_playing())?;
    info!(status = ?player.status(), "Playback finished");

    session.shutdown();
    Ok(())
}
