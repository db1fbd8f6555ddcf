//! Core service façade and bootstrap helpers.
//!
//! This crate wires a host-provided [`NativeSession`] and the receiving end of
//! the cross-thread signal into a [`Session`], the single object scripting
//! bindings talk to. The session owns the host thread's proxy registry and
//! keeps the player alive for its whole lifetime.
//!
//! ```ignore
//! let (sender, receiver) = core_runtime::signal::channel(&SignalConfig::default());
//! let native = Arc::new(MyNativeSession::connect(sender)?);
//!
//! let config = BridgeConfig::builder()
//!     .native_session(native)
//!     .native_audio(true)
//!     .build()?;
//! let session = Session::new(config, receiver)?;
//!
//! session.search("daft punk").execute(|search, result| { /* ... */ })?;
//! loop {
//!     session.wait_for_events(None);
//! }
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{LinkTarget, NativeSession};
use core_catalog::{Album, Artist, Playlist, PlaylistContainer, Search, Track, User};
use core_host::{CallbackTable, Host};
use core_playback::Player;
use core_runtime::config::BridgeConfig;
use core_runtime::SignalReceiver;
use tracing::{debug, info};

/// Entity a link resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Track(Track),
    Album(Album),
    Artist(Artist),
    Playlist(Playlist),
    User(User),
}

impl Link {
    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Link::Track(track) => Some(track),
            _ => None,
        }
    }
}

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the same host. A session is bound to the
/// thread that created it.
#[derive(Clone, Debug)]
pub struct Session {
    host: Host,
    player: Player,
}

impl Session {
    /// Create a session from a validated configuration and the receiving end
    /// of the signal the native library raises events through.
    pub fn new(config: BridgeConfig, receiver: SignalReceiver) -> Result<Self> {
        config.validate()?;
        let audio_sink = config.audio_sink.clone();

        let host = Host::new(config, receiver);
        let player = Player::new(&host);
        if let Some(sink) = audio_sink {
            player.use_audio_sink(sink)?;
        }

        info!(
            native_audio = host.config().native_audio,
            reentry_policy = ?host.config().reentry_policy,
            "Session started"
        );
        Ok(Self { host, player })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        self.host.config()
    }

    pub fn native(&self) -> &Arc<dyn NativeSession> {
        self.host.native()
    }

    pub fn player(&self) -> Player {
        self.player.clone()
    }

    /// The logged-in user.
    pub fn session_user(&self) -> Result<User> {
        let data = self.native().session_user()?;
        Ok(User::from_data(&self.host, data))
    }

    /// The logged-in user's playlist container.
    pub fn playlist_container(&self) -> Result<PlaylistContainer> {
        let data = self.native().session_container()?;
        Ok(PlaylistContainer::from_data(&self.host, data))
    }

    /// A search with the configured default offset and limit.
    pub fn search(&self, query: impl Into<String>) -> Search {
        Search::new(&self.host, query)
    }

    pub fn search_with_offset(&self, query: impl Into<String>, offset: u32) -> Search {
        Search::with_offset(&self.host, query, offset)
    }

    pub fn search_with_page(&self, query: impl Into<String>, offset: u32, limit: u32) -> Search {
        Search::with_page(&self.host, query, offset, limit)
    }

    /// Resolves a `spotify:` URI to the handle of the linked entity.
    pub fn resolve_link(&self, link: &str) -> Result<Link> {
        let target = self.native().resolve_link(link)?;
        debug!(link, "Link resolved");
        Ok(match target {
            LinkTarget::Track(data) => Link::Track(Track::from_data(&self.host, data)),
            LinkTarget::Album(data) => Link::Album(Album::from_data(&self.host, data)),
            LinkTarget::Artist(data) => Link::Artist(Artist::from_data(&self.host, data)),
            LinkTarget::Playlist(data) => Link::Playlist(Playlist::from_data(&self.host, data)),
            LinkTarget::User(data) => Link::User(User::from_data(&self.host, data)),
        })
    }

    /// Installs `table` as the global callbacks, used for events whose
    /// target has no table of its own.
    pub fn on(&self, table: CallbackTable) {
        self.host.global_subscribe(table);
    }

    pub fn off(&self) {
        self.host.global_unsubscribe();
    }

    /// Dispatches every pending event without blocking.
    pub fn process_events(&self) -> usize {
        self.host.process_events()
    }

    /// Blocks until an event arrives or `timeout` passes, then dispatches.
    pub fn wait_for_events(&self, timeout: Option<Duration>) -> usize {
        self.host.wait_for_events(timeout)
    }

    /// Waits for events on an async runtime, then dispatches them.
    pub async fn next_events(&self) -> usize {
        self.host.next_events().await
    }

    pub fn shutdown(&self) {
        self.host.shutdown();
        info!("Session shut down");
    }
}
