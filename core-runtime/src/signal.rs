//! # Cross-Thread Signal
//!
//! The only piece of machinery that crosses from the native background
//! thread to the host thread.
//!
//! ## Overview
//!
//! ```text
//! native thread                          host thread
//! ─────────────                          ───────────
//! SignalSender::raise ──┐
//!                       ▼
//!              ┌──────────────────┐
//!              │ Mutex<VecDeque>  │  seq assigned under the lock
//!              └──────────────────┘
//!                       │ Condvar::notify_one / Notify::notify_one
//!                       ▼
//!                        SignalReceiver::wait_blocking / wait ─► drain()
//! ```
//!
//! The sender only ever touches the queue; it never sees a host object. The
//! receiver drains everything in FIFO order, so two events raised E1 then E2
//! (for the same entity or not) are always handed out E1 then E2.
//!
//! ## Failure
//!
//! A completion that never reaches the host would leave its proxy pinned
//! forever, so [`SignalSender::raise`] treats a full queue as fatal and
//! aborts the process. [`SignalSender::try_raise`] reports the same condition
//! as an error for callers that want to handle it themselves.
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::EntityKey;
//! use core_runtime::config::SignalConfig;
//! use core_runtime::signal;
//!
//! let (tx, rx) = signal::channel(&SignalConfig::default());
//! std::thread::spawn(move || tx.end_of_track()).join().unwrap();
//! let events = rx.drain();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].target, Some(EntityKey::PLAYER));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bridge_traits::{
    AlbumBrowseData, ArtistBrowseData, ContainerChange, EntityKey, PlaylistChange,
    SearchResultData,
};
use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{error, trace, warn};

use crate::config::SignalConfig;
use crate::events::{EventName, EventPayload};

/// An event raised on the native thread, waiting for the host thread.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    /// Position in the global raise order.
    pub seq: u64,
    /// Entity the event is about, if any.
    pub target: Option<EntityKey>,
    pub name: EventName,
    pub payload: EventPayload,
    pub raised_at: Instant,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Signal receiver has been dropped")]
    Disconnected,

    #[error("Signal queue is full ({capacity} pending events)")]
    QueueFull { capacity: usize },
}

struct Queue {
    events: VecDeque<PendingEvent>,
    next_seq: u64,
    receiver_alive: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    condvar: Condvar,
    notify: Notify,
    capacity: Option<usize>,
}

/// Creates a connected sender/receiver pair.
pub fn channel(config: &SignalConfig) -> (SignalSender, SignalReceiver) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(Queue {
            events: VecDeque::new(),
            next_seq: 0,
            receiver_alive: true,
        }),
        condvar: Condvar::new(),
        notify: Notify::new(),
        capacity: config.capacity,
    });

    (
        SignalSender {
            shared: Arc::clone(&shared),
        },
        SignalReceiver { shared },
    )
}

// ============================================================================
// Sender (any thread)
// ============================================================================

/// Native-side handle. Cheap to clone and safe to move to any thread.
#[derive(Clone)]
pub struct SignalSender {
    shared: Arc<Shared>,
}

impl SignalSender {
    /// Queues an event and wakes the host thread.
    ///
    /// Returns the sequence number assigned to the event.
    pub fn try_raise(
        &self,
        target: Option<EntityKey>,
        name: EventName,
        payload: EventPayload,
    ) -> Result<u64, SignalError> {
        let seq = {
            let mut queue = self.shared.queue.lock();
            if !queue.receiver_alive {
                return Err(SignalError::Disconnected);
            }
            if let Some(capacity) = self.shared.capacity {
                if queue.events.len() >= capacity {
                    return Err(SignalError::QueueFull { capacity });
                }
            }

            let seq = queue.next_seq;
            queue.next_seq += 1;
            queue.events.push_back(PendingEvent {
                seq,
                target,
                name,
                payload,
                raised_at: Instant::now(),
            });
            seq
        };

        self.shared.condvar.notify_one();
        self.shared.notify.notify_one();

        trace!(seq, event = %name, target = ?target, "Raised event");
        Ok(seq)
    }

    /// Queues an event, aborting the process if the queue cannot take it.
    ///
    /// A receiver that is already gone is not fatal: the host and every pin
    /// it held are gone with it, so the event is logged and discarded.
    pub fn raise(&self, target: Option<EntityKey>, name: EventName, payload: EventPayload) {
        match self.try_raise(target, name, payload) {
            Ok(_) => {}
            Err(SignalError::Disconnected) => {
                warn!(event = %name, target = ?target, "Host is gone, discarding event");
            }
            Err(err) => {
                error!(event = %name, target = ?target, error = %err, "Cannot deliver event to host");
                std::process::abort();
            }
        }
    }

    pub fn album_browse_complete(&self, album: EntityKey, result: AlbumBrowseData) {
        self.raise(
            Some(album),
            EventName::BrowseComplete,
            EventPayload::AlbumBrowse(Box::new(result)),
        );
    }

    pub fn artist_browse_complete(&self, artist: EntityKey, result: ArtistBrowseData) {
        self.raise(
            Some(artist),
            EventName::BrowseComplete,
            EventPayload::ArtistBrowse(Box::new(result)),
        );
    }

    pub fn search_complete(&self, search: EntityKey, result: SearchResultData) {
        self.raise(
            Some(search),
            EventName::SearchComplete,
            EventPayload::Search(Box::new(result)),
        );
    }

    /// Completes a browse or search with a native failure.
    pub fn request_failed(&self, target: EntityKey, name: EventName, message: impl Into<String>) {
        self.raise(
            Some(target),
            name,
            EventPayload::Failed {
                message: message.into(),
            },
        );
    }

    pub fn end_of_track(&self) {
        self.raise(
            Some(EntityKey::PLAYER),
            EventName::EndOfTrack,
            EventPayload::Empty,
        );
    }

    pub fn playlist_changed(&self, playlist: EntityKey, change: PlaylistChange) {
        let name = EventName::for_playlist_change(&change);
        self.raise(Some(playlist), name, EventPayload::Playlist(change));
    }

    pub fn container_changed(&self, container: EntityKey, change: ContainerChange) {
        let name = EventName::for_container_change(&change);
        self.raise(Some(container), name, EventPayload::Container(change));
    }

    /// `false` once the receiver has been dropped.
    pub fn is_connected(&self) -> bool {
        self.shared.queue.lock().receiver_alive
    }
}

impl fmt::Debug for SignalSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSender")
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

// ============================================================================
// Receiver (host thread)
// ============================================================================

/// Host-side handle.
pub struct SignalReceiver {
    shared: Arc<Shared>,
}

impl SignalReceiver {
    /// Takes every pending event, oldest first.
    pub fn drain(&self) -> Vec<PendingEvent> {
        let mut queue = self.shared.queue.lock();
        queue.events.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.lock().events.len()
    }

    /// Blocks until at least one event is pending or `timeout` elapses.
    ///
    /// Returns `true` if events are pending. `None` waits indefinitely.
    pub fn wait_blocking(&self, timeout: Option<Duration>) -> bool {
        let mut queue = self.shared.queue.lock();
        match timeout {
            None => {
                while queue.events.is_empty() {
                    self.shared.condvar.wait(&mut queue);
                }
                true
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while queue.events.is_empty() {
                    if self
                        .shared
                        .condvar
                        .wait_until(&mut queue, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                !queue.events.is_empty()
            }
        }
    }

    /// Waits asynchronously until at least one event is pending.
    pub async fn wait(&self) {
        loop {
            if self.pending() > 0 {
                return;
            }
            // A raise between the check and this await leaves a stored permit.
            self.shared.notify.notified().await;
        }
    }
}

impl Drop for SignalReceiver {
    fn drop(&mut self) {
        let discarded = {
            let mut queue = self.shared.queue.lock();
            queue.receiver_alive = false;
            std::mem::take(&mut queue.events)
        };
        if !discarded.is_empty() {
            warn!(count = discarded.len(), "Receiver dropped with undelivered events");
        }
    }
}

impl fmt::Debug for SignalReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalReceiver")
            .field("pending", &self.pending())
            .finish()
    }
}
