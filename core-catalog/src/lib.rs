//! # Catalog Module
//!
//! Typed host-side handles for the native catalogue: tracks, albums,
//! artists, users, searches, playlists, playlist folders and playlist
//! containers.
//!
//! ## Overview
//!
//! Every handle is a thin newtype over a [`Proxy`](core_host::Proxy), so two
//! handles for the same native entity are the same object. Handles are
//! created from native snapshots through [`Host::proxy_for`], which reuses
//! the live proxy when one exists. Lists returned by browses and searches go
//! through the same path, so repeated access yields the same handles.
//!
//! ## Browse-dependent fields
//!
//! Fields that only a browse or search fills in return
//! [`HostError::EntityNotReady`](core_host::HostError::EntityNotReady) until
//! the completion callback has run:
//!
//! ```ignore
//! album.browse(|album, result| {
//!     if result.is_ok() {
//!         println!("{}", album.review().unwrap());
//!     }
//! })?;
//! ```

use bridge_traits::{EntityKey, NativeSession};
use core_host::{Disposition, Entity, Host, Operation, Proxy, Result};
use core_runtime::{EventPayload, PendingEvent};
use tracing::{debug, warn};

/// Declares a newtype handle over `Proxy<$state>`.
macro_rules! entity_handle {
    ($(#[$meta:meta])* $name:ident => $state:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(pub(crate) core_host::Proxy<$state>);

        impl $name {
            /// Returns the handle for the snapshot's entity, creating it on
            /// first access.
            pub fn from_data(
                host: &core_host::Host,
                data: <$state as core_host::Entity>::Data,
            ) -> Self {
                Self(host.proxy_for::<$state>(data))
            }

            pub fn key(&self) -> bridge_traits::EntityKey {
                self.0.key()
            }

            pub fn proxy(&self) -> &core_host::Proxy<$state> {
                &self.0
            }

            /// Clones the current native snapshot.
            pub fn snapshot(&self) -> <$state as core_host::Entity>::Data {
                self.0.snapshot()
            }
        }

        impl From<core_host::Proxy<$state>> for $name {
            fn from(proxy: core_host::Proxy<$state>) -> Self {
                Self(proxy)
            }
        }
    };
}

pub mod album;
pub mod artist;
pub mod container;
pub mod playlist;
pub mod search;
pub mod track;
pub mod user;

pub use album::{Album, AlbumState};
pub use artist::{Artist, ArtistState};
pub use container::{ContainerEntry, ContainerState, FolderState, PlaylistContainer, PlaylistFolder};
pub use playlist::{Playlist, PlaylistState, PlaylistTrack};
pub use search::{Search, SearchCategory, SearchParams, SearchState};
pub use track::{Track, TrackState};
pub use user::{User, UserState};

/// Finishes `operation` from a completion event.
///
/// Native failures complete the operation with their message. A payload
/// `extract` does not recognise completes it as failed, so the proxy is
/// never left pinned.
pub(crate) fn complete_from_event<E, R>(
    operation: &Operation<E, R>,
    proxy: &Proxy<E>,
    event: &PendingEvent,
    extract: impl FnOnce(&EventPayload) -> Option<R>,
) -> Result<Disposition>
where
    E: Entity,
    R: 'static,
{
    let outcome = match &event.payload {
        EventPayload::Failed { message } => Err(message.clone()),
        payload => match extract(payload) {
            Some(result) => Ok(result),
            None => {
                warn!(
                    entity = %proxy.key(),
                    payload = payload.description(),
                    "Completion carries an unexpected payload"
                );
                Err(format!("unexpected payload: {}", payload.description()))
            }
        },
    };
    operation.complete(proxy, outcome)?;
    Ok(Disposition::Consumed)
}

/// Turns native change notifications off for a released playlist or
/// container.
pub(crate) fn stop_notifications(key: EntityKey, native: &dyn NativeSession) {
    match native.set_notifications(key, false) {
        Ok(()) => debug!(entity = %key, "Change notifications stopped"),
        Err(err) => warn!(entity = %key, error = %err, "Failed to stop change notifications"),
    }
}

/// Maps snapshots to handles through the registry.
pub(crate) fn handles<T, D>(host: &Host, items: &[D], make: fn(&Host, D) -> T) -> Vec<T>
where
    D: Clone,
{
    items.iter().cloned().map(|item| make(host, item)).collect()
}

/// Checks a change position against a list that has `len` entries, where
/// `len` itself means "append".
pub(crate) fn check_insert_position(position: usize, len: usize) -> Result<()> {
    if position <= len {
        Ok(())
    } else {
        Err(core_host::HostError::IndexOutOfRange { index: position, len })
    }
}

pub(crate) fn entity_key_list<T>(items: &[T], key: fn(&T) -> EntityKey) -> Vec<EntityKey> {
    items.iter().map(key).collect()
}
