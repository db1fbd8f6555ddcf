//! User handles.

use bridge_traits::{EntityKind, UserData};
use core_host::{Entity, Result};

use crate::container::PlaylistContainer;
use crate::playlist::Playlist;

#[derive(Debug)]
pub struct UserState;

impl Entity for UserState {
    const KIND: EntityKind = EntityKind::User;
    type Data = UserData;

    fn from_snapshot(_: &UserData) -> Self {
        UserState
    }
}

entity_handle!(
    /// A user of the service.
    User => UserState
);

impl User {
    pub fn link(&self) -> String {
        self.0.data().link.clone()
    }

    pub fn canonical_name(&self) -> String {
        self.0.data().canonical_name.clone()
    }

    pub fn display_name(&self) -> String {
        self.0.data().display_name.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    /// The playlists this user has published.
    pub fn published_container(&self) -> Result<PlaylistContainer> {
        let host = self.0.host()?;
        let data = host.native().published_container(self.key())?;
        Ok(PlaylistContainer::from_data(&host, data))
    }

    pub fn starred_playlist(&self) -> Result<Playlist> {
        let host = self.0.host()?;
        let data = host.native().starred_playlist(self.key())?;
        Ok(Playlist::from_data(&host, data))
    }
}
