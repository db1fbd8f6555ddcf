//! Playlist containers and folders.
//!
//! A container lists playlists interleaved with folder markers. Folders are
//! not nested objects: a `FolderStart` entry opens a folder and the matching
//! `FolderEnd` entry closes it.

use std::cell::Cell;

use bridge_traits::{
    model::{move_positions, remove_positions},
    ContainerChange, ContainerItem, EntityKey, EntityKind, FolderBoundary, NativeSession,
    PlaylistContainerData, PlaylistFolderData,
};
use core_host::{CallbackTable, Disposition, Entity, Host, HostError, Proxy, Result};
use core_runtime::{EventPayload, PendingEvent};
use tracing::debug;

use crate::playlist::Playlist;
use crate::user::User;

/// Longest playlist name the native library accepts.
pub const MAX_PLAYLIST_NAME_LEN: usize = 255;

#[derive(Debug)]
pub struct FolderState;

impl Entity for FolderState {
    const KIND: EntityKind = EntityKind::PlaylistFolder;
    type Data = PlaylistFolderData;

    fn from_snapshot(_: &PlaylistFolderData) -> Self {
        FolderState
    }
}

entity_handle!(
    /// A folder marker inside a playlist container.
    PlaylistFolder => FolderState
);

impl PlaylistFolder {
    pub fn name(&self) -> String {
        self.0.data().name.clone()
    }

    pub fn boundary(&self) -> FolderBoundary {
        self.0.data().boundary
    }
}

/// One entry of a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEntry {
    Playlist(Playlist),
    Folder(PlaylistFolder),
}

impl ContainerEntry {
    fn from_item(host: &Host, item: ContainerItem) -> Self {
        match item {
            ContainerItem::Playlist(data) => ContainerEntry::Playlist(Playlist::from_data(host, data)),
            ContainerItem::Folder(data) => ContainerEntry::Folder(PlaylistFolder::from_data(host, data)),
        }
    }

    pub fn as_playlist(&self) -> Option<&Playlist> {
        match self {
            ContainerEntry::Playlist(playlist) => Some(playlist),
            ContainerEntry::Folder(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContainerState {
    notifications: Cell<bool>,
}

impl Entity for ContainerState {
    const KIND: EntityKind = EntityKind::PlaylistContainer;
    type Data = PlaylistContainerData;

    fn from_snapshot(_: &PlaylistContainerData) -> Self {
        ContainerState::default()
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        if let EventPayload::Container(change) = &event.payload {
            proxy.update_data(|data| apply_change(data, change));
        }
        Ok(Disposition::Forward)
    }

    fn on_release(&self, key: EntityKey, native: &dyn NativeSession) {
        if self.notifications.get() {
            crate::stop_notifications(key, native);
        }
    }
}

/// Applies a change notification to a container snapshot.
pub fn apply_change(data: &mut PlaylistContainerData, change: &ContainerChange) {
    match change {
        ContainerChange::PlaylistAdded { item, position } => {
            let at = (*position).min(data.items.len());
            data.items.insert(at, item.clone());
        }
        ContainerChange::PlaylistRemoved { position } => {
            remove_positions(&mut data.items, &[*position]);
        }
        ContainerChange::PlaylistMoved {
            position,
            new_position,
        } => move_positions(&mut data.items, &[*position], *new_position),
    }
}

entity_handle!(
    /// A user's list of playlists and folders.
    PlaylistContainer => ContainerState
);

impl PlaylistContainer {
    pub fn owner(&self) -> Result<Option<User>> {
        let owner = self.0.data().owner.clone();
        match owner {
            Some(data) => Ok(Some(User::from_data(&self.0.host()?, data))),
            None => Ok(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data().loaded
    }

    /// Number of entries, folder markers included.
    pub fn num_playlists(&self) -> usize {
        self.0.data().items.len()
    }

    pub fn playlists(&self) -> Result<Vec<ContainerEntry>> {
        let host = self.0.host()?;
        let items = self.0.data().items.clone();
        Ok(items
            .into_iter()
            .map(|item| ContainerEntry::from_item(&host, item))
            .collect())
    }

    pub fn playlist(&self, index: usize) -> Result<ContainerEntry> {
        let item = {
            let data = self.0.data();
            HostError::check_index(index, data.items.len())?;
            data.items[index].clone()
        };
        Ok(ContainerEntry::from_item(&self.0.host()?, item))
    }

    /// Creates a playlist at the end of the container.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or over-long name
    /// - `CreationFailed` if the native library refuses
    pub fn add_playlist(&self, name: &str) -> Result<Playlist> {
        validate_name(name)?;
        let host = self.0.host()?;
        let data = host.native().add_playlist(self.key(), name)?;
        debug!(container = %self.key(), playlist = %data.key, "Playlist created");
        Ok(Playlist::from_data(&host, data))
    }

    /// Inserts a folder before `index`.
    pub fn add_folder(&self, index: usize, name: &str) -> Result<()> {
        validate_name(name)?;
        crate::check_insert_position(index, self.num_playlists())?;
        self.0
            .host()?
            .native()
            .add_folder(self.key(), index, name)?;
        Ok(())
    }

    pub fn delete_playlist(&self, index: usize) -> Result<()> {
        HostError::check_index(index, self.num_playlists())?;
        self.0.host()?.native().remove_playlist(self.key(), index)?;
        Ok(())
    }

    /// Moves the entry at `index` in front of the entry at `new_position`.
    pub fn move_playlist(&self, index: usize, new_position: usize) -> Result<()> {
        let len = self.num_playlists();
        HostError::check_index(index, len)?;
        crate::check_insert_position(new_position, len)?;
        self.0
            .host()?
            .native()
            .move_playlist(self.key(), index, new_position)?;
        Ok(())
    }

    /// Installs `table` as this container's callbacks and starts native
    /// change notifications.
    pub fn on(&self, table: CallbackTable) -> Result<()> {
        let host = self.0.host()?;
        if !self.0.state().notifications.get() {
            host.native().set_notifications(self.key(), true)?;
            self.0.state().notifications.set(true);
        }
        host.subscribe(&self.0, table);
        Ok(())
    }

    pub fn off(&self) -> Result<()> {
        let host = self.0.host()?;
        host.unsubscribe(&self.0);
        if self.0.state().notifications.replace(false) {
            host.native().set_notifications(self.key(), false)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HostError::InvalidArgument("Name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_PLAYLIST_NAME_LEN {
        return Err(HostError::InvalidArgument(format!(
            "Name longer than {} characters",
            MAX_PLAYLIST_NAME_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::EntityKey;

    fn folder(id: u64, boundary: FolderBoundary) -> ContainerItem {
        ContainerItem::Folder(PlaylistFolderData {
            key: EntityKey::folder(id),
            name: format!("Folder {}", id),
            boundary,
        })
    }

    fn container(items: Vec<ContainerItem>) -> PlaylistContainerData {
        PlaylistContainerData {
            key: EntityKey::container(1),
            owner: None,
            loaded: true,
            items,
        }
    }

    fn keys(data: &PlaylistContainerData) -> Vec<EntityKey> {
        data.items.iter().map(ContainerItem::key).collect()
    }

    #[test]
    fn test_apply_added_removed_moved() {
        let mut data = container(vec![
            folder(1, FolderBoundary::FolderStart),
            folder(1, FolderBoundary::FolderEnd),
        ]);

        apply_change(
            &mut data,
            &ContainerChange::PlaylistAdded {
                item: folder(2, FolderBoundary::FolderStart),
                position: 0,
            },
        );
        assert_eq!(data.items.len(), 3);
        assert_eq!(keys(&data)[0], EntityKey::folder(2));

        apply_change(
            &mut data,
            &ContainerChange::PlaylistMoved {
                position: 0,
                new_position: 3,
            },
        );
        assert_eq!(keys(&data)[2], EntityKey::folder(2));

        apply_change(&mut data, &ContainerChange::PlaylistRemoved { position: 2 });
        assert_eq!(data.items.len(), 2);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Mix").is_ok());
        assert!(matches!(validate_name("  "), Err(HostError::InvalidArgument(_))));
        let long = "x".repeat(MAX_PLAYLIST_NAME_LEN + 1);
        assert!(matches!(validate_name(&long), Err(HostError::InvalidArgument(_))));
    }
}
