//! Searches.
//!
//! A search is created on the host side with a query and a page (offset and
//! limit) per result category. The pages may be changed until the search is
//! executed; from then on they are frozen and the setters fail with
//! `ParametersFrozen`.
//!
//! ```ignore
//! let search = Search::with_page(&host, "blue", 0, 20);
//! search.set_limit(SearchCategory::Playlists, 5)?;
//! search.execute(|search, result| {
//!     for track in search.tracks().unwrap() {
//!         println!("{}", track.name());
//!     }
//! })?;
//! ```

use std::fmt;
use std::rc::Rc;

use bridge_traits::{
    EntityKey, EntityKind, SearchPage, SearchQuery, SearchResultData, Snapshot,
};
use core_host::{
    Disposition, Entity, Host, HostError, Operation, OperationState, Proxy, RequestOutcome, Result,
};
use core_runtime::{EventName, EventPayload, PendingEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::album::Album;
use crate::artist::Artist;
use crate::playlist::Playlist;
use crate::track::Track;

/// Result category with its own page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchCategory {
    Tracks,
    Albums,
    Artists,
    Playlists,
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 4] = [
        SearchCategory::Tracks,
        SearchCategory::Albums,
        SearchCategory::Artists,
        SearchCategory::Playlists,
    ];

    fn page(self, query: &SearchQuery) -> SearchPage {
        match self {
            SearchCategory::Tracks => query.tracks,
            SearchCategory::Albums => query.albums,
            SearchCategory::Artists => query.artists,
            SearchCategory::Playlists => query.playlists,
        }
    }

    fn page_mut(self, query: &mut SearchQuery) -> &mut SearchPage {
        match self {
            SearchCategory::Tracks => &mut query.tracks,
            SearchCategory::Albums => &mut query.albums,
            SearchCategory::Artists => &mut query.artists,
            SearchCategory::Playlists => &mut query.playlists,
        }
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchCategory::Tracks => "tracks",
            SearchCategory::Albums => "albums",
            SearchCategory::Artists => "artists",
            SearchCategory::Playlists => "playlists",
        };
        f.write_str(name)
    }
}

/// Host-side snapshot of a search: its key and the parameters it will be
/// executed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub key: EntityKey,
    pub query: SearchQuery,
}

impl Snapshot for SearchParams {
    fn key(&self) -> EntityKey {
        self.key
    }
}

pub struct SearchState {
    execute: Operation<SearchState, SearchResultData>,
}

impl Entity for SearchState {
    const KIND: EntityKind = EntityKind::Search;
    type Data = SearchParams;

    fn from_snapshot(data: &SearchParams) -> Self {
        Self {
            execute: Operation::new(data.key),
        }
    }

    fn apply_event(proxy: &Proxy<Self>, event: &PendingEvent) -> Result<Disposition> {
        if event.name != EventName::SearchComplete {
            return Ok(Disposition::Forward);
        }
        crate::complete_from_event(&proxy.state().execute, proxy, event, |payload| {
            match payload {
                EventPayload::Search(result) => Some((**result).clone()),
                _ => None,
            }
        })
    }
}

entity_handle!(
    /// A search query and, once executed, its results.
    Search => SearchState
);

impl Search {
    /// A search with the configured default offset and limit.
    pub fn new(host: &Host, query: impl Into<String>) -> Self {
        let defaults = host.config().search_defaults;
        Self::with_page(host, query, defaults.offset, defaults.limit)
    }

    /// A search starting at `offset` in every category, with the default limit.
    pub fn with_offset(host: &Host, query: impl Into<String>, offset: u32) -> Self {
        let limit = host.config().search_defaults.limit;
        Self::with_page(host, query, offset, limit)
    }

    /// A search using the same offset and limit in every category.
    pub fn with_page(host: &Host, query: impl Into<String>, offset: u32, limit: u32) -> Self {
        let params = SearchParams {
            key: host.allocate_key(EntityKind::Search),
            query: SearchQuery::uniform(query, SearchPage::new(offset, limit)),
        };
        Self::from_data(host, params)
    }

    pub fn query(&self) -> String {
        self.0.data().query.query.clone()
    }

    pub fn page(&self, category: SearchCategory) -> SearchPage {
        category.page(&self.0.data().query)
    }

    pub fn offset(&self, category: SearchCategory) -> u32 {
        self.page(category).offset
    }

    pub fn limit(&self, category: SearchCategory) -> u32 {
        self.page(category).limit
    }

    pub fn set_offset(&self, category: SearchCategory, offset: u32) -> Result<()> {
        self.ensure_editable()?;
        self.0
            .update_data(|data| category.page_mut(&mut data.query).offset = offset);
        Ok(())
    }

    pub fn set_limit(&self, category: SearchCategory, limit: u32) -> Result<()> {
        self.ensure_editable()?;
        if limit == 0 {
            return Err(HostError::InvalidArgument(format!(
                "{} limit must be greater than 0",
                category
            )));
        }
        self.0
            .update_data(|data| category.page_mut(&mut data.query).limit = limit);
        Ok(())
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.0.state().execute.state() {
            OperationState::Idle => Ok(()),
            _ => Err(HostError::ParametersFrozen),
        }
    }

    /// Runs the search. The parameters are captured now.
    pub fn execute<F>(&self, callback: F) -> Result<RequestOutcome>
    where
        F: Fn(Search, Result<()>) + 'static,
    {
        let key = self.key();
        let query = self.0.data().query.clone();
        debug!(search = %key, query = %query.query, "Executing search");
        self.0.state().execute.request(
            &self.0,
            Rc::new(move |proxy: Proxy<SearchState>, result: Result<()>| {
                callback(Search(proxy), result)
            }),
            move |native| native.issue_search(key, &query),
        )
    }

    pub fn state(&self) -> OperationState {
        self.0.state().execute.state()
    }

    fn result(&self) -> Result<Rc<SearchResultData>> {
        self.0.state().execute.result()
    }

    pub fn did_you_mean(&self) -> Result<Option<String>> {
        Ok(self.result()?.did_you_mean.clone())
    }

    /// Link to the search, usable with `Session::resolve_link`.
    pub fn link(&self) -> Result<String> {
        Ok(self.result()?.link.clone())
    }

    pub fn tracks(&self) -> Result<Vec<Track>> {
        let result = self.result()?;
        Ok(crate::handles(&self.0.host()?, &result.tracks, Track::from_data))
    }

    pub fn albums(&self) -> Result<Vec<Album>> {
        let result = self.result()?;
        Ok(crate::handles(&self.0.host()?, &result.albums, Album::from_data))
    }

    pub fn artists(&self) -> Result<Vec<Artist>> {
        let result = self.result()?;
        Ok(crate::handles(&self.0.host()?, &result.artists, Artist::from_data))
    }

    pub fn playlists(&self) -> Result<Vec<Playlist>> {
        let result = self.result()?;
        Ok(crate::handles(
            &self.0.host()?,
            &result.playlists,
            Playlist::from_data,
        ))
    }

    pub fn track(&self, index: usize) -> Result<Track> {
        let result = self.result()?;
        let data = nth(&result.tracks, index)?;
        Ok(Track::from_data(&self.0.host()?, data))
    }

    pub fn album(&self, index: usize) -> Result<Album> {
        let result = self.result()?;
        let data = nth(&result.albums, index)?;
        Ok(Album::from_data(&self.0.host()?, data))
    }

    pub fn artist(&self, index: usize) -> Result<Artist> {
        let result = self.result()?;
        let data = nth(&result.artists, index)?;
        Ok(Artist::from_data(&self.0.host()?, data))
    }

    pub fn playlist(&self, index: usize) -> Result<Playlist> {
        let result = self.result()?;
        let data = nth(&result.playlists, index)?;
        Ok(Playlist::from_data(&self.0.host()?, data))
    }

    /// Number of results returned in `category`.
    pub fn num(&self, category: SearchCategory) -> Result<usize> {
        let result = self.result()?;
        Ok(match category {
            SearchCategory::Tracks => result.tracks.len(),
            SearchCategory::Albums => result.albums.len(),
            SearchCategory::Artists => result.artists.len(),
            SearchCategory::Playlists => result.playlists.len(),
        })
    }

    /// Number of matches the service has in `category`, beyond this page.
    pub fn total(&self, category: SearchCategory) -> Result<u32> {
        let result = self.result()?;
        Ok(match category {
            SearchCategory::Tracks => result.total_tracks,
            SearchCategory::Albums => result.total_albums,
            SearchCategory::Artists => result.total_artists,
            SearchCategory::Playlists => result.total_playlists,
        })
    }
}

fn nth<T: Clone>(items: &[T], index: usize) -> Result<T> {
    items.get(index).cloned().ok_or(HostError::IndexOutOfRange {
        index,
        len: items.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_pages_are_independent() {
        let mut query = SearchQuery::uniform("q", SearchPage::new(0, 10));
        SearchCategory::Playlists.page_mut(&mut query).offset = 30;

        assert_eq!(SearchCategory::Playlists.page(&query).offset, 30);
        assert_eq!(SearchCategory::Tracks.page(&query).offset, 0);
        assert_eq!(SearchCategory::Albums.page(&query).offset, 0);
    }

    #[test]
    fn test_params_serialize_camel_case() {
        let params = SearchParams {
            key: EntityKey::search(1),
            query: SearchQuery::uniform("q", SearchPage::new(0, 10)),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["query"]["query"], "q");
        assert_eq!(json["query"]["playlists"]["limit"], 10);
    }
}
