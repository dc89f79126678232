use async_trait::async_trait;

use crate::clients::{
    entities::{LookupOutcome, Track},
    errors::Result,
};

/// Operations the syncer needs from the playlist owner's service.
///
/// Calls are awaited one at a time, so implementations don't need to be `Send`.
#[async_trait(?Send)]
pub trait PlaylistService {
    /// Obtain a session and confirm it by fetching the current profile
    async fn authorize(&self) -> Result<()>;

    /// Id of the first playlist named exactly `name`, if any
    async fn find_playlist_id(&self, name: &str) -> Result<Option<String>>;

    /// Number of items the service reports for the playlist
    async fn playlist_total(&self, playlist_id: &str) -> Result<usize>;

    /// One page of playlist items starting at `offset`
    async fn playlist_page(&self, playlist_id: &str, offset: usize, limit: usize)
    -> Result<Vec<Track>>;

    /// Remove every occurrence of the given bare track ids in a single request
    async fn remove_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;
}

/// Catalog that can translate an ISRC into a link.
#[async_trait(?Send)]
pub trait CatalogLookup {
    async fn lookup_isrc(&self, isrc: &str) -> Result<LookupOutcome>;
}
