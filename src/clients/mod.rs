/// Deezer catalog client
pub mod deezer;
/// Data entities for tracks, playlists and lookups
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Append-only file of resolved links
pub mod result_store;
/// Spotify API client
pub mod spotify;
/// Traits the syncer is written against
pub mod traits;

pub use deezer::DeezerClient;
pub use result_store::ResultStore;
pub use spotify::SpotifyClient;
pub use traits::{CatalogLookup, PlaylistService};
