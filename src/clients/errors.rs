use rspotify::ClientError;
use rspotify::model::IdError;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse response data, error: {0}")]
    ParseError(String),

    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Invalid Spotify id: {0}")]
    InvalidId(#[from] IdError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Download playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("No tracks found in playlist {0}")]
    NoTracks(String),

    #[error("Not all tracks were retrieved: expected {expected}, fetched {fetched}")]
    TrackCountMismatch { expected: usize, fetched: usize },
}
