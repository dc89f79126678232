//! Spotr - Drain a Spotify playlist into Deezer links
//!
//! This library fetches every track of a private Spotify playlist, looks each
//! one up on Deezer by its ISRC, appends the links to a text file and removes
//! the resolved tracks from the playlist.

/// Client modules for interacting with external services and local storage
pub mod clients;
/// Run settings
pub mod config;
/// Orchestration of a single sync run
pub mod syncer;
