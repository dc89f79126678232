use std::collections::HashSet;
use std::fmt;

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::clients::{
    DeezerClient, ResultStore, SpotifyClient,
    entities::{LookupOutcome, Track},
    errors::{Error, Result},
    traits::{CatalogLookup, PlaylistService},
};
use crate::config::Settings;

/// Items per playlist page request
pub const PAGE_SIZE: usize = 100;
/// Most track ids Spotify accepts in one removal request
pub const REMOVE_BATCH_SIZE: usize = 100;

// Configuration for the Syncer struct
pub struct Config<P, C> {
    pub playlists: P,
    pub catalog: C,
    pub storage: ResultStore,
    pub playlist_name: String,
}

impl Config<SpotifyClient, DeezerClient> {
    pub fn from_settings(settings: &Settings) -> Self {
        Config {
            playlists: SpotifyClient::from_settings(settings),
            catalog: DeezerClient::with_base_url(&settings.catalog_url),
            storage: ResultStore::new(settings.output_file.clone()),
            playlist_name: settings.playlist.clone(),
        }
    }
}

/// Why a track got neither a link nor removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIsrc,
    MissingTrackId,
    NotInCatalog(String),
    LookupFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingIsrc => write!(f, "track does not have a valid ISRC"),
            SkipReason::MissingTrackId => write!(f, "track has no Spotify id"),
            SkipReason::NotInCatalog(why) => write!(f, "not found in catalog ({why})"),
            SkipReason::LookupFailed(why) => write!(f, "lookup failed ({why})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub track: Track,
    pub reason: SkipReason,
}

/// Outcome of resolving a single track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Linked { link: String, track_id: String },
    Skipped(SkippedTrack),
}

/// Aggregate of all resolutions. `links[i]` was resolved from the track with id
/// `track_ids[i]`; both keep the playlist order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedTracks {
    pub links: Vec<String>,
    pub track_ids: Vec<String>,
    pub skipped: Vec<SkippedTrack>,
}

impl ResolvedTracks {
    pub fn push(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Linked { link, track_id } => {
                self.links.push(link);
                self.track_ids.push(track_id);
            }
            Resolution::Skipped(skipped) => self.skipped.push(skipped),
        }
    }
}

/// Counters of a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub linked: usize,
    pub written: usize,
    pub removed: usize,
    pub skipped: usize,
}

// The main Syncer struct that performs the synchronization
pub struct Syncer<P, C> {
    config: Config<P, C>,
}

impl<P: PlaylistService, C: CatalogLookup> Syncer<P, C> {
    pub fn new(config: Config<P, C>) -> Self {
        Syncer { config }
    }

    pub fn config(&self) -> &Config<P, C> {
        &self.config
    }

    pub async fn sync(&self) -> Result<SyncReport> {
        info!("Attempting to authenticate...");
        self.config.playlists.authorize().await?;
        info!("Authentication successful");

        let playlist_id = self.find_playlist().await?;
        let tracks = self.fetch_all_tracks(&playlist_id).await?;
        let fetched = tracks.len();

        let resolved = self.resolve_tracks(tracks).await;

        let written = self.config.storage.append_links(&resolved.links).await?;

        let removed = self
            .remove_tracks(&playlist_id, &resolved.track_ids)
            .await?;

        let report = SyncReport {
            fetched,
            linked: resolved.links.len(),
            written,
            removed,
            skipped: resolved.skipped.len(),
        };
        info!(
            "Sync process completed. Fetched: {}, linked: {}, new links: {}, removed: {}, skipped: {}",
            report.fetched, report.linked, report.written, report.removed, report.skipped
        );
        Ok(report)
    }

    /// Locate the configured playlist by exact name
    pub async fn find_playlist(&self) -> Result<String> {
        let name = &self.config.playlist_name;
        match self.config.playlists.find_playlist_id(name).await? {
            Some(id) => {
                info!("Found playlist: {name}");
                info!("ID: {id}");
                Ok(id)
            }
            None => Err(Error::PlaylistNotFound(name.clone())),
        }
    }

    /// Fetch every item of the playlist, one page request per 100 items.
    ///
    /// Fails when the playlist is empty or when the number of fetched tracks
    /// differs from the total the service reported.
    pub async fn fetch_all_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        info!("Getting all tracks from playlist...");
        let service = &self.config.playlists;

        let total = service.playlist_total(playlist_id).await?;
        if total == 0 {
            return Err(Error::NoTracks(playlist_id.to_string()));
        }

        let pages = total.div_ceil(PAGE_SIZE);
        debug!("Playlist has {total} tracks, fetching {pages} pages");

        let pb = progress_bar(pages, "Fetching pages");
        let tracks: Vec<Track> = stream::iter(0..pages)
            .then(|page| service.playlist_page(playlist_id, page * PAGE_SIZE, PAGE_SIZE))
            .inspect_ok(|_| pb.inc(1))
            .try_concat()
            .await?;
        pb.finish_and_clear();

        if tracks.len() != total {
            return Err(Error::TrackCountMismatch {
                expected: total,
                fetched: tracks.len(),
            });
        }

        info!("All {total} tracks found");
        Ok(tracks)
    }

    /// Resolve one track. Never fails, problems become a skip.
    pub async fn resolve_track(&self, track: Track) -> Resolution {
        let Some(isrc) = track.isrc().map(str::to_string) else {
            return skip(track, SkipReason::MissingIsrc);
        };
        let Some(track_id) = track.track_id().map(str::to_string) else {
            return skip(track, SkipReason::MissingTrackId);
        };

        match self.config.catalog.lookup_isrc(&isrc).await {
            Ok(LookupOutcome::Found(link)) => Resolution::Linked { link, track_id },
            Ok(LookupOutcome::Missing(why)) => {
                warn!("Unable to find isrc: {isrc}");
                skip(track, SkipReason::NotInCatalog(why))
            }
            Err(e) => skip(track, SkipReason::LookupFailed(e.to_string())),
        }
    }

    /// Resolve tracks one after another, keeping their order
    pub async fn resolve_tracks(&self, tracks: Vec<Track>) -> ResolvedTracks {
        info!("Converting {} tracks to deezer...", tracks.len());
        let pb = progress_bar(tracks.len(), "Converting to deezer");
        let mut resolved = ResolvedTracks::default();
        for track in tracks {
            resolved.push(self.resolve_track(track).await);
            pb.inc(1);
        }
        pb.finish_and_clear();
        info!(
            "Resolved {} tracks, skipped {}",
            resolved.links.len(),
            resolved.skipped.len()
        );
        resolved
    }

    /// Remove the tracks in batches of at most 100 ids and return how many
    /// distinct tracks were removed. The first failing batch aborts the
    /// remaining ones.
    pub async fn remove_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<usize> {
        if track_ids.is_empty() {
            info!("No tracks to remove from Spotify");
            return Ok(0);
        }

        info!("Removing tracks from Spotify...");
        for (i, batch) in track_ids.chunks(REMOVE_BATCH_SIZE).enumerate() {
            debug!("Removing batch {} with {} tracks", i + 1, batch.len());
            self.config
                .playlists
                .remove_tracks(playlist_id, batch)
                .await?;
        }
        // Duplicates are removed by the same request, count them once
        let removed = track_ids.iter().collect::<HashSet<_>>().len();
        info!("Removed {removed} tracks from Spotify");
        Ok(removed)
    }
}

fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{elapsed_precise}] [{wide_bar}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message);
    pb
}

fn skip(track: Track, reason: SkipReason) -> Resolution {
    warn!("Skipping track: {reason}. Please download manually.");
    info!("Track name: {} by {}", track.name, track.artist.name);
    Resolution::Skipped(SkippedTrack { track, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_counts_items() {
        let pb = progress_bar(150, "Converting to deezer");
        pb.inc(1);

        assert_eq!(pb.length(), Some(150));
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "Converting to deezer");
    }
}
