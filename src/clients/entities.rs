/// Prefix Spotify puts in front of every track URI
pub const TRACK_URI_PREFIX: &str = "spotify:track:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

/// A playlist entry as fetched from Spotify. Episodes and local files are kept
/// so the fetched count matches the playlist total, they just carry no ISRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub uri: Option<String>,
    pub name: String,
    pub artist: Artist, // assume one artist for simplicity
    pub isrc: Option<String>,
}

impl Track {
    /// Bare track id, with the `spotify:track:` prefix cut off when present.
    pub fn track_id(&self) -> Option<&str> {
        self.uri
            .as_deref()
            .map(|uri| uri.strip_prefix(TRACK_URI_PREFIX).unwrap_or(uri))
    }

    /// ISRC if the track has a non-blank one.
    pub fn isrc(&self) -> Option<&str> {
        self.isrc.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// What the catalog said about one ISRC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    Missing(String),
}
