use std::path::PathBuf;

use crate::clients::errors::{Error, Result};

/// Run configuration. Built once at start and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Exact name of the playlist to drain
    pub playlist: String,
    /// Line-delimited file the resolved links are appended to
    pub output_file: PathBuf,
    pub catalog_url: String,
    pub token_cache_path: PathBuf,
}

impl Settings {
    // Reject empty values before anything talks to the network
    pub fn validate(self) -> Result<Self> {
        let required = [
            ("username", &self.username),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("playlist", &self.playlist),
            ("redirect uri", &self.redirect_uri),
            ("catalog url", &self.catalog_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::ConfigurationError(format!("{name} must not be empty")));
            }
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(Error::ConfigurationError(
                "output file must not be empty".into(),
            ));
        }
        Ok(self)
    }
}

/// Where the Spotify token is cached when nothing else is configured
pub fn default_token_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
        .join(".spotr_token_cache")
}
