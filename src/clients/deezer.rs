use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::clients::{
    entities::LookupOutcome,
    errors::{Error, Result},
    traits::CatalogLookup,
};

pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

#[derive(Deserialize, Debug)]
struct DeezerAPIError {
    #[serde(default)]
    message: Option<String>,
}

// Deezer answers misses with 200 and an `error` object instead of a track
#[derive(Deserialize, Debug)]
struct DeezerTrackResponse {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    error: Option<DeezerAPIError>,
}

pub struct DeezerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        DeezerClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(reqwest::Client::new(), base_url)
    }

    fn track_url(&self, isrc: &str) -> String {
        format!("{}/2.0/track/isrc:{isrc}", self.base_url)
    }
}

#[async_trait(?Send)]
impl CatalogLookup for DeezerClient {
    async fn lookup_isrc(&self, isrc: &str) -> Result<LookupOutcome> {
        let url = self.track_url(isrc);
        debug!("Looking up {url}");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(LookupOutcome::Missing(format!("HTTP {status}")));
        }

        let body = response.text().await?;
        let track: DeezerTrackResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ParseError(format!("{e} in response for {isrc}")))?;

        match (track.link, track.error) {
            (Some(link), _) if !link.trim().is_empty() => {
                Ok(LookupOutcome::Found(link.trim().to_string()))
            }
            (_, Some(err)) => Ok(LookupOutcome::Missing(
                err.message.unwrap_or_else(|| "unknown catalog error".to_string()),
            )),
            (_, None) => Ok(LookupOutcome::Missing(
                "response has no link".to_string(),
            )),
        }
    }
}
