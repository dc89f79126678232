use async_trait::async_trait;
use log::debug;

use crate::clients::{
    entities::{Artist, Track},
    errors::{Error, Result},
    traits::PlaylistService,
};
use crate::config::Settings;
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    model::{PlayableId, PlayableItem, PlaylistId, PlaylistItem, TrackId, UserId},
    prelude::*,
    scopes,
};

// The user's playlists are read from a single page of this size
const PLAYLISTS_PAGE_SIZE: u32 = 50;

impl From<PlaylistItem> for Track {
    fn from(item: PlaylistItem) -> Track {
        match item.track {
            Some(PlayableItem::Track(track)) => Track {
                uri: track.id.map(|id| id.uri()),
                artist: Artist {
                    name: track
                        .artists
                        .first()
                        .map(|a| a.name.clone())
                        .unwrap_or_default(),
                },
                name: track.name,
                isrc: track.external_ids.get("isrc").cloned(),
            },
            Some(PlayableItem::Episode(episode)) => Track {
                uri: Some(episode.id.uri()),
                name: episode.name,
                artist: Artist {
                    name: episode.show.publisher,
                },
                isrc: None,
            },
            // Unavailable entries still count toward the playlist total
            _ => Track {
                uri: None,
                name: "<unavailable>".to_string(),
                artist: Artist {
                    name: String::new(),
                },
                isrc: None,
            },
        }
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|e| Error::ParseError(e.to_string()))
}

pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
    username: String,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify, username: String) -> Self {
        SpotifyClient { spotify, username }
    }

    // Build a client with cached tokens and the scopes needed to read and edit private playlists
    pub fn from_settings(settings: &Settings) -> Self {
        let creds = Credentials::new(&settings.client_id, &settings.client_secret);
        let oauth = OAuth {
            redirect_uri: settings.redirect_uri.clone(),
            scopes: scopes!("playlist-read-private", "playlist-modify-private"),
            ..Default::default()
        };

        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                cache_path: settings.token_cache_path.clone(),
                ..Default::default()
            },
        );

        Self::new(spotify, settings.username.clone())
    }
}

#[async_trait(?Send)]
impl PlaylistService for SpotifyClient {
    // Authorize the Spotify client via CLI prompt and OAuth flow.
    // A cached token skips the prompt.
    async fn authorize(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self
            .spotify
            .get_authorize_url(false)
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;
        self.spotify
            .prompt_for_token(&url)
            .await
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;
        let user = self
            .spotify
            .me()
            .await
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    async fn find_playlist_id(&self, name: &str) -> Result<Option<String>> {
        let user_id = UserId::from_id(self.username.as_str())?;
        let page = self
            .spotify
            .user_playlists_manual(user_id, Some(PLAYLISTS_PAGE_SIZE), None)
            .await?;
        debug!(
            "Fetched {} of {} playlists of {}",
            page.items.len(),
            page.total,
            self.username
        );

        Ok(page
            .items
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.id.id().to_string()))
    }

    async fn playlist_total(&self, playlist_id: &str) -> Result<usize> {
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        let page = self
            .spotify
            .playlist_items_manual(playlist_id, None, None, Some(1), Some(0))
            .await?;
        Ok(page.total as usize)
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Track>> {
        debug!("Fetching playlist items {offset}..{}", offset + limit);
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        let page = self
            .spotify
            .playlist_items_manual(
                playlist_id,
                None,
                None,
                Some(to_u32(limit)?),
                Some(to_u32(offset)?),
            )
            .await?;
        Ok(page.items.into_iter().map(Track::from).collect())
    }

    async fn remove_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        let items = track_ids
            .iter()
            .map(|id| TrackId::from_id(id.as_str()).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.spotify
            .playlist_remove_all_occurrences_of_items(playlist_id, items, None)
            .await?;
        debug!("Removed {} tracks from playlist", track_ids.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn album() -> Value {
        json!({
            "album_type": "single",
            "artists": [],
            "available_markets": [],
            "external_urls": {},
            "href": null,
            "id": null,
            "images": [],
            "name": "Windowlicker",
            "release_date": "1999-03-22",
            "release_date_precision": "day",
            "type": "album",
            "uri": null
        })
    }

    fn full_track(id: Value, is_local: bool, external_ids: Value, artist: &str) -> Value {
        json!({
            "album": album(),
            "artists": [{
                "external_urls": {},
                "href": null,
                "id": null,
                "name": artist,
                "type": "artist",
                "uri": null
            }],
            "available_markets": [],
            "disc_number": 1,
            "duration_ms": 366_000,
            "explicit": false,
            "external_ids": external_ids,
            "external_urls": {},
            "href": null,
            "id": id,
            "is_local": is_local,
            "name": "Windowlicker",
            "popularity": 0,
            "preview_url": null,
            "track_number": 1,
            "type": "track"
        })
    }

    fn playlist_item(track: Value, is_local: bool) -> PlaylistItem {
        serde_json::from_value(json!({
            "added_at": "2024-05-01T12:00:00Z",
            "added_by": null,
            "is_local": is_local,
            "track": track
        }))
        .unwrap()
    }

    #[test]
    fn track_item_keeps_id_and_isrc() {
        let item = playlist_item(
            full_track(
                json!("6rqhFgbbKwnb9MLmUQDhG6"),
                false,
                json!({ "isrc": "GBBKS9900227" }),
                "Aphex Twin",
            ),
            false,
        );

        let track = Track::from(item);

        assert_eq!(
            track.uri.as_deref(),
            Some("spotify:track:6rqhFgbbKwnb9MLmUQDhG6")
        );
        assert_eq!(track.track_id(), Some("6rqhFgbbKwnb9MLmUQDhG6"));
        assert_eq!(track.isrc(), Some("GBBKS9900227"));
        assert_eq!(track.artist.name, "Aphex Twin");
        assert_eq!(track.name, "Windowlicker");
    }

    #[test]
    fn local_item_has_no_id_or_isrc() {
        let item = playlist_item(full_track(Value::Null, true, json!({}), "Local Artist"), true);

        let track = Track::from(item);

        assert_eq!(track.track_id(), None);
        assert_eq!(track.isrc(), None);
        assert_eq!(track.artist.name, "Local Artist");
    }

    #[test]
    fn unavailable_item_still_becomes_a_track() {
        let item = playlist_item(Value::Null, false);

        let track = Track::from(item);

        assert_eq!(track.track_id(), None);
        assert_eq!(track.isrc(), None);
        assert_eq!(track.name, "<unavailable>");
        assert_eq!(track.artist.name, "");
    }

    #[test]
    fn episode_item_has_no_isrc() {
        let episode = json!({
            "audio_preview_url": null,
            "description": "A talk about records",
            "html_description": "<p>A talk about records</p>",
            "duration_ms": 1_800_000,
            "explicit": false,
            "external_urls": {},
            "href": "https://api.spotify.com/v1/episodes/512ojhOuo1ktJprKbVcKyQ",
            "id": "512ojhOuo1ktJprKbVcKyQ",
            "images": [],
            "is_externally_hosted": false,
            "is_playable": true,
            "language": "en",
            "languages": ["en"],
            "name": "Episode 1",
            "release_date": "2024-01-01",
            "release_date_precision": "day",
            "resume_point": null,
            "type": "episode",
            "uri": "spotify:episode:512ojhOuo1ktJprKbVcKyQ",
            "show": {
                "available_markets": [],
                "copyrights": [],
                "description": "Records",
                "explicit": false,
                "external_urls": {},
                "href": "https://api.spotify.com/v1/shows/38bS44xjbVVZ3No3ByF1dJ",
                "id": "38bS44xjbVVZ3No3ByF1dJ",
                "images": [],
                "is_externally_hosted": false,
                "languages": ["en"],
                "media_type": "audio",
                "name": "Record Talk",
                "publisher": "Crate Diggers",
                "type": "show",
                "uri": "spotify:show:38bS44xjbVVZ3No3ByF1dJ"
            }
        });
        let item = playlist_item(episode, false);

        let track = Track::from(item);

        assert_eq!(
            track.uri.as_deref(),
            Some("spotify:episode:512ojhOuo1ktJprKbVcKyQ")
        );
        assert_eq!(track.isrc(), None);
        assert_eq!(track.artist.name, "Crate Diggers");
        assert_eq!(track.name, "Episode 1");
    }
}
