use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::{
    config::SpotifySettings,
    domain::{Origin, PlayableSource, TrackRecord},
    providers::{
        MAX_ATTEMPTS, ProviderError, ProviderResult, RETRY_BASE_DELAY, dedup_tracks, http_client,
        with_retry,
    },
};

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

// Refresh slightly early so a token never expires mid-request.
const TOKEN_SLACK: Duration = Duration::from_secs(30);

struct BearerToken {
    value: String,
    expires_at: Instant,
}

impl BearerToken {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Stateful catalog client: one per process, owns its token lifecycle.
pub struct SpotifyClient {
    http: reqwest::blocking::Client,
    client_id: String,
    client_secret: String,
    token: Option<BearerToken>,
}

impl SpotifyClient {
    pub fn new(settings: &SpotifySettings) -> ProviderResult<Self> {
        Ok(SpotifyClient {
            http: http_client()?,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            token: None,
        })
    }

    fn bearer(&mut self) -> ProviderResult<String> {
        if let Some(token) = &self.token {
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        debug!("refreshing client-credentials token");
        let response: TokenResponse = self
            .http
            .post(ACCOUNTS_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?
            .error_for_status()
            .map_err(|e| ProviderError::Auth(e.to_string()))?
            .json()?;

        let expires_at = Instant::now()
            + Duration::from_secs(response.expires_in).saturating_sub(TOKEN_SLACK);
        let value = response.access_token.clone();
        self.token = Some(BearerToken {
            value: response.access_token,
            expires_at,
        });

        Ok(value)
    }

    pub fn search(&mut self, query: &str, limit: usize) -> ProviderResult<Vec<TrackRecord>> {
        let url = format!("{API_BASE}/search");
        let limit = limit.to_string();
        let response: SearchResponse = with_retry("spotify search", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
            let token = self.bearer()?;
            Ok(self
                .http
                .get(&url)
                .bearer_auth(token)
                .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
                .send()?
                .error_for_status()?
                .json()?)
        })?;

        Ok(dedup_tracks(
            response
                .tracks
                .map(|t| t.items)
                .unwrap_or_default()
                .into_iter()
                .map(map_track)
                .collect(),
        ))
    }

    pub fn recommendations(&mut self, genre: &str, limit: usize) -> ProviderResult<Vec<TrackRecord>> {
        let url = format!("{API_BASE}/recommendations");
        let limit = limit.to_string();
        let response: RecommendationsResponse =
            with_retry("spotify recommendations", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
                let token = self.bearer()?;
                Ok(self
                    .http
                    .get(&url)
                    .bearer_auth(token)
                    .query(&[
                        ("seed_genres", genre),
                        ("limit", limit.as_str()),
                        ("min_popularity", "50"),
                    ])
                    .send()?
                    .error_for_status()?
                    .json()?)
            })?;

        Ok(dedup_tracks(
            response.tracks.into_iter().map(map_track).collect(),
        ))
    }

    /// New-release albums, presented as browsable records pointing at
    /// their provider page.
    pub fn new_releases(&mut self, limit: usize) -> ProviderResult<Vec<TrackRecord>> {
        let url = format!("{API_BASE}/browse/new-releases");
        let limit = limit.to_string();
        let response: NewReleasesResponse =
            with_retry("spotify new releases", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
                let token = self.bearer()?;
                Ok(self
                    .http
                    .get(&url)
                    .bearer_auth(token)
                    .query(&[("limit", limit.as_str()), ("country", "US")])
                    .send()?
                    .error_for_status()?
                    .json()?)
            })?;

        Ok(dedup_tracks(
            response
                .albums
                .items
                .into_iter()
                .map(map_album)
                .collect(),
        ))
    }
}

// ====================
//    API PAYLOADS
// ====================

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<ApiTrack>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    tracks: Vec<ApiTrack>,
}

#[derive(Deserialize)]
struct NewReleasesResponse {
    albums: AlbumPage,
}

#[derive(Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<ApiAlbum>,
}

#[derive(Deserialize)]
struct ApiTrack {
    id: String,
    name: String,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: Option<ApiAlbumRef>,
}

#[derive(Deserialize)]
struct ApiAlbum {
    id: String,
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

#[derive(Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize, Default)]
struct ApiAlbumRef {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

fn join_artists(artists: &[ApiArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn map_track(track: ApiTrack) -> TrackRecord {
    // A 30s preview clip beats the provider page when both exist.
    let source = track
        .preview_url
        .map(PlayableSource::PreviewClip)
        .or_else(|| track.external_urls.spotify.map(PlayableSource::ExternalLink));

    TrackRecord {
        artist: join_artists(&track.artists),
        thumbnail: track
            .album
            .and_then(|album| album.images.into_iter().next().map(|i| i.url)),
        id: track.id,
        title: track.name,
        source,
        origin: Origin::Spotify,
    }
}

fn map_album(album: ApiAlbum) -> TrackRecord {
    TrackRecord {
        artist: join_artists(&album.artists),
        thumbnail: album.images.into_iter().next().map(|i| i.url),
        source: album.external_urls.spotify.map(PlayableSource::ExternalLink),
        id: album.id,
        title: album.name,
        origin: Origin::Spotify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_mapping_prefers_preview_clip() {
        let json = r#"{
            "id": "3n3Ppam7vgaVa1iaRUc9Lp",
            "name": "Mr. Brightside",
            "preview_url": "https://p.scdn.co/mp3-preview/abc",
            "external_urls": { "spotify": "https://open.spotify.com/track/3n3" },
            "artists": [{ "name": "The Killers" }, { "name": "Guest" }],
            "album": { "images": [{ "url": "https://i.scdn.co/image/cover" }] }
        }"#;
        let track: ApiTrack = serde_json::from_str(json).unwrap();
        let record = map_track(track);

        assert_eq!(
            record.source,
            Some(PlayableSource::PreviewClip(
                "https://p.scdn.co/mp3-preview/abc".into()
            ))
        );
        assert_eq!(record.artist, "The Killers, Guest");
        assert_eq!(record.thumbnail.as_deref(), Some("https://i.scdn.co/image/cover"));
        assert_eq!(record.origin, Origin::Spotify);
    }

    #[test]
    fn track_without_preview_falls_back_to_external_link() {
        let json = r#"{
            "id": "x",
            "name": "No Preview",
            "preview_url": null,
            "external_urls": { "spotify": "https://open.spotify.com/track/x" },
            "artists": []
        }"#;
        let record = map_track(serde_json::from_str(json).unwrap());

        assert_eq!(
            record.source,
            Some(PlayableSource::ExternalLink(
                "https://open.spotify.com/track/x".into()
            ))
        );
        assert_eq!(record.artist, "");
    }

    #[test]
    fn track_with_no_urls_is_browsable_only() {
        let json = r#"{ "id": "y", "name": "Ghost", "artists": [{ "name": "A" }] }"#;
        let record = map_track(serde_json::from_str(json).unwrap());
        assert_eq!(record.source, None);
        assert!(!record.is_playable());
    }

    #[test]
    fn album_maps_to_browsable_record() {
        let json = r#"{
            "id": "alb1",
            "name": "Hot Album",
            "external_urls": { "spotify": "https://open.spotify.com/album/alb1" },
            "artists": [{ "name": "Someone" }],
            "images": [{ "url": "https://i.scdn.co/image/big" }, { "url": "small" }]
        }"#;
        let record = map_album(serde_json::from_str(json).unwrap());

        assert_eq!(record.title, "Hot Album");
        assert_eq!(record.thumbnail.as_deref(), Some("https://i.scdn.co/image/big"));
        assert_eq!(
            record.source,
            Some(PlayableSource::ExternalLink(
                "https://open.spotify.com/album/alb1".into()
            ))
        );
    }

    #[test]
    fn empty_search_page_is_not_an_error() {
        let response: SearchResponse = serde_json::from_str(r#"{ "tracks": null }"#).unwrap();
        assert!(response.tracks.is_none());
    }
}
