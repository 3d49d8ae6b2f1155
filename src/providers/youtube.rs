use serde::Deserialize;

use crate::{
    config::YouTubeSettings,
    domain::{Origin, PlayableSource, TrackRecord},
    providers::{
        MAX_ATTEMPTS, ProviderResult, RETRY_BASE_DELAY, dedup_tracks, http_client, with_retry,
    },
};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MUSIC_CATEGORY: &str = "10";

pub struct YouTubeClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(settings: &YouTubeSettings) -> ProviderResult<Self> {
        Ok(YouTubeClient {
            http: http_client()?,
            api_key: settings.api_key.clone(),
        })
    }

    pub fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<TrackRecord>> {
        let url = format!("{API_BASE}/search");
        let limit = limit.to_string();
        let response: SearchResponse =
            with_retry("youtube search", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
                Ok(self
                    .http
                    .get(&url)
                    .query(&[
                        ("part", "snippet"),
                        ("q", query),
                        ("type", "video"),
                        ("videoCategoryId", MUSIC_CATEGORY),
                        ("maxResults", limit.as_str()),
                        ("key", self.api_key.as_str()),
                    ])
                    .send()?
                    .error_for_status()?
                    .json()?)
            })?;

        Ok(dedup_tracks(
            response
                .items
                .into_iter()
                .filter_map(|item| {
                    let id = item.id.video_id?;
                    Some(map_video(id, item.snippet))
                })
                .collect(),
        ))
    }

    pub fn popular_music(&self, limit: usize) -> ProviderResult<Vec<TrackRecord>> {
        let url = format!("{API_BASE}/videos");
        let limit = limit.to_string();
        let response: VideosResponse =
            with_retry("youtube popular", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
                Ok(self
                    .http
                    .get(&url)
                    .query(&[
                        ("part", "snippet"),
                        ("chart", "mostPopular"),
                        ("videoCategoryId", MUSIC_CATEGORY),
                        ("maxResults", limit.as_str()),
                        ("key", self.api_key.as_str()),
                    ])
                    .send()?
                    .error_for_status()?
                    .json()?)
            })?;

        Ok(dedup_tracks(
            response
                .items
                .into_iter()
                .map(|item| map_video(item.id, item.snippet))
                .collect(),
        ))
    }
}

// ====================
//    API PAYLOADS
// ====================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

fn map_video(id: String, snippet: Snippet) -> TrackRecord {
    let watch_url = format!("https://www.youtube.com/watch?v={id}");
    let thumbnail = snippet
        .thumbnails
        .high
        .or(snippet.thumbnails.default)
        .map(|t| t.url);

    TrackRecord {
        id,
        title: snippet.title,
        artist: snippet.channel_title,
        thumbnail,
        source: Some(PlayableSource::ExternalLink(watch_url)),
        origin: Origin::YouTube,
    }
}
