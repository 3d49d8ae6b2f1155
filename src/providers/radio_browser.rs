use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    domain::{Origin, PlayableSource, TrackRecord},
    providers::{
        MAX_ATTEMPTS, ProviderError, ProviderResult, RETRY_BASE_DELAY, dedup_tracks, http_client,
        stations, with_retry,
    },
};

/// Community directory mirrors; every request walks a shuffled copy so
/// no single host takes all the traffic.
const MIRRORS: [&str; 6] = [
    "de1.api.radio-browser.info",
    "fr1.api.radio-browser.info",
    "at1.api.radio-browser.info",
    "nl1.api.radio-browser.info",
    "uk1.api.radio-browser.info",
    "all.api.radio-browser.info",
];

pub const RADIO_CATEGORIES: [(&str, &[&str]); 11] = [
    ("Bollywood Hits", &["bollywood", "hindi"]),
    ("Punjabi Radio", &["punjabi"]),
    ("Tamil Radio", &["tamil"]),
    ("Telugu Radio", &["telugu"]),
    ("Malayalam Radio", &["malayalam"]),
    ("Classical Indian", &["carnatic"]),
    ("Top 40 Hits", &["top40", "pop"]),
    ("Hip Hop & R&B", &["hiphop", "rap", "rnb"]),
    ("Rock Radio", &["rock", "alternative"]),
    ("Electronic/Dance", &["electronic", "dance", "edm"]),
    ("Jazz & Blues", &["jazz", "blues"]),
];

const INDIAN_TAGS: [&str; 7] = [
    "bollywood",
    "hindi",
    "punjabi",
    "tamil",
    "telugu",
    "malayalam",
    "carnatic",
];

const STATIONS_PER_TAG: usize = 15;
const STATIONS_PER_CATEGORY: usize = 10;

pub struct RadioBrowser {
    http: reqwest::blocking::Client,
}

impl RadioBrowser {
    pub fn new() -> ProviderResult<Self> {
        Ok(RadioBrowser {
            http: http_client()?,
        })
    }

    pub fn stations_by_tag(&self, tag: &str) -> ProviderResult<Vec<TrackRecord>> {
        let stations = with_retry("radio-browser", RETRY_BASE_DELAY, MAX_ATTEMPTS, |_| {
            let mut mirrors = MIRRORS;
            mirrors.shuffle(&mut rand::rng());

            for mirror in mirrors {
                match self.fetch_from(mirror, tag) {
                    Ok(stations) => return Ok(stations),
                    Err(e) => debug!("{mirror} failed for tag {tag}: {e}"),
                }
            }
            Err(ProviderError::Exhausted)
        })?;

        Ok(dedup_tracks(
            stations.into_iter().filter_map(map_station).collect(),
        ))
    }

    fn fetch_from(&self, mirror: &str, tag: &str) -> ProviderResult<Vec<ApiStation>> {
        let url = format!("https://{mirror}/json/stations/search");
        let limit = STATIONS_PER_TAG.to_string();

        let mut params = vec![
            ("limit", limit.as_str()),
            ("hidebroken", "true"),
            ("tagList", tag),
        ];
        if INDIAN_TAGS.contains(&tag) {
            params.push(("countrycode", "in"));
        }

        Ok(self
            .http
            .get(&url)
            .query(&params)
            .send()?
            .error_for_status()?
            .json()?)
    }

    /// One category's stations, every failure absorbed: exhausted tags
    /// simply contribute nothing, and an empty category falls back to
    /// the bundled station list.
    pub fn category_stations(&self, category: &str, tags: &[&str]) -> Vec<TrackRecord> {
        let mut out = Vec::new();
        for tag in tags {
            match self.stations_by_tag(tag) {
                Ok(stations) => out.extend(stations),
                Err(e) => warn!("tag {tag} unavailable: {e}"),
            }
        }

        if out.is_empty() {
            warn!("category {category:?} exhausted every mirror, using bundled stations");
            out = stations::fallback_for(category);
        }

        let mut out = dedup_tracks(out);
        out.truncate(STATIONS_PER_CATEGORY);
        out
    }

    /// Full browse page. Categories are independent, so they fan out
    /// across the thread pool.
    pub fn browse_categories(&self) -> Vec<(String, Vec<TrackRecord>)> {
        RADIO_CATEGORIES
            .par_iter()
            .map(|(category, tags)| {
                ((*category).to_string(), self.category_stations(category, tags))
            })
            .collect()
    }
}

// ====================
//    API PAYLOADS
// ====================

#[derive(Deserialize)]
struct ApiStation {
    #[serde(default)]
    stationuuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url_resolved: String,
    #[serde(default)]
    favicon: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    lastcheckok: Option<i64>,
}

/// Directory entries are only worth surfacing when they carry a
/// resolved stream URL, artwork, and a passing health check.
fn map_station(station: ApiStation) -> Option<TrackRecord> {
    if station.url_resolved.is_empty() || station.name.is_empty() || station.favicon.is_empty() {
        return None;
    }
    if matches!(station.lastcheckok, Some(ok) if ok != 1) {
        return None;
    }

    Some(TrackRecord {
        id: station.stationuuid,
        title: station.name,
        artist: station.language,
        thumbnail: Some(station.favicon),
        source: Some(PlayableSource::LiveStream(station.url_resolved)),
        origin: Origin::Radio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_maps_to_live_stream() {
        let json = r#"{
            "stationuuid": "9617a958-0601-11e8-ae97-52543be04c81",
            "name": "Bollywood FM",
            "url_resolved": "https://stream.example/bollywood",
            "favicon": "https://img.example/fm.png",
            "language": "hindi",
            "lastcheckok": 1
        }"#;
        let record = map_station(serde_json::from_str(json).unwrap()).unwrap();

        assert_eq!(record.title, "Bollywood FM");
        assert_eq!(record.artist, "hindi");
        assert_eq!(
            record.source,
            Some(PlayableSource::LiveStream(
                "https://stream.example/bollywood".into()
            ))
        );
        assert_eq!(record.origin, Origin::Radio);
    }

    #[test]
    fn broken_or_bare_stations_are_dropped() {
        let no_url = r#"{ "stationuuid": "a", "name": "X", "favicon": "f.png" }"#;
        assert!(map_station(serde_json::from_str(no_url).unwrap()).is_none());

        let failing_check = r#"{
            "stationuuid": "b", "name": "X", "favicon": "f.png",
            "url_resolved": "https://s.example/x", "lastcheckok": 0
        }"#;
        assert!(map_station(serde_json::from_str(failing_check).unwrap()).is_none());

        // fallback entries skip the health check entirely
        let unchecked = r#"{
            "stationuuid": "c", "name": "X", "favicon": "f.png",
            "url_resolved": "https://s.example/x"
        }"#;
        assert!(map_station(serde_json::from_str(unchecked).unwrap()).is_some());
    }

    #[test]
    fn every_category_has_a_bundled_fallback() {
        for (category, _) in RADIO_CATEGORIES {
            let fallback = stations::fallback_for(category);
            assert!(!fallback.is_empty(), "no fallback for {category}");
            assert!(fallback.iter().all(|s| s.is_playable()));
        }
    }
}
