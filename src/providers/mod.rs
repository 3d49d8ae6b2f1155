mod radio_browser;
mod spotify;
mod stations;
mod youtube;

pub use radio_browser::{RADIO_CATEGORIES, RadioBrowser};
pub use spotify::SpotifyClient;
pub use youtube::YouTubeClient;

use std::{collections::HashSet, hash::BuildHasherDefault, thread, time::Duration};

use nohash_hasher::NoHashHasher;
use thiserror::Error;
use tracing::warn;

use crate::domain::TrackRecord;

pub const USER_AGENT: &str = concat!("tunedeck/", env!("CARGO_PKG_VERSION"));

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("all endpoints exhausted")]
    Exhausted,
}

pub type ProviderResult<T> = Result<T, ProviderError>;

pub(crate) fn http_client() -> ProviderResult<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Exponential backoff around one provider call: 1s, 2s, 4s between
/// attempts at the default settings.
pub(crate) fn with_retry<T>(
    label: &str,
    base_delay: Duration,
    attempts: u32,
    mut call: impl FnMut(u32) -> ProviderResult<T>,
) -> ProviderResult<T> {
    let mut last = ProviderError::Exhausted;

    for attempt in 0..attempts.max(1) {
        match call(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{label}: attempt {}/{} failed: {e}", attempt + 1, attempts);
                if attempt + 1 < attempts {
                    thread::sleep(base_delay * 2u32.pow(attempt));
                }
                last = e;
            }
        }
    }

    Err(last)
}

type IdentitySet = HashSet<u64, BuildHasherDefault<NoHashHasher<u64>>>;

/// Order-preserving de-duplication by identity key.
pub(crate) fn dedup_tracks(tracks: Vec<TrackRecord>) -> Vec<TrackRecord> {
    let mut seen = IdentitySet::default();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.identity_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, PlayableSource};

    #[test]
    fn retry_stops_on_first_success() {
        let mut calls = 0;
        let result = with_retry("test", Duration::ZERO, 3, |_| {
            calls += 1;
            match calls < 2 {
                true => Err(ProviderError::Exhausted),
                false => Ok(42),
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: ProviderResult<()> = with_retry("test", Duration::ZERO, 3, |_| {
            calls += 1;
            Err(ProviderError::Exhausted)
        });
        assert!(matches!(result, Err(ProviderError::Exhausted)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mk = |id: &str, url: &str| TrackRecord {
            id: id.to_string(),
            title: id.to_string(),
            artist: String::new(),
            thumbnail: None,
            source: Some(PlayableSource::LiveStream(url.to_string())),
            origin: Origin::Radio,
        };

        // same resolved URL from two mirrors → one station
        let tracks = vec![
            mk("uuid-1", "https://s.example/one"),
            mk("uuid-2", "https://s.example/one"),
            mk("uuid-3", "https://s.example/two"),
        ];
        let deduped = dedup_tracks(tracks);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "uuid-1");
    }
}
