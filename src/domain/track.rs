use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// The concrete means by which a track can be rendered audible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum PlayableSource {
    PreviewClip(String),
    ExternalLink(String),
    LiveStream(String),
}

impl PlayableSource {
    pub fn url(&self) -> &str {
        match self {
            PlayableSource::PreviewClip(url) => url,
            PlayableSource::ExternalLink(url) => url,
            PlayableSource::LiveStream(url) => url,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, PlayableSource::LiveStream(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Spotify,
    YouTube,
    Radio,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Spotify => "Spotify",
            Origin::YouTube => "YouTube",
            Origin::Radio => "Radio",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Spotify => "spotify",
            Origin::YouTube => "youtube",
            Origin::Radio => "radio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spotify" => Some(Origin::Spotify),
            "youtube" => Some(Origin::YouTube),
            "radio" => Some(Origin::Radio),
            _ => None,
        }
    }
}

/// Normalized unit of playable/browsable content. Immutable once an
/// adapter has produced it; `source == None` means browsable only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: Option<String>,
    pub source: Option<PlayableSource>,
    pub origin: Origin,
}

impl TrackRecord {
    /// Stable identity for de-duplication and queue lookups. Radio
    /// station uuids differ across directory mirrors, so the resolved
    /// stream URL is the identity there.
    pub fn identity_key(&self) -> u64 {
        match (&self.origin, &self.source) {
            (Origin::Radio, Some(source)) => xxh3_64(source.url().as_bytes()),
            _ => {
                let mut data = Vec::with_capacity(self.id.len() + 8);
                data.extend_from_slice(self.origin.as_str().as_bytes());
                data.push(b':');
                data.extend_from_slice(self.id.as_bytes());
                xxh3_64(&data)
            }
        }
    }

    pub fn is_playable(&self) -> bool {
        self.source.is_some()
    }

    /// Provider page for "open in <provider>" affordances.
    pub fn external_url(&self) -> Option<&str> {
        match &self.source {
            Some(PlayableSource::ExternalLink(url)) => Some(url),
            _ => None,
        }
    }
}

impl PartialEq for TrackRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for TrackRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, origin: Origin, source: Option<PlayableSource>) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            title: "title".to_string(),
            artist: "artist".to_string(),
            thumbnail: None,
            source,
            origin,
        }
    }

    #[test]
    fn identity_is_scoped_to_origin() {
        let a = record("abc", Origin::Spotify, None);
        let b = record("abc", Origin::YouTube, None);
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn radio_identity_follows_stream_url() {
        let a = record(
            "uuid-1",
            Origin::Radio,
            Some(PlayableSource::LiveStream("https://s.example/a".into())),
        );
        let b = record(
            "uuid-2",
            Origin::Radio,
            Some(PlayableSource::LiveStream("https://s.example/a".into())),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn source_round_trips_through_serde() {
        let rec = record(
            "x1",
            Origin::Spotify,
            Some(PlayableSource::PreviewClip("https://p.example/x.mp3".into())),
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: TrackRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
        assert_eq!(back.source, rec.source);
        assert_eq!(back.origin, Origin::Spotify);
    }
}
