use std::{
    sync::{Arc, Mutex},
    thread,
};

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use indexmap::IndexMap;
use tracing::warn;

use crate::{
    Settings,
    domain::TrackRecord,
    providers::{RadioBrowser, SpotifyClient, YouTubeClient},
};

const RAIL_LIMIT: usize = 12;
const SEARCH_LIMIT: usize = 12;

const GENRE_RAILS: [(&str, &str); 3] = [
    ("Popular Hits", "pop"),
    ("Rock Essentials", "rock"),
    ("Hip-Hop Favorites", "hip-hop"),
];

pub type Sections = IndexMap<String, Vec<Arc<TrackRecord>>>;

pub enum FetchResult {
    Home(Sections),
    Search {
        query: String,
        tracks: Vec<Arc<TrackRecord>>,
    },
    Radio(Sections),
}

/// Provider clients are constructed once here and shared with every
/// worker thread; results come back over one channel the app drains
/// each frame.
pub struct Fetcher {
    spotify: Option<Arc<Mutex<SpotifyClient>>>,
    youtube: Option<Arc<YouTubeClient>>,
    radio: Arc<RadioBrowser>,
    tx: Sender<FetchResult>,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<(Self, Receiver<FetchResult>)> {
        let (tx, rx) = unbounded();

        let spotify = match settings.spotify.is_configured() {
            true => Some(Arc::new(Mutex::new(SpotifyClient::new(&settings.spotify)?))),
            false => None,
        };
        let youtube = match settings.youtube.is_configured() {
            true => Some(Arc::new(YouTubeClient::new(&settings.youtube)?)),
            false => None,
        };

        Ok((
            Fetcher {
                spotify,
                youtube,
                radio: Arc::new(RadioBrowser::new()?),
                tx,
            },
            rx,
        ))
    }

    pub fn has_catalog(&self) -> bool {
        self.spotify.is_some()
    }

    pub fn spawn_home(&self) {
        let tx = self.tx.clone();
        let spotify = self.spotify.clone();
        let youtube = self.youtube.clone();

        thread::spawn(move || {
            let mut sections = Sections::new();

            if let Some(spotify) = spotify {
                let mut client = spotify.lock().unwrap();

                match client.new_releases(RAIL_LIMIT) {
                    Ok(tracks) => {
                        sections.insert("New Releases".to_string(), arcs(tracks));
                    }
                    Err(e) => warn!("new releases unavailable: {e}"),
                }
                for (title, genre) in GENRE_RAILS {
                    match client.recommendations(genre, RAIL_LIMIT) {
                        Ok(tracks) => {
                            sections.insert(title.to_string(), arcs(tracks));
                        }
                        Err(e) => warn!("{genre} recommendations unavailable: {e}"),
                    }
                }
            }

            if let Some(youtube) = youtube {
                match youtube.popular_music(RAIL_LIMIT) {
                    Ok(tracks) => {
                        sections.insert("Popular on YouTube".to_string(), arcs(tracks));
                    }
                    Err(e) => warn!("popular videos unavailable: {e}"),
                }
            }

            let _ = tx.send(FetchResult::Home(sections));
        });
    }

    /// Aggregated catalog + video search. Either provider failing only
    /// thins the result list.
    pub fn spawn_search(&self, query: String) {
        let tx = self.tx.clone();
        let spotify = self.spotify.clone();
        let youtube = self.youtube.clone();

        thread::spawn(move || {
            let mut tracks = Vec::new();

            if let Some(spotify) = spotify {
                match spotify.lock().unwrap().search(&query, SEARCH_LIMIT) {
                    Ok(found) => tracks.extend(found),
                    Err(e) => warn!("spotify search failed: {e}"),
                }
            }
            if let Some(youtube) = youtube {
                match youtube.search(&query, SEARCH_LIMIT / 2) {
                    Ok(found) => tracks.extend(found),
                    Err(e) => warn!("youtube search failed: {e}"),
                }
            }

            let _ = tx.send(FetchResult::Search {
                query,
                tracks: arcs(tracks),
            });
        });
    }

    pub fn spawn_radio(&self) {
        let tx = self.tx.clone();
        let radio = Arc::clone(&self.radio);

        thread::spawn(move || {
            let sections: Sections = radio
                .browse_categories()
                .into_iter()
                .filter(|(_, stations)| !stations.is_empty())
                .map(|(category, stations)| (category, arcs(stations)))
                .collect();

            let _ = tx.send(FetchResult::Radio(sections));
        });
    }
}

fn arcs(tracks: Vec<TrackRecord>) -> Vec<Arc<TrackRecord>> {
    tracks.into_iter().map(Arc::new).collect()
}
