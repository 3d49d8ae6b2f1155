use super::TrackRecord;
use std::sync::Arc;

pub const FAVORITES: &str = "Favorites";
pub const RECENTLY_PLAYED: &str = "Recently Played";

pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub protected: bool,
    pub tracks: Vec<Arc<TrackRecord>>,
}

impl Playlist {
    pub fn new(id: i64, name: String, protected: bool) -> Self {
        Playlist {
            id,
            name,
            protected,
            tracks: Vec::new(),
        }
    }

    pub fn contains(&self, key: u64) -> bool {
        self.tracks.iter().any(|t| t.identity_key() == key)
    }
}
