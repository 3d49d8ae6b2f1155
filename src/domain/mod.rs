mod playlist;
mod track;

pub use playlist::{FAVORITES, Playlist, RECENTLY_PLAYED};
pub use track::{Origin, PlayableSource, TrackRecord};
