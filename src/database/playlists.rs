use anyhow::{Result, anyhow};
use rusqlite::{OptionalExtension, params};
use std::sync::Arc;
use tracing::warn;

use crate::{
    Database,
    database::queries::{
        ADD_TRACK_TO_PLAYLIST, CREATE_NEW_PLAYLIST, DELETE_PLAYLIST, ENSURE_DEFAULT_PLAYLIST,
        GET_PLAYLIST_ID, GET_PLAYLIST_TRACKS, GET_PLAYLISTS, GET_TRACK_POSITIONS, PRUNE_PLAYLIST,
        REMOVE_TRACK_FROM_PLAYLIST, RENAME_PLAYLIST, SET_TRACK_POSITION,
    },
    domain::{FAVORITES, Origin, PlayableSource, Playlist, RECENTLY_PLAYED, TrackRecord},
};

const RECENT_CAP: i64 = 50;

impl Database {
    pub(crate) fn ensure_default_playlists(&mut self) -> Result<()> {
        for name in [FAVORITES, RECENTLY_PLAYED] {
            self.conn.execute(ENSURE_DEFAULT_PLAYLIST, params![name])?;
        }
        Ok(())
    }

    pub fn get_playlists(&mut self) -> Result<Vec<Playlist>> {
        let mut playlists = {
            let mut stmt = self.conn.prepare(GET_PLAYLISTS)?;
            let rows = stmt.query_map([], |r| {
                let id: i64 = r.get("id")?;
                let name: String = r.get("name")?;
                let protected: bool = r.get("protected")?;
                Ok(Playlist::new(id, name, protected))
            })?;
            rows.filter_map(|row| row.ok()).collect::<Vec<_>>()
        };

        for playlist in &mut playlists {
            playlist.tracks = self.get_playlist_tracks(playlist.id)?;
        }

        Ok(playlists)
    }

    fn get_playlist_tracks(&mut self, playlist_id: i64) -> Result<Vec<Arc<TrackRecord>>> {
        let mut stmt = self.conn.prepare(GET_PLAYLIST_TRACKS)?;

        let rows = stmt.query_map([playlist_id], |r| {
            let id: String = r.get("track_id")?;
            let title: String = r.get("title")?;
            let artist: String = r.get("artist")?;
            let thumbnail: Option<String> = r.get("thumbnail")?;
            let source: Option<String> = r.get("source")?;
            let origin: String = r.get("origin")?;
            Ok((id, title, artist, thumbnail, source, origin))
        })?;

        let mut tracks = Vec::new();
        for row in rows.filter_map(|r| r.ok()) {
            let (id, title, artist, thumbnail, source, origin) = row;

            let Some(origin) = Origin::parse(&origin) else {
                warn!("dropping playlist row with unknown origin {origin:?}");
                continue;
            };
            let source = match source {
                Some(json) => match serde_json::from_str::<PlayableSource>(&json) {
                    Ok(source) => Some(source),
                    Err(e) => {
                        warn!("dropping playlist row with bad source: {e}");
                        continue;
                    }
                },
                None => None,
            };

            tracks.push(Arc::new(TrackRecord {
                id,
                title,
                artist,
                thumbnail,
                source,
                origin,
            }));
        }

        Ok(tracks)
    }

    pub fn create_playlist(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Playlist name cannot be empty"));
        }

        match self.conn.execute(CREATE_NEW_PLAYLIST, params![name]) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(anyhow!("A playlist named \"{name}\" already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn rename_playlist(&mut self, id: i64, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(anyhow!("Playlist name cannot be empty"));
        }

        match self.conn.execute(RENAME_PLAYLIST, params![id, new_name])? {
            0 => Err(anyhow!("Default playlists cannot be renamed")),
            _ => Ok(()),
        }
    }

    pub fn delete_playlist(&mut self, id: i64) -> Result<()> {
        match self.conn.execute(DELETE_PLAYLIST, params![id])? {
            0 => Err(anyhow!("Default playlists cannot be deleted")),
            _ => Ok(()),
        }
    }

    fn playlist_id(&mut self, name: &str) -> Result<i64> {
        self.conn
            .query_row(GET_PLAYLIST_ID, params![name], |r| r.get(0))
            .optional()?
            .ok_or_else(|| anyhow!("No playlist named \"{name}\""))
    }

    /// Idempotent append: adding a track that is already present leaves
    /// the playlist untouched. Returns whether a row was written.
    pub fn add_track_to_playlist(&mut self, name: &str, track: &TrackRecord) -> Result<bool> {
        let playlist_id = self.playlist_id(name)?;
        self.add_track_by_id(playlist_id, track)
    }

    pub fn add_track_by_id(&mut self, playlist_id: i64, track: &TrackRecord) -> Result<bool> {
        let source = match &track.source {
            Some(source) => Some(serde_json::to_string(source)?),
            None => None,
        };

        let changed = self.conn.execute(
            ADD_TRACK_TO_PLAYLIST,
            params![
                playlist_id,
                track.identity_key().to_le_bytes(),
                track.id,
                track.title,
                track.artist,
                track.thumbnail,
                source,
                track.origin.as_str(),
            ],
        )?;

        Ok(changed > 0)
    }

    pub fn remove_track_from_playlist(&mut self, playlist_id: i64, track: &TrackRecord) -> Result<()> {
        self.conn.execute(
            REMOVE_TRACK_FROM_PLAYLIST,
            params![playlist_id, track.identity_key().to_le_bytes()],
        )?;
        Ok(())
    }

    /// Swap a track with its neighbor; `up` moves it toward the front.
    pub fn move_track(&mut self, playlist_id: i64, index: usize, up: bool) -> Result<()> {
        let rows: Vec<(i64, i64)> = {
            let mut stmt = self.conn.prepare(GET_TRACK_POSITIONS)?;
            let mapped = stmt.query_map([playlist_id], |r| Ok((r.get(0)?, r.get(1)?)))?;
            mapped.filter_map(|r| r.ok()).collect()
        };

        let neighbor = match up {
            true => index.checked_sub(1),
            false => Some(index + 1),
        };
        let (Some(neighbor), Some(&(row_id, pos))) = (neighbor, rows.get(index)) else {
            return Ok(());
        };
        let Some(&(other_id, other_pos)) = rows.get(neighbor) else {
            return Ok(());
        };

        let tx = self.conn.transaction()?;
        tx.execute(SET_TRACK_POSITION, params![row_id, other_pos])?;
        tx.execute(SET_TRACK_POSITION, params![other_id, pos])?;
        tx.commit()?;

        Ok(())
    }

    /// Append to "Recently Played": repeats float to the tail and the
    /// list is pruned to the newest entries.
    pub fn push_recently_played(&mut self, track: &TrackRecord) -> Result<()> {
        let playlist_id = self.playlist_id(RECENTLY_PLAYED)?;

        self.conn.execute(
            REMOVE_TRACK_FROM_PLAYLIST,
            params![playlist_id, track.identity_key().to_le_bytes()],
        )?;
        self.add_track_by_id(playlist_id, track)?;
        self.conn
            .execute(PRUNE_PLAYLIST, params![playlist_id, RECENT_CAP])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, origin: Origin, source: Option<PlayableSource>) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            artist: "Artist".to_string(),
            thumbnail: Some(format!("https://img.example/{id}.jpg")),
            source,
            origin,
        }
    }

    fn preview(id: &str) -> TrackRecord {
        track(
            id,
            Origin::Spotify,
            Some(PlayableSource::PreviewClip(format!(
                "https://p.example/{id}.mp3"
            ))),
        )
    }

    #[test]
    fn default_playlists_exist_and_survive_reopen() {
        let mut db = Database::open_in_memory().unwrap();
        let names: Vec<String> = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert!(names.contains(&FAVORITES.to_string()));
        assert!(names.contains(&RECENTLY_PLAYED.to_string()));

        // running the bootstrap again must not duplicate them
        db.ensure_default_playlists().unwrap();
        assert_eq!(db.get_playlists().unwrap().len(), 2);
    }

    #[test]
    fn add_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let t = preview("a");

        assert!(db.add_track_to_playlist(FAVORITES, &t).unwrap());
        assert!(!db.add_track_to_playlist(FAVORITES, &t).unwrap());

        let favorites = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == FAVORITES)
            .unwrap();
        assert_eq!(favorites.tracks.len(), 1);
    }

    #[test]
    fn records_round_trip_losslessly() {
        let mut db = Database::open_in_memory().unwrap();

        let live = track(
            "uuid-9",
            Origin::Radio,
            Some(PlayableSource::LiveStream("https://s.example/live".into())),
        );
        let browsable = track("yt-1", Origin::YouTube, None);

        db.add_track_to_playlist(FAVORITES, &live).unwrap();
        db.add_track_to_playlist(FAVORITES, &browsable).unwrap();

        let favorites = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == FAVORITES)
            .unwrap();

        assert_eq!(favorites.tracks.len(), 2);
        assert_eq!(*favorites.tracks[0], live);
        assert_eq!(favorites.tracks[0].source, live.source);
        assert_eq!(favorites.tracks[0].thumbnail, live.thumbnail);
        assert_eq!(*favorites.tracks[1], browsable);
        assert_eq!(favorites.tracks[1].source, None);
    }

    #[test]
    fn user_playlists_support_crud_and_reorder() {
        let mut db = Database::open_in_memory().unwrap();

        db.create_playlist("Road Trip").unwrap();
        assert!(db.create_playlist("Road Trip").is_err());
        assert!(db.create_playlist("   ").is_err());

        let id = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Road Trip")
            .unwrap()
            .id;

        for name in ["a", "b", "c"] {
            db.add_track_by_id(id, &preview(name)).unwrap();
        }

        db.move_track(id, 2, true).unwrap();
        let order: Vec<String> = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
            .tracks
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(order, vec!["a", "c", "b"]);

        // moving the head up is a no-op
        db.move_track(id, 0, true).unwrap();

        db.rename_playlist(id, "Long Road Trip").unwrap();
        db.delete_playlist(id).unwrap();
        assert!(
            !db.get_playlists()
                .unwrap()
                .iter()
                .any(|p| p.name == "Long Road Trip")
        );
    }

    #[test]
    fn default_playlists_are_protected() {
        let mut db = Database::open_in_memory().unwrap();
        let favorites = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == FAVORITES)
            .unwrap();

        assert!(favorites.protected);
        assert!(db.delete_playlist(favorites.id).is_err());
        assert!(db.rename_playlist(favorites.id, "Mine").is_err());
    }

    #[test]
    fn recently_played_dedupes_and_keeps_newest_last() {
        let mut db = Database::open_in_memory().unwrap();

        let a = preview("a");
        let b = preview("b");
        db.push_recently_played(&a).unwrap();
        db.push_recently_played(&b).unwrap();
        db.push_recently_played(&a).unwrap();

        let recent = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == RECENTLY_PLAYED)
            .unwrap();
        let ids: Vec<String> = recent.tracks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn recently_played_is_bounded() {
        let mut db = Database::open_in_memory().unwrap();

        for i in 0..(RECENT_CAP + 10) {
            db.push_recently_played(&preview(&format!("t{i}"))).unwrap();
        }

        let recent = db
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == RECENTLY_PLAYED)
            .unwrap();
        assert_eq!(recent.tracks.len(), RECENT_CAP as usize);
        assert_eq!(recent.tracks.last().unwrap().id, format!("t{}", RECENT_CAP + 9));
    }
}
