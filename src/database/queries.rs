pub const INIT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        protected INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS playlist_tracks (
        id INTEGER PRIMARY KEY,
        playlist_id INTEGER NOT NULL REFERENCES playlists (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        track_key BLOB NOT NULL,
        track_id TEXT NOT NULL,
        title TEXT NOT NULL,
        artist TEXT NOT NULL,
        thumbnail TEXT,
        source TEXT,
        origin TEXT NOT NULL,
        UNIQUE (playlist_id, track_key)
    );
";

pub const ENSURE_DEFAULT_PLAYLIST: &str = "
    INSERT OR IGNORE INTO playlists (name, protected)
    VALUES (?1, 1)
";

pub const GET_PLAYLISTS: &str = "
    SELECT id, name, protected FROM playlists
    ORDER BY protected DESC, id ASC
";

pub const GET_PLAYLIST_ID: &str = "
    SELECT id FROM playlists
    WHERE name = ?
";

pub const GET_PLAYLIST_TRACKS: &str = "
    SELECT track_id, title, artist, thumbnail, source, origin
    FROM playlist_tracks
    WHERE playlist_id = ?
    ORDER BY position ASC
";

pub const CREATE_NEW_PLAYLIST: &str = "
    INSERT INTO playlists (name) VALUES (?1)
";

pub const RENAME_PLAYLIST: &str = "
    UPDATE playlists SET name = ?2
    WHERE id = ?1 AND protected = 0
";

pub const DELETE_PLAYLIST: &str = "
    DELETE FROM playlists
    WHERE id = ?1 AND protected = 0
";

pub const ADD_TRACK_TO_PLAYLIST: &str = "
    INSERT OR IGNORE INTO playlist_tracks
        (playlist_id, position, track_key, track_id, title, artist, thumbnail, source, origin)
    VALUES (
        ?1,
        (SELECT COALESCE(MAX(position), 0) + 1 FROM playlist_tracks WHERE playlist_id = ?1),
        ?2, ?3, ?4, ?5, ?6, ?7, ?8
    )
";

pub const REMOVE_TRACK_FROM_PLAYLIST: &str = "
    DELETE FROM playlist_tracks
    WHERE playlist_id = ?1 AND track_key = ?2
";

pub const GET_TRACK_POSITIONS: &str = "
    SELECT id, position FROM playlist_tracks
    WHERE playlist_id = ?
    ORDER BY position ASC
";

pub const SET_TRACK_POSITION: &str = "
    UPDATE playlist_tracks SET position = ?2
    WHERE id = ?1
";

pub const PRUNE_PLAYLIST: &str = "
    DELETE FROM playlist_tracks
    WHERE playlist_id = ?1 AND id NOT IN (
        SELECT id FROM playlist_tracks
        WHERE playlist_id = ?1
        ORDER BY position DESC
        LIMIT ?2
    )
";
