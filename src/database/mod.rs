mod playlists;
mod queries;

use anyhow::Result;
use rusqlite::Connection;

use crate::data_dir;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("tunedeck.db");
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(queries::INIT_SCHEMA)?;

        let mut db = Database { conn };
        db.ensure_default_playlists()?;
        Ok(db)
    }
}
