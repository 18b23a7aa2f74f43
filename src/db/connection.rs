use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".band-schedule-manager";
/// SQLite file name stored inside the application data directory.
pub const DB_FILE_NAME: &str = "schedules.sqlite";
/// JSON document used by the local backend.
pub const LOCAL_FILE_NAME: &str = "schedules.json";

/// Open (creating if needed) the SQLite database at `path` and run the lazy
/// migrations. Foreign keys are switched on so cascades behave the same in
/// tests and production runs.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    info!(path = %path.display(), "opened SQLite database");
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create every table (idempotent) on an already open connection.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS songs (
            id              TEXT    NOT NULL PRIMARY KEY,
            name            TEXT    NOT NULL,
            current_key     TEXT,
            key_history     TEXT,               -- JSON array
            original_singer TEXT,
            youtube_link    TEXT,
            lyrics          TEXT,
            verses          TEXT,
            duration        INTEGER,
            category        TEXT    NOT NULL DEFAULT 'worship',
            sort_order      INTEGER
        );

        CREATE TABLE IF NOT EXISTS band_members (
            id          TEXT    NOT NULL PRIMARY KEY,
            first_name  TEXT    NOT NULL,
            last_name   TEXT,
            instruments TEXT,                   -- JSON array
            sort_order  INTEGER
        );

        -- One answer per member per calendar date.
        CREATE TABLE IF NOT EXISTS member_availability (
            member_id   TEXT    NOT NULL,
            date        TEXT    NOT NULL,       -- YYYY-MM-DD
            available   INTEGER,
            PRIMARY KEY (member_id, date),
            FOREIGN KEY (member_id) REFERENCES band_members(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS sunday_schedules (
            id              TEXT    NOT NULL PRIMARY KEY,
            date            TEXT    NOT NULL,   -- YYYY-MM-DD
            talkback_leader TEXT,
            dm1_leader      TEXT,
            dm2_leader      TEXT
        );

        CREATE TABLE IF NOT EXISTS schedule_songs (
            schedule_item_id TEXT    NOT NULL PRIMARY KEY,
            schedule_id      TEXT    NOT NULL,
            song_id          TEXT    NOT NULL,
            assigned_key     TEXT,
            singer           TEXT,
            order_index      INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (schedule_id) REFERENCES sunday_schedules(id) ON DELETE CASCADE,
            FOREIGN KEY (song_id) REFERENCES songs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS schedule_band (
            schedule_item_id TEXT    NOT NULL PRIMARY KEY,
            schedule_id      TEXT    NOT NULL,
            member_id        TEXT    NOT NULL,
            instrument       TEXT,
            order_index      INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (schedule_id) REFERENCES sunday_schedules(id) ON DELETE CASCADE,
            FOREIGN KEY (member_id) REFERENCES band_members(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_schedules_date ON sunday_schedules (date);
        CREATE INDEX IF NOT EXISTS idx_schedule_songs_schedule ON schedule_songs (schedule_id);
        CREATE INDEX IF NOT EXISTS idx_schedule_band_schedule ON schedule_band (schedule_id);
        ",
    )?;
    Ok(())
}

/// Absolute path of the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not locate home directory",
        ))
    })?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 6);
    }

    #[test]
    fn open_database_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DB_FILE_NAME);
        open_database(&path).unwrap();
        assert!(path.exists());
    }
}
