use rusqlite::{params, Connection, OptionalExtension, Row};

use super::columns::{decode_list, encode_list};
use super::schedules::compact_schedules_for;
use crate::error::{Result, StoreError};
use crate::models::{Song, SongPatch};

const SONG_COLUMNS: &str = "id, name, current_key, key_history, original_singer, youtube_link,
     lyrics, verses, duration, category, sort_order";

/// Raw `songs` row before the JSON and enum columns are decoded.
struct SongRow {
    id: String,
    name: String,
    current_key: Option<String>,
    key_history: Option<String>,
    original_singer: Option<String>,
    youtube_link: Option<String>,
    lyrics: Option<String>,
    verses: Option<String>,
    duration: Option<u32>,
    category: String,
    sort_order: Option<i64>,
}

impl SongRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            current_key: row.get(2)?,
            key_history: row.get(3)?,
            original_singer: row.get(4)?,
            youtube_link: row.get(5)?,
            lyrics: row.get(6)?,
            verses: row.get(7)?,
            duration: row.get(8)?,
            category: row.get(9)?,
            sort_order: row.get(10)?,
        })
    }

    fn into_song(self) -> Result<Song> {
        let category = self
            .category
            .parse()
            .map_err(|_| StoreError::InvalidValue {
                field: "category",
                value: self.category.clone(),
            })?;
        Ok(Song {
            id: self.id,
            name: self.name,
            current_key: self.current_key.unwrap_or_default(),
            key_history: decode_list(self.key_history)?,
            original_singer: self.original_singer.unwrap_or_default(),
            youtube_link: self.youtube_link.unwrap_or_default(),
            lyrics: self.lyrics.unwrap_or_default(),
            verses: self.verses.unwrap_or_default(),
            duration: self.duration.unwrap_or_default(),
            category,
            order: self.sort_order,
        })
    }
}

/// Fetch every song ordered by name, matching the relational store's natural
/// listing. The entity store applies the display ordering on top.
pub fn fetch_songs(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn.prepare(&format!("SELECT {SONG_COLUMNS} FROM songs ORDER BY name"))?;
    let rows = stmt
        .query_map([], SongRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(SongRow::into_song).collect()
}

pub fn fetch_song(conn: &Connection, id: &str) -> Result<Option<Song>> {
    let row = conn
        .query_row(
            &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
            [id],
            SongRow::from_row,
        )
        .optional()?;
    row.map(SongRow::into_song).transpose()
}

pub fn insert_song(conn: &Connection, song: &Song) -> Result<()> {
    conn.execute(
        "INSERT INTO songs
         (id, name, current_key, key_history, original_singer, youtube_link,
          lyrics, verses, duration, category, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            song.id,
            song.name,
            song.current_key,
            encode_list(&song.key_history)?,
            song.original_singer,
            song.youtube_link,
            song.lyrics,
            song.verses,
            song.duration,
            song.category.as_str(),
            song.order,
        ],
    )?;
    Ok(())
}

/// Merge `patch` into the stored song. Answers `None` when the id is unknown.
pub fn update_song(conn: &Connection, id: &str, patch: &SongPatch) -> Result<Option<Song>> {
    let Some(mut song) = fetch_song(conn, id)? else {
        return Ok(None);
    };
    song.apply(patch);
    conn.execute(
        "UPDATE songs SET name = ?1, current_key = ?2, key_history = ?3,
             original_singer = ?4, youtube_link = ?5, lyrics = ?6, verses = ?7,
             duration = ?8, category = ?9, sort_order = ?10
         WHERE id = ?11",
        params![
            song.name,
            song.current_key,
            encode_list(&song.key_history)?,
            song.original_singer,
            song.youtube_link,
            song.lyrics,
            song.verses,
            song.duration,
            song.category.as_str(),
            song.order,
            id,
        ],
    )?;
    Ok(Some(song))
}

/// Delete a song. Its schedule placements cascade away and the affected
/// schedules get their song order compacted back to `1..N`.
pub fn delete_song(conn: &Connection, id: &str) -> Result<bool> {
    let affected = schedules_using(conn, "schedule_songs", "song_id", id)?;
    let deleted = conn.execute("DELETE FROM songs WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Ok(false);
    }
    compact_schedules_for(conn, "schedule_songs", &affected)?;
    Ok(true)
}

/// Schedule ids holding a placement whose `column` equals `id`.
pub(crate) fn schedules_using(
    conn: &Connection,
    table: &str,
    column: &str,
    id: &str,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT schedule_id FROM {table} WHERE {column} = ?1"
    ))?;
    let ids = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}
