use rusqlite::{params, Connection, OptionalExtension, Row};

use super::columns::{decode_date, encode_date};
use crate::error::Result;
use crate::models::{
    Leaders, ScheduleBandEntry, SchedulePatch, ScheduleSongEntry, SundaySchedule,
};

const SCHEDULE_COLUMNS: &str = "id, date, talkback_leader, dm1_leader, dm2_leader";

struct ScheduleRow {
    id: String,
    date: String,
    talkback: Option<String>,
    dm1: Option<String>,
    dm2: Option<String>,
}

impl ScheduleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            talkback: row.get(2)?,
            dm1: row.get(3)?,
            dm2: row.get(4)?,
        })
    }

    fn into_schedule(self, conn: &Connection) -> Result<SundaySchedule> {
        let songs = fetch_schedule_songs(conn, &self.id)?;
        let band = fetch_schedule_band(conn, &self.id)?;
        Ok(SundaySchedule {
            date: decode_date("sunday_schedules.date", &self.date)?,
            id: self.id,
            songs,
            band,
            leaders: Leaders {
                talkback: self.talkback.unwrap_or_default(),
                dm1: self.dm1.unwrap_or_default(),
                dm2: self.dm2.unwrap_or_default(),
            },
        })
    }
}

/// Every schedule ordered by date, with song and band placements joined in.
pub fn fetch_schedules(conn: &Connection) -> Result<Vec<SundaySchedule>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM sunday_schedules ORDER BY date"
    ))?;
    let rows = stmt
        .query_map([], ScheduleRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|row| row.into_schedule(conn)).collect()
}

pub fn fetch_schedule(conn: &Connection, id: &str) -> Result<Option<SundaySchedule>> {
    let row = conn
        .query_row(
            &format!("SELECT {SCHEDULE_COLUMNS} FROM sunday_schedules WHERE id = ?1"),
            [id],
            ScheduleRow::from_row,
        )
        .optional()?;
    row.map(|row| row.into_schedule(conn)).transpose()
}

/// Song placements with the display name resolved from `songs`.
fn fetch_schedule_songs(conn: &Connection, schedule_id: &str) -> Result<Vec<ScheduleSongEntry>> {
    let mut stmt = conn.prepare(
        "SELECT ss.song_id, ss.schedule_item_id, s.name, ss.assigned_key, ss.singer,
                ss.order_index
         FROM schedule_songs ss
         INNER JOIN songs s ON s.id = ss.song_id
         WHERE ss.schedule_id = ?1
         ORDER BY ss.order_index",
    )?;
    let songs = stmt
        .query_map([schedule_id], |row| {
            Ok(ScheduleSongEntry {
                song_id: row.get(0)?,
                schedule_item_id: row.get(1)?,
                name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                key: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                singer: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                order: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(songs)
}

/// Band placements with the member first name resolved from `band_members`.
fn fetch_schedule_band(conn: &Connection, schedule_id: &str) -> Result<Vec<ScheduleBandEntry>> {
    let mut stmt = conn.prepare(
        "SELECT sb.member_id, sb.schedule_item_id, m.first_name, sb.instrument,
                sb.order_index
         FROM schedule_band sb
         INNER JOIN band_members m ON m.id = sb.member_id
         WHERE sb.schedule_id = ?1
         ORDER BY sb.order_index",
    )?;
    let band = stmt
        .query_map([schedule_id], |row| {
            Ok(ScheduleBandEntry {
                member_id: row.get(0)?,
                schedule_item_id: row.get(1)?,
                name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                instrument: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                order: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(band)
}

fn replace_schedule_songs(
    conn: &Connection,
    schedule_id: &str,
    songs: &[ScheduleSongEntry],
) -> Result<()> {
    conn.execute(
        "DELETE FROM schedule_songs WHERE schedule_id = ?1",
        [schedule_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO schedule_songs
         (schedule_item_id, schedule_id, song_id, assigned_key, singer, order_index)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for song in songs {
        stmt.execute(params![
            song.schedule_item_id,
            schedule_id,
            song.song_id,
            song.key,
            song.singer,
            song.order,
        ])?;
    }
    Ok(())
}

fn replace_schedule_band(
    conn: &Connection,
    schedule_id: &str,
    band: &[ScheduleBandEntry],
) -> Result<()> {
    conn.execute(
        "DELETE FROM schedule_band WHERE schedule_id = ?1",
        [schedule_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO schedule_band
         (schedule_item_id, schedule_id, member_id, instrument, order_index)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for member in band {
        stmt.execute(params![
            member.schedule_item_id,
            schedule_id,
            member.member_id,
            member.instrument,
            member.order,
        ])?;
    }
    Ok(())
}

pub fn insert_schedule(conn: &Connection, schedule: &SundaySchedule) -> Result<()> {
    conn.execute(
        "INSERT INTO sunday_schedules (id, date, talkback_leader, dm1_leader, dm2_leader)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            schedule.id,
            encode_date(schedule.date),
            schedule.leaders.talkback,
            schedule.leaders.dm1,
            schedule.leaders.dm2,
        ],
    )?;
    replace_schedule_songs(conn, &schedule.id, &schedule.songs)?;
    replace_schedule_band(conn, &schedule.id, &schedule.band)
}

/// Merge `patch` into the stored schedule. Song and band placements are only
/// rewritten when the patch carries the corresponding list.
pub fn update_schedule(
    conn: &Connection,
    id: &str,
    patch: &SchedulePatch,
) -> Result<Option<SundaySchedule>> {
    let Some(mut schedule) = fetch_schedule(conn, id)? else {
        return Ok(None);
    };
    schedule.apply(patch);
    conn.execute(
        "UPDATE sunday_schedules
         SET date = ?1, talkback_leader = ?2, dm1_leader = ?3, dm2_leader = ?4
         WHERE id = ?5",
        params![
            encode_date(schedule.date),
            schedule.leaders.talkback,
            schedule.leaders.dm1,
            schedule.leaders.dm2,
            id,
        ],
    )?;
    if let Some(songs) = &patch.songs {
        replace_schedule_songs(conn, id, songs)?;
    }
    if let Some(band) = &patch.band {
        replace_schedule_band(conn, id, band)?;
    }
    fetch_schedule(conn, id)
}

pub fn delete_schedule(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM sunday_schedules WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

/// Rewrite `order_index` of `table` rows to `1..N` for each schedule listed.
pub(crate) fn compact_schedules_for(
    conn: &Connection,
    table: &str,
    schedule_ids: &[String],
) -> Result<()> {
    let mut select = conn.prepare(&format!(
        "SELECT schedule_item_id FROM {table} WHERE schedule_id = ?1 ORDER BY order_index"
    ))?;
    let mut update = conn.prepare(&format!(
        "UPDATE {table} SET order_index = ?1 WHERE schedule_item_id = ?2"
    ))?;
    for schedule_id in schedule_ids {
        let items = select
            .query_map([schedule_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (index, item) in items.iter().enumerate() {
            update.execute(params![index as u32 + 1, item])?;
        }
    }
    Ok(())
}
