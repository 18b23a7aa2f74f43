use rusqlite::{params, Connection, OptionalExtension, Row};

use super::columns::{decode_date, decode_list, encode_date, encode_list};
use super::schedules::compact_schedules_for;
use super::songs::schedules_using;
use crate::error::Result;
use crate::models::{AvailabilityRecord, BandMember, MemberPatch};

const MEMBER_COLUMNS: &str = "id, first_name, last_name, instruments, sort_order";

struct MemberRow {
    id: String,
    first_name: String,
    last_name: Option<String>,
    instruments: Option<String>,
    sort_order: Option<i64>,
}

impl MemberRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            instruments: row.get(3)?,
            sort_order: row.get(4)?,
        })
    }

    fn into_member(self, conn: &Connection) -> Result<BandMember> {
        let availability = fetch_availability(conn, &self.id)?;
        Ok(BandMember {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name.unwrap_or_default(),
            instruments: decode_list(self.instruments)?,
            availability,
            order: self.sort_order,
        })
    }
}

/// Fetch every member with their `member_availability` rows nested.
pub fn fetch_members(conn: &Connection) -> Result<Vec<BandMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMBER_COLUMNS} FROM band_members ORDER BY first_name"
    ))?;
    let rows = stmt
        .query_map([], MemberRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|row| row.into_member(conn)).collect()
}

pub fn fetch_member(conn: &Connection, id: &str) -> Result<Option<BandMember>> {
    let row = conn
        .query_row(
            &format!("SELECT {MEMBER_COLUMNS} FROM band_members WHERE id = ?1"),
            [id],
            MemberRow::from_row,
        )
        .optional()?;
    row.map(|row| row.into_member(conn)).transpose()
}

fn fetch_availability(conn: &Connection, member_id: &str) -> Result<Vec<AvailabilityRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, available FROM member_availability
         WHERE member_id = ?1
         ORDER BY date",
    )?;
    let rows = stmt
        .query_map([member_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<bool>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter()
        .map(|(date, available)| {
            Ok(AvailabilityRecord {
                date: decode_date("member_availability.date", &date)?,
                available: available.unwrap_or(false),
            })
        })
        .collect()
}

/// Replace every availability row of a member. Duplicate dates collapse onto
/// the last record for that date.
fn replace_availability(
    conn: &Connection,
    member_id: &str,
    records: &[AvailabilityRecord],
) -> Result<()> {
    conn.execute(
        "DELETE FROM member_availability WHERE member_id = ?1",
        [member_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO member_availability (member_id, date, available)
         VALUES (?1, ?2, ?3)",
    )?;
    for record in records {
        stmt.execute(params![member_id, encode_date(record.date), record.available])?;
    }
    Ok(())
}

pub fn insert_member(conn: &Connection, member: &BandMember) -> Result<()> {
    conn.execute(
        "INSERT INTO band_members (id, first_name, last_name, instruments, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            member.id,
            member.first_name,
            member.last_name,
            encode_list(&member.instruments)?,
            member.order,
        ],
    )?;
    replace_availability(conn, &member.id, &member.availability)
}

/// Merge `patch` into the stored member. The availability rows are only
/// rewritten when the patch carries a list.
pub fn update_member(
    conn: &Connection,
    id: &str,
    patch: &MemberPatch,
) -> Result<Option<BandMember>> {
    let Some(mut member) = fetch_member(conn, id)? else {
        return Ok(None);
    };
    member.apply(patch);
    conn.execute(
        "UPDATE band_members SET first_name = ?1, last_name = ?2, instruments = ?3,
             sort_order = ?4
         WHERE id = ?5",
        params![
            member.first_name,
            member.last_name,
            encode_list(&member.instruments)?,
            member.order,
            id,
        ],
    )?;
    if let Some(availability) = &patch.availability {
        replace_availability(conn, id, availability)?;
    }
    fetch_member(conn, id)
}

/// Delete a member. Availability rows and band placements cascade away; the
/// affected schedules get their band order compacted.
pub fn delete_member(conn: &Connection, id: &str) -> Result<bool> {
    let affected = schedules_using(conn, "schedule_band", "member_id", id)?;
    let deleted = conn.execute("DELETE FROM band_members WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Ok(false);
    }
    compact_schedules_for(conn, "schedule_band", &affected)?;
    Ok(true)
}
