//! Pure schedule-assembly rules: how placements are added, moved, removed, and
//! renumbered. Nothing here touches storage; the dashboard applies these rules
//! to a copy of a schedule and persists the result.

use tracing::debug;

use crate::availability::{is_available, AvailabilityPolicy};
use crate::error::Rejection;
use crate::models::{
    new_id, BandMember, LeaderRole, ScheduleBandEntry, ScheduleSongEntry, Song, SundaySchedule,
};

/// Common surface of song and band placements.
pub trait Placement {
    fn schedule_item_id(&self) -> &str;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

impl Placement for ScheduleSongEntry {
    fn schedule_item_id(&self) -> &str {
        &self.schedule_item_id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Placement for ScheduleBandEntry {
    fn schedule_item_id(&self) -> &str {
        &self.schedule_item_id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Rewrite every `order` to its 1-based list position.
pub fn renumber<P: Placement>(entries: &mut [P]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.set_order(index as u32 + 1);
    }
}

/// Splice the entry at `from` into position `to` (not a swap), then renumber.
/// A destination past the end moves the entry to the end. Returns `false` and
/// leaves the list untouched when `from` is out of range.
pub fn move_entry<P: Placement>(entries: &mut Vec<P>, from: usize, to: usize) -> bool {
    if from >= entries.len() {
        return false;
    }
    let entry = entries.remove(from);
    let to = to.min(entries.len());
    entries.insert(to, entry);
    renumber(entries);
    true
}

/// Drop the placement with `schedule_item_id`, then renumber the rest.
/// Returns `false` when no placement matched.
pub fn remove_entry<P: Placement>(entries: &mut Vec<P>, schedule_item_id: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.schedule_item_id() != schedule_item_id);
    if entries.len() == before {
        return false;
    }
    renumber(entries);
    true
}

/// Append `song` to the schedule's song list. The same song may not appear
/// twice.
pub fn append_song(
    schedule: &mut SundaySchedule,
    song: &Song,
    key: Option<&str>,
) -> Result<ScheduleSongEntry, Rejection> {
    if schedule.songs.iter().any(|entry| entry.song_id == song.id) {
        return Err(Rejection::DuplicateSong {
            song: song.name.clone(),
        });
    }
    let entry = ScheduleSongEntry {
        song_id: song.id.clone(),
        schedule_item_id: new_id(),
        name: song.name.clone(),
        key: key.unwrap_or(&song.current_key).to_string(),
        singer: String::new(),
        order: schedule.songs.len() as u32 + 1,
    };
    debug!(schedule_id = %schedule.id, song_id = %song.id, "song placed");
    schedule.songs.push(entry.clone());
    Ok(entry)
}

/// Append `member` playing `instrument`. A member may hold several instruments
/// on one Sunday but never the same one twice, and must have explicitly said
/// they are available on the schedule date.
pub fn append_band_member(
    schedule: &mut SundaySchedule,
    member: &BandMember,
    instrument: &str,
) -> Result<ScheduleBandEntry, Rejection> {
    if schedule
        .band
        .iter()
        .any(|entry| entry.member_id == member.id && entry.instrument == instrument)
    {
        return Err(Rejection::DuplicateAssignment {
            member: member.full_name(),
            instrument: instrument.to_string(),
        });
    }
    if !is_available(member, schedule.date, AvailabilityPolicy::ScheduleAssignment) {
        return Err(Rejection::Unavailable {
            member: member.full_name(),
            date: schedule.date,
        });
    }
    let entry = ScheduleBandEntry {
        member_id: member.id.clone(),
        schedule_item_id: new_id(),
        name: member.first_name.clone(),
        instrument: instrument.to_string(),
        order: schedule.band.len() as u32 + 1,
    };
    debug!(schedule_id = %schedule.id, member_id = %member.id, %instrument, "member placed");
    schedule.band.push(entry.clone());
    Ok(entry)
}

/// Set the singer on the song placement `schedule_item_id`.
pub fn assign_singer(songs: &mut [ScheduleSongEntry], schedule_item_id: &str, singer: &str) -> bool {
    match songs
        .iter_mut()
        .find(|entry| entry.schedule_item_id == schedule_item_id)
    {
        Some(entry) => {
            entry.singer = singer.to_string();
            true
        }
        None => false,
    }
}

/// Band placements eligible to sing: those on a vocal instrument.
pub fn singer_candidates(schedule: &SundaySchedule) -> Vec<&ScheduleBandEntry> {
    schedule.band.iter().filter(|entry| entry.is_vocal()).collect()
}

pub fn set_leader(schedule: &mut SundaySchedule, role: LeaderRole, value: &str) {
    schedule.leaders.set(role, value);
}

/// True when the `order` fields read exactly `1..=N` in list order.
pub fn is_contiguous<P: Placement>(entries: &[P]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(index, entry)| entry.order() == index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{AvailabilityRecord, Leaders};

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    }

    fn schedule() -> SundaySchedule {
        SundaySchedule {
            id: "sched".into(),
            date: sunday(),
            songs: Vec::new(),
            band: Vec::new(),
            leaders: Leaders::default(),
        }
    }

    fn song(id: &str, name: &str) -> Song {
        Song {
            id: id.into(),
            name: name.into(),
            current_key: "G".into(),
            ..Song::default()
        }
    }

    fn available_member(id: &str, first: &str) -> BandMember {
        BandMember {
            id: id.into(),
            first_name: first.into(),
            last_name: "Pérez".into(),
            instruments: vec!["VOX1".into(), "EG1".into()],
            availability: vec![AvailabilityRecord {
                date: sunday(),
                available: true,
            }],
            order: None,
        }
    }

    fn with_songs(count: usize) -> SundaySchedule {
        let mut schedule = schedule();
        for index in 0..count {
            append_song(&mut schedule, &song(&format!("s{index}"), "x"), None).unwrap();
        }
        schedule
    }

    #[test]
    fn append_song_uses_current_key_and_next_order() {
        let mut schedule = schedule();
        let first = append_song(&mut schedule, &song("a", "Hosanna"), None).unwrap();
        let second = append_song(&mut schedule, &song("b", "Sublime Gracia"), Some("A")).unwrap();
        assert_eq!(first.key, "G");
        assert_eq!(first.order, 1);
        assert_eq!(second.key, "A");
        assert_eq!(second.order, 2);
        assert!(second.singer.is_empty());
        assert_ne!(first.schedule_item_id, second.schedule_item_id);
    }

    #[test]
    fn duplicate_song_is_rejected_without_effect() {
        let mut schedule = schedule();
        append_song(&mut schedule, &song("a", "Hosanna"), None).unwrap();
        let err = append_song(&mut schedule, &song("a", "Hosanna"), None).unwrap_err();
        assert_eq!(
            err,
            Rejection::DuplicateSong {
                song: "Hosanna".into()
            }
        );
        assert_eq!(schedule.songs.len(), 1);
    }

    #[test]
    fn member_can_hold_two_instruments_but_not_one_twice() {
        let mut schedule = schedule();
        let juan = available_member("m1", "Juan");
        append_band_member(&mut schedule, &juan, "VOX1").unwrap();
        append_band_member(&mut schedule, &juan, "EG1").unwrap();
        let err = append_band_member(&mut schedule, &juan, "VOX1").unwrap_err();
        assert!(matches!(err, Rejection::DuplicateAssignment { .. }));
        assert_eq!(schedule.band.len(), 2);
        assert_eq!(schedule.band[1].name, "Juan");
        assert_eq!(schedule.band[1].order, 2);
    }

    #[test]
    fn member_without_answer_cannot_be_placed() {
        let mut schedule = schedule();
        let mut carlos = available_member("m3", "Carlos");
        carlos.availability.clear();
        let err = append_band_member(&mut schedule, &carlos, "DRUMS").unwrap_err();
        assert_eq!(
            err,
            Rejection::Unavailable {
                member: "Carlos Pérez".into(),
                date: sunday()
            }
        );
        assert!(schedule.band.is_empty());
    }

    #[test]
    fn move_is_a_splice_not_a_swap() {
        let mut schedule = with_songs(4);
        assert!(move_entry(&mut schedule.songs, 0, 2));
        let ids: Vec<_> = schedule.songs.iter().map(|e| e.song_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s0", "s3"]);
        assert!(is_contiguous(&schedule.songs));
    }

    #[test]
    fn move_out_of_range_is_ignored() {
        let mut schedule = with_songs(2);
        let before = schedule.songs.clone();
        assert!(!move_entry(&mut schedule.songs, 5, 0));
        assert_eq!(schedule.songs, before);

        assert!(move_entry(&mut schedule.songs, 0, 99));
        assert_eq!(schedule.songs[1].song_id, "s0");
    }

    #[test]
    fn removal_renumbers_for_every_length() {
        for len in 1..6 {
            for victim in 0..len {
                let mut schedule = with_songs(len);
                let item = schedule.songs[victim].schedule_item_id.clone();
                assert!(remove_entry(&mut schedule.songs, &item));
                assert_eq!(schedule.songs.len(), len - 1);
                assert!(is_contiguous(&schedule.songs));
            }
        }
        let mut empty: Vec<ScheduleSongEntry> = Vec::new();
        assert!(!remove_entry(&mut empty, "missing"));
        assert!(is_contiguous(&empty));
    }

    #[test]
    fn singer_candidates_are_vocal_slots() {
        let mut schedule = schedule();
        let juan = available_member("m1", "Juan");
        append_band_member(&mut schedule, &juan, "VOX1").unwrap();
        append_band_member(&mut schedule, &juan, "EG1").unwrap();
        let candidates = singer_candidates(&schedule);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].instrument, "VOX1");
    }

    #[test]
    fn assign_singer_targets_one_placement() {
        let mut schedule = with_songs(2);
        let item = schedule.songs[1].schedule_item_id.clone();
        assert!(assign_singer(&mut schedule.songs, &item, "Juan"));
        assert_eq!(schedule.songs[0].singer, "");
        assert_eq!(schedule.songs[1].singer, "Juan");
        assert!(!assign_singer(&mut schedule.songs, "nope", "Juan"));
    }
}
