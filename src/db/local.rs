use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::gateway::PersistenceGateway;
use crate::assembly::renumber;
use crate::error::Result;
use crate::models::{
    BandMember, MemberPatch, SchedulePatch, Song, SongPatch, SundaySchedule,
};

/// Whole-document snapshot written by the local backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Document {
    songs: Vec<Song>,
    members: Vec<BandMember>,
    schedules: Vec<SundaySchedule>,
}

/// Local backend: the three collections live in one JSON document that is
/// rewritten after every mutation. Without a path the document only lives in
/// memory.
pub struct LocalStore {
    path: Option<PathBuf>,
    document: Document,
}

impl LocalStore {
    /// Load the document at `path`, starting empty when the file is missing.
    pub fn open(path: &Path) -> Result<Self> {
        let document = if path.exists() {
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                Document::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Document::default()
        };
        info!(path = %path.display(), "opened local document store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: Document::default(),
        }
    }

    /// Persist `next` and only then make it the current state, so a failed
    /// write leaves the previous snapshot in place.
    fn commit(&mut self, next: Document) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string_pretty(&next)?;
            fs::write(path, raw)?;
            debug!(path = %path.display(), "local document written");
        }
        self.document = next;
        Ok(())
    }
}

impl PersistenceGateway for LocalStore {
    fn list_songs(&self) -> Result<Vec<Song>> {
        Ok(self.document.songs.clone())
    }

    fn insert_song(&mut self, song: &Song) -> Result<()> {
        let mut next = self.document.clone();
        next.songs.push(song.clone());
        self.commit(next)
    }

    fn update_song(&mut self, id: &str, patch: &SongPatch) -> Result<Option<Song>> {
        let mut next = self.document.clone();
        let Some(song) = next.songs.iter_mut().find(|song| song.id == id) else {
            return Ok(None);
        };
        song.apply(patch);
        let updated = song.clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    fn delete_song(&mut self, id: &str) -> Result<bool> {
        let mut next = self.document.clone();
        let before = next.songs.len();
        next.songs.retain(|song| song.id != id);
        if next.songs.len() == before {
            return Ok(false);
        }
        for schedule in &mut next.schedules {
            let placed = schedule.songs.len();
            schedule.songs.retain(|entry| entry.song_id != id);
            if schedule.songs.len() != placed {
                renumber(&mut schedule.songs);
            }
        }
        self.commit(next)?;
        Ok(true)
    }

    fn list_members(&self) -> Result<Vec<BandMember>> {
        Ok(self.document.members.clone())
    }

    fn insert_member(&mut self, member: &BandMember) -> Result<()> {
        let mut next = self.document.clone();
        next.members.push(member.clone());
        self.commit(next)
    }

    fn update_member(&mut self, id: &str, patch: &MemberPatch) -> Result<Option<BandMember>> {
        let mut next = self.document.clone();
        let Some(member) = next.members.iter_mut().find(|member| member.id == id) else {
            return Ok(None);
        };
        member.apply(patch);
        let updated = member.clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    fn delete_member(&mut self, id: &str) -> Result<bool> {
        let mut next = self.document.clone();
        let before = next.members.len();
        next.members.retain(|member| member.id != id);
        if next.members.len() == before {
            return Ok(false);
        }
        for schedule in &mut next.schedules {
            let placed = schedule.band.len();
            schedule.band.retain(|entry| entry.member_id != id);
            if schedule.band.len() != placed {
                renumber(&mut schedule.band);
            }
        }
        self.commit(next)?;
        Ok(true)
    }

    fn list_schedules(&self) -> Result<Vec<SundaySchedule>> {
        Ok(self.document.schedules.clone())
    }

    fn insert_schedule(&mut self, schedule: &SundaySchedule) -> Result<()> {
        let mut next = self.document.clone();
        next.schedules.push(schedule.clone());
        self.commit(next)
    }

    fn update_schedule(
        &mut self,
        id: &str,
        patch: &SchedulePatch,
    ) -> Result<Option<SundaySchedule>> {
        let mut next = self.document.clone();
        let Some(schedule) = next.schedules.iter_mut().find(|schedule| schedule.id == id) else {
            return Ok(None);
        };
        schedule.apply(patch);
        let updated = schedule.clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    fn delete_schedule(&mut self, id: &str) -> Result<bool> {
        let mut next = self.document.clone();
        let before = next.schedules.len();
        next.schedules.retain(|schedule| schedule.id != id);
        if next.schedules.len() == before {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{AvailabilityRecord, Leaders, ScheduleSongEntry};

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    }

    #[test]
    fn document_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let mut store = LocalStore::open(&path).unwrap();
            store
                .insert_member(&BandMember {
                    id: "m1".into(),
                    first_name: "María".into(),
                    last_name: "González".into(),
                    instruments: vec!["VOX2".into(), "KEYS".into()],
                    availability: vec![AvailabilityRecord {
                        date: sunday(),
                        available: true,
                    }],
                    order: None,
                })
                .unwrap();
        }
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"firstName\""));
        assert!(raw.contains("\"2024-06-02\""));

        let store = LocalStore::open(&path).unwrap();
        let members = store.list_members().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].availability[0].date, sunday());
    }

    #[test]
    fn legacy_timestamps_and_missing_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(
            &path,
            r#"{"schedules":[{"id":"1","date":"2024-06-02T00:00:00.000Z",
                "songs":[{"id":"s","scheduleItemId":"i","order":1}]}]}"#,
        )
        .unwrap();
        let store = LocalStore::open(&path).unwrap();
        let schedules = store.list_schedules().unwrap();
        assert_eq!(schedules[0].date, sunday());
        assert_eq!(schedules[0].songs[0].singer, "");
        assert_eq!(schedules[0].leaders, Leaders::default());
        assert!(store.list_songs().unwrap().is_empty());
    }

    #[test]
    fn deleting_a_song_drops_its_placements() {
        let mut store = LocalStore::in_memory();
        store
            .insert_song(&Song {
                id: "s1".into(),
                name: "Hosanna".into(),
                ..Song::default()
            })
            .unwrap();
        let entry = |song: &str, item: &str, order| ScheduleSongEntry {
            song_id: song.into(),
            schedule_item_id: item.into(),
            name: String::new(),
            key: String::new(),
            singer: String::new(),
            order,
        };
        store
            .insert_schedule(&SundaySchedule {
                id: "sched".into(),
                date: sunday(),
                songs: vec![entry("s1", "i1", 1), entry("s2", "i2", 2)],
                band: Vec::new(),
                leaders: Leaders::default(),
            })
            .unwrap();
        assert!(store.delete_song("s1").unwrap());
        assert!(!store.delete_song("s1").unwrap());
        let schedule = &store.list_schedules().unwrap()[0];
        assert_eq!(schedule.songs.len(), 1);
        assert_eq!(schedule.songs[0].order, 1);
    }
}
