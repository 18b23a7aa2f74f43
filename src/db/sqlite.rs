use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use super::connection::{ensure_schema, open_database};
use super::gateway::PersistenceGateway;
use super::{members, schedules, songs};
use crate::error::Result;
use crate::models::{
    BandMember, MemberPatch, SchedulePatch, Song, SongPatch, SundaySchedule,
};

/// Relational backend. Every mutation runs inside one transaction, so a
/// schedule update touching songs, band, and leaders either lands completely
/// or not at all.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    /// Wrap an already open connection, running the migrations on it.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn write<T>(&mut self, op: &str, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction()?;
        let value = f(&*tx)?;
        tx.commit()?;
        debug!(op, "sqlite transaction committed");
        Ok(value)
    }
}

impl PersistenceGateway for SqliteGateway {
    fn list_songs(&self) -> Result<Vec<Song>> {
        songs::fetch_songs(&self.conn)
    }

    fn insert_song(&mut self, song: &Song) -> Result<()> {
        self.write("insert_song", |conn| songs::insert_song(conn, song))
    }

    fn update_song(&mut self, id: &str, patch: &SongPatch) -> Result<Option<Song>> {
        self.write("update_song", |conn| songs::update_song(conn, id, patch))
    }

    fn delete_song(&mut self, id: &str) -> Result<bool> {
        self.write("delete_song", |conn| songs::delete_song(conn, id))
    }

    fn list_members(&self) -> Result<Vec<BandMember>> {
        members::fetch_members(&self.conn)
    }

    fn insert_member(&mut self, member: &BandMember) -> Result<()> {
        self.write("insert_member", |conn| members::insert_member(conn, member))
    }

    fn update_member(&mut self, id: &str, patch: &MemberPatch) -> Result<Option<BandMember>> {
        self.write("update_member", |conn| members::update_member(conn, id, patch))
    }

    fn delete_member(&mut self, id: &str) -> Result<bool> {
        self.write("delete_member", |conn| members::delete_member(conn, id))
    }

    fn list_schedules(&self) -> Result<Vec<SundaySchedule>> {
        schedules::fetch_schedules(&self.conn)
    }

    fn insert_schedule(&mut self, schedule: &SundaySchedule) -> Result<()> {
        self.write("insert_schedule", |conn| {
            schedules::insert_schedule(conn, schedule)
        })
    }

    fn update_schedule(
        &mut self,
        id: &str,
        patch: &SchedulePatch,
    ) -> Result<Option<SundaySchedule>> {
        self.write("update_schedule", |conn| {
            schedules::update_schedule(conn, id, patch)
        })
    }

    fn delete_schedule(&mut self, id: &str) -> Result<bool> {
        self.write("delete_schedule", |conn| schedules::delete_schedule(conn, id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{
        AvailabilityRecord, Category, Leaders, LeadersPatch, ScheduleBandEntry,
        ScheduleSongEntry,
    };

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    }

    fn song(id: &str, name: &str) -> Song {
        Song {
            id: id.into(),
            name: name.into(),
            current_key: "G".into(),
            key_history: vec!["G".into(), "A".into(), "F".into()],
            original_singer: "John Newton".into(),
            youtube_link: "https://www.youtube.com/watch?v=X6Mtpk4jeVA".into(),
            lyrics: "Sublime gracia del Señor".into(),
            verses: "Ef 2:8".into(),
            duration: 240,
            category: Category::Hymn,
            order: None,
        }
    }

    fn member(id: &str, first: &str) -> BandMember {
        BandMember {
            id: id.into(),
            first_name: first.into(),
            last_name: "Pérez".into(),
            instruments: vec!["VOX1".into(), "EG1".into()],
            availability: vec![AvailabilityRecord {
                date: sunday(),
                available: true,
            }],
            order: Some(2),
        }
    }

    fn populated() -> SqliteGateway {
        let mut gateway = SqliteGateway::in_memory().unwrap();
        gateway.insert_song(&song("s1", "Sublime Gracia")).unwrap();
        gateway.insert_song(&song("s2", "Hosanna")).unwrap();
        gateway.insert_member(&member("m1", "Juan")).unwrap();
        gateway
            .insert_schedule(&SundaySchedule {
                id: "sched".into(),
                date: sunday(),
                songs: vec![
                    ScheduleSongEntry {
                        song_id: "s1".into(),
                        schedule_item_id: "i1".into(),
                        name: "Sublime Gracia".into(),
                        key: "A".into(),
                        singer: "Juan".into(),
                        order: 1,
                    },
                    ScheduleSongEntry {
                        song_id: "s2".into(),
                        schedule_item_id: "i2".into(),
                        name: "Hosanna".into(),
                        key: "E".into(),
                        singer: String::new(),
                        order: 2,
                    },
                ],
                band: vec![ScheduleBandEntry {
                    member_id: "m1".into(),
                    schedule_item_id: "b1".into(),
                    name: "Juan".into(),
                    instrument: "VOX1".into(),
                    order: 1,
                }],
                leaders: Leaders {
                    talkback: "Ana".into(),
                    dm1: String::new(),
                    dm2: String::new(),
                },
            })
            .unwrap();
        gateway
    }

    #[test]
    fn song_round_trip_keeps_every_field() {
        let gateway = populated();
        let songs = gateway.list_songs().unwrap();
        let stored = songs.iter().find(|s| s.id == "s1").unwrap();
        assert_eq!(stored, &song("s1", "Sublime Gracia"));
    }

    #[test]
    fn null_columns_decode_to_empty_values() {
        let gateway = SqliteGateway::in_memory().unwrap();
        gateway
            .conn
            .execute("INSERT INTO songs (id, name) VALUES ('x', 'Bare')", [])
            .unwrap();
        gateway
            .conn
            .execute("INSERT INTO band_members (id, first_name) VALUES ('m', 'Luis')", [])
            .unwrap();
        let song = &gateway.list_songs().unwrap()[0];
        assert_eq!(song.current_key, "");
        assert!(song.key_history.is_empty());
        assert_eq!(song.duration, 0);
        assert_eq!(song.category, Category::Worship);
        let member = &gateway.list_members().unwrap()[0];
        assert_eq!(member.last_name, "");
        assert!(member.instruments.is_empty());
        assert!(member.availability.is_empty());
    }

    #[test]
    fn member_availability_is_nested_and_replaced() {
        let mut gateway = populated();
        let members = gateway.list_members().unwrap();
        assert_eq!(members[0].availability.len(), 1);
        assert_eq!(members[0].order, Some(2));

        let updated = gateway
            .update_member(
                "m1",
                &MemberPatch {
                    availability: Some(vec![AvailabilityRecord {
                        date: sunday(),
                        available: false,
                    }]),
                    ..MemberPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.availability.len(), 1);
        assert!(!updated.availability[0].available);
    }

    #[test]
    fn schedule_children_are_joined_in_order() {
        let gateway = populated();
        let schedules = gateway.list_schedules().unwrap();
        assert_eq!(schedules.len(), 1);
        let schedule = &schedules[0];
        assert_eq!(schedule.date, sunday());
        assert_eq!(schedule.songs[0].schedule_item_id, "i1");
        assert_eq!(schedule.songs[0].singer, "Juan");
        assert_eq!(schedule.songs[1].name, "Hosanna");
        assert_eq!(schedule.band[0].name, "Juan");
        assert_eq!(schedule.leaders.talkback, "Ana");
        assert_eq!(schedule.leaders.dm1, "");
    }

    #[test]
    fn leader_patch_leaves_lists_alone() {
        let mut gateway = populated();
        let updated = gateway
            .update_schedule(
                "sched",
                &SchedulePatch {
                    leaders: Some(LeadersPatch {
                        dm1: Some("Luis".into()),
                        ..LeadersPatch::default()
                    }),
                    ..SchedulePatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.leaders.talkback, "Ana");
        assert_eq!(updated.leaders.dm1, "Luis");
        assert_eq!(updated.songs.len(), 2);
        assert_eq!(updated.band.len(), 1);
    }

    #[test]
    fn missing_ids_answer_with_sentinels() {
        let mut gateway = populated();
        assert!(gateway
            .update_song("nope", &SongPatch::default())
            .unwrap()
            .is_none());
        assert!(!gateway.delete_member("nope").unwrap());
        assert!(!gateway.delete_schedule("nope").unwrap());
        assert_eq!(gateway.list_schedules().unwrap().len(), 1);
    }

    #[test]
    fn deleting_a_song_compacts_schedule_order() {
        let mut gateway = populated();
        assert!(gateway.delete_song("s1").unwrap());
        let schedule = &gateway.list_schedules().unwrap()[0];
        assert_eq!(schedule.songs.len(), 1);
        assert_eq!(schedule.songs[0].song_id, "s2");
        assert_eq!(schedule.songs[0].order, 1);
    }

    #[test]
    fn failed_schedule_update_rolls_back() {
        let mut gateway = populated();
        let result = gateway.update_schedule(
            "sched",
            &SchedulePatch {
                leaders: Some(LeadersPatch::single(
                    crate::models::LeaderRole::Dm2,
                    "Carlos",
                )),
                songs: Some(vec![ScheduleSongEntry {
                    song_id: "does-not-exist".into(),
                    schedule_item_id: "i9".into(),
                    name: String::new(),
                    key: String::new(),
                    singer: String::new(),
                    order: 1,
                }]),
                ..SchedulePatch::default()
            },
        );
        assert!(result.is_err());
        let schedule = &gateway.list_schedules().unwrap()[0];
        assert_eq!(schedule.leaders.dm2, "");
        assert_eq!(schedule.songs.len(), 2);
    }
}
