//! Schedule dashboard: the stateful side of schedule assembly.
//!
//! The dashboard keeps the last loaded snapshot of every collection. Each
//! mutation works on a copy of the affected schedule, applies the pure rules in
//! [`crate::assembly`], persists through the [`EntityStore`], and reloads the
//! whole collection. The availability toggle is the one optimistic operation:
//! it edits the in-memory member first and reloads (reverting) if the write
//! fails.
//!
//! Unknown identifiers are no-ops answered with `Ok(false)`.

use chrono::{Days, NaiveDate};
use tracing::{error, info, warn};

use crate::assembly::{self, move_entry, remove_entry};
use crate::availability::{
    is_available, toggled_availability, upsert_record, AvailabilityPolicy,
};
use crate::calendar::upcoming_sundays;
use crate::error::{DashboardError, Rejection, StoreError};
use crate::models::{
    BandMember, Category, LeaderRole, LeadersPatch, MemberPatch, NewMember, NewSchedule, NewSong,
    ScheduleBandEntry, SchedulePatch, Song, SongPatch, SundaySchedule,
};
use crate::store::EntityStore;

/// One end of a drag: a schedule and a position in one of its lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragLocation {
    pub schedule_id: String,
    pub index: usize,
}

impl DragLocation {
    pub fn new(schedule_id: impl Into<String>, index: usize) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            index,
        }
    }
}

pub struct Dashboard {
    store: EntityStore,
    songs: Vec<Song>,
    members: Vec<BandMember>,
    schedules: Vec<SundaySchedule>,
}

impl Dashboard {
    /// Load every collection. When no schedule exists yet, one empty schedule
    /// per Sunday of the next `seed_months` months (current month included)
    /// is created first.
    pub fn load(
        mut store: EntityStore,
        today: NaiveDate,
        seed_months: u32,
    ) -> Result<Self, StoreError> {
        if store.schedules()?.is_empty() {
            let sundays = upcoming_sundays(today, seed_months);
            for date in &sundays {
                store.create_schedule(NewSchedule::empty(*date))?;
            }
            info!(count = sundays.len(), "seeded empty schedules");
        }
        let songs = store.songs()?;
        let members = store.members()?;
        let schedules = store.schedules()?;
        Ok(Self {
            store,
            songs,
            members,
            schedules,
        })
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn members(&self) -> &[BandMember] {
        &self.members
    }

    pub fn schedules(&self) -> &[SundaySchedule] {
        &self.schedules
    }

    pub fn song(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&BandMember> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn schedule(&self, id: &str) -> Option<&SundaySchedule> {
        self.schedules.iter().find(|schedule| schedule.id == id)
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.reload_songs()?;
        self.reload_members()?;
        self.reload_schedules()
    }

    pub fn reload_songs(&mut self) -> Result<(), StoreError> {
        self.songs = self.store.songs()?;
        Ok(())
    }

    pub fn reload_members(&mut self) -> Result<(), StoreError> {
        self.members = self.store.members()?;
        Ok(())
    }

    pub fn reload_schedules(&mut self) -> Result<(), StoreError> {
        self.schedules = self.store.schedules()?;
        Ok(())
    }

    // Schedule assembly

    /// Place `song_id` at the end of the schedule's song list. Without `key`
    /// the song's current key is used.
    pub fn append_song(
        &mut self,
        schedule_id: &str,
        song_id: &str,
        key: Option<&str>,
    ) -> Result<bool, DashboardError> {
        let Some(mut schedule) = self.schedule(schedule_id).cloned() else {
            warn!(%schedule_id, "append song skipped: schedule not found");
            return Ok(false);
        };
        let Some(song) = self.song(song_id).cloned() else {
            warn!(%song_id, "append song skipped: song not found");
            return Ok(false);
        };
        assembly::append_song(&mut schedule, &song, key).map_err(reject)?;
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                songs: Some(schedule.songs),
                ..SchedulePatch::default()
            },
        )
    }

    /// Place `member_id` on the schedule playing `instrument`.
    pub fn append_band_member(
        &mut self,
        schedule_id: &str,
        member_id: &str,
        instrument: &str,
    ) -> Result<bool, DashboardError> {
        let Some(mut schedule) = self.schedule(schedule_id).cloned() else {
            warn!(%schedule_id, "append member skipped: schedule not found");
            return Ok(false);
        };
        let Some(member) = self.member(member_id).cloned() else {
            warn!(%member_id, "append member skipped: member not found");
            return Ok(false);
        };
        assembly::append_band_member(&mut schedule, &member, instrument)
            .map_err(reject)?;
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                band: Some(schedule.band),
                ..SchedulePatch::default()
            },
        )
    }

    /// Splice a song placement from `source` to `destination`. Moves between
    /// two different schedules are ignored.
    pub fn move_song(
        &mut self,
        source: &DragLocation,
        destination: &DragLocation,
    ) -> Result<bool, DashboardError> {
        if source.schedule_id != destination.schedule_id {
            warn!(from = %source.schedule_id, to = %destination.schedule_id, "cross-schedule move ignored");
            return Ok(false);
        }
        let Some(mut schedule) = self.schedule(&source.schedule_id).cloned() else {
            return Ok(false);
        };
        if !move_entry(&mut schedule.songs, source.index, destination.index) {
            return Ok(false);
        }
        self.persist_schedule(
            &source.schedule_id,
            SchedulePatch {
                songs: Some(schedule.songs),
                ..SchedulePatch::default()
            },
        )
    }

    /// Band counterpart of [`Dashboard::move_song`].
    pub fn move_band_member(
        &mut self,
        source: &DragLocation,
        destination: &DragLocation,
    ) -> Result<bool, DashboardError> {
        if source.schedule_id != destination.schedule_id {
            warn!(from = %source.schedule_id, to = %destination.schedule_id, "cross-schedule move ignored");
            return Ok(false);
        }
        let Some(mut schedule) = self.schedule(&source.schedule_id).cloned() else {
            return Ok(false);
        };
        if !move_entry(&mut schedule.band, source.index, destination.index) {
            return Ok(false);
        }
        self.persist_schedule(
            &source.schedule_id,
            SchedulePatch {
                band: Some(schedule.band),
                ..SchedulePatch::default()
            },
        )
    }

    pub fn remove_song(
        &mut self,
        schedule_id: &str,
        schedule_item_id: &str,
    ) -> Result<bool, DashboardError> {
        let Some(mut schedule) = self.schedule(schedule_id).cloned() else {
            return Ok(false);
        };
        if !remove_entry(&mut schedule.songs, schedule_item_id) {
            warn!(%schedule_id, %schedule_item_id, "remove song skipped: placement not found");
            return Ok(false);
        }
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                songs: Some(schedule.songs),
                ..SchedulePatch::default()
            },
        )
    }

    pub fn remove_band_member(
        &mut self,
        schedule_id: &str,
        schedule_item_id: &str,
    ) -> Result<bool, DashboardError> {
        let Some(mut schedule) = self.schedule(schedule_id).cloned() else {
            return Ok(false);
        };
        if !remove_entry(&mut schedule.band, schedule_item_id) {
            warn!(%schedule_id, %schedule_item_id, "remove member skipped: placement not found");
            return Ok(false);
        }
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                band: Some(schedule.band),
                ..SchedulePatch::default()
            },
        )
    }

    pub fn update_leader(
        &mut self,
        schedule_id: &str,
        role: LeaderRole,
        value: &str,
    ) -> Result<bool, DashboardError> {
        if self.schedule(schedule_id).is_none() {
            return Ok(false);
        }
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                leaders: Some(LeadersPatch::single(role, value)),
                ..SchedulePatch::default()
            },
        )
    }

    pub fn update_singer(
        &mut self,
        schedule_id: &str,
        schedule_item_id: &str,
        singer: &str,
    ) -> Result<bool, DashboardError> {
        let Some(mut schedule) = self.schedule(schedule_id).cloned() else {
            return Ok(false);
        };
        if !assembly::assign_singer(&mut schedule.songs, schedule_item_id, singer) {
            warn!(%schedule_id, %schedule_item_id, "singer skipped: placement not found");
            return Ok(false);
        }
        self.persist_schedule(
            schedule_id,
            SchedulePatch {
                songs: Some(schedule.songs),
                ..SchedulePatch::default()
            },
        )
    }

    /// Band placements on the schedule that may sing.
    pub fn singer_candidates(&self, schedule_id: &str) -> Vec<&ScheduleBandEntry> {
        self.schedule(schedule_id)
            .map(assembly::singer_candidates)
            .unwrap_or_default()
    }

    /// Create an empty schedule seven days after the latest one, or seven days
    /// after `today` when there are none.
    pub fn add_next_sunday(&mut self, today: NaiveDate) -> Result<SundaySchedule, DashboardError> {
        let base = self
            .schedules
            .iter()
            .map(|schedule| schedule.date)
            .max()
            .unwrap_or(today);
        let date = base.checked_add_days(Days::new(7)).unwrap_or(base);
        let created = self
            .store
            .create_schedule(NewSchedule::empty(date))
            .inspect_err(|err| error!(%err, %date, "failed to create schedule"))?;
        self.reload_schedules()?;
        Ok(created)
    }

    pub fn delete_schedule(&mut self, schedule_id: &str) -> Result<bool, DashboardError> {
        let deleted = self
            .store
            .delete_schedule(schedule_id)
            .inspect_err(|err| error!(%err, %schedule_id, "failed to delete schedule"))?;
        if deleted {
            self.reload_schedules()?;
        }
        Ok(deleted)
    }

    // Pick lists

    /// Songs whose name or original singer contains `query` (case-insensitive),
    /// optionally restricted to one category.
    pub fn filter_songs(&self, query: &str, category: Option<Category>) -> Vec<&Song> {
        let needle = query.to_lowercase();
        self.songs
            .iter()
            .filter(|song| {
                song.name.to_lowercase().contains(&needle)
                    || song.original_singer.to_lowercase().contains(&needle)
            })
            .filter(|song| category.map_or(true, |category| song.category == category))
            .collect()
    }

    /// Members that can be placed on the schedule: full name matches `query`,
    /// some instrument contains `instrument` (both case-insensitive), and the
    /// member explicitly said they are available on the schedule date.
    pub fn members_for_schedule(
        &self,
        schedule_id: &str,
        query: &str,
        instrument: Option<&str>,
    ) -> Vec<&BandMember> {
        let Some(schedule) = self.schedule(schedule_id) else {
            return Vec::new();
        };
        let needle = query.to_lowercase();
        let instrument = instrument.map(str::to_lowercase);
        self.members
            .iter()
            .filter(|member| {
                format!("{} {}", member.first_name, member.last_name)
                    .to_lowercase()
                    .contains(&needle)
            })
            .filter(|member| match &instrument {
                Some(wanted) => member
                    .instruments
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(wanted.as_str())),
                None => true,
            })
            .filter(|member| {
                is_available(member, schedule.date, AvailabilityPolicy::ScheduleAssignment)
            })
            .collect()
    }

    // Availability

    /// Flip the member's member-detail availability for `date`. The snapshot
    /// changes before the write; a failed write reloads members and returns
    /// the error.
    pub fn toggle_availability(
        &mut self,
        member_id: &str,
        date: NaiveDate,
    ) -> Result<bool, DashboardError> {
        let Some(member) = self.members.iter_mut().find(|member| member.id == member_id) else {
            warn!(%member_id, "availability toggle skipped: member not found");
            return Ok(false);
        };
        let available = toggled_availability(member, date);
        upsert_record(&mut member.availability, date, available);

        match self.store.set_availability(member_id, date, available) {
            Ok(updated) => {
                self.reload_members()?;
                Ok(updated.is_some())
            }
            Err(err) => {
                error!(%err, %member_id, %date, "availability write failed, reverting");
                if let Err(reload_err) = self.reload_members() {
                    error!(err = %reload_err, "reload after failed availability write failed");
                }
                Err(err.into())
            }
        }
    }

    // Song and member maintenance

    pub fn create_song(&mut self, draft: NewSong) -> Result<Song, DashboardError> {
        let song = self.store.create_song(draft)?;
        self.reload_songs()?;
        Ok(song)
    }

    pub fn update_song(&mut self, id: &str, patch: &SongPatch) -> Result<bool, DashboardError> {
        let updated = self.store.update_song(id, patch)?;
        self.reload_songs()?;
        if patch.name.is_some() {
            self.reload_schedules()?;
        }
        Ok(updated.is_some())
    }

    /// Deleting a song also drops its placements, so schedules reload too.
    pub fn delete_song(&mut self, id: &str) -> Result<bool, DashboardError> {
        let deleted = self.store.delete_song(id)?;
        if deleted {
            self.reload_songs()?;
            self.reload_schedules()?;
        }
        Ok(deleted)
    }

    pub fn reorder_songs(&mut self, ids: &[String]) -> Result<(), DashboardError> {
        self.songs = self.store.reorder_songs(ids)?;
        Ok(())
    }

    pub fn create_member(&mut self, draft: NewMember) -> Result<BandMember, DashboardError> {
        let member = self.store.create_member(draft)?;
        self.reload_members()?;
        Ok(member)
    }

    pub fn update_member(&mut self, id: &str, patch: &MemberPatch) -> Result<bool, DashboardError> {
        let updated = self.store.update_member(id, patch)?;
        self.reload_members()?;
        if patch.first_name.is_some() {
            self.reload_schedules()?;
        }
        Ok(updated.is_some())
    }

    pub fn delete_member(&mut self, id: &str) -> Result<bool, DashboardError> {
        let deleted = self.store.delete_member(id)?;
        if deleted {
            self.reload_members()?;
            self.reload_schedules()?;
        }
        Ok(deleted)
    }

    pub fn reorder_members(&mut self, ids: &[String]) -> Result<(), DashboardError> {
        self.members = self.store.reorder_members(ids)?;
        Ok(())
    }

    fn persist_schedule(
        &mut self,
        schedule_id: &str,
        patch: SchedulePatch,
    ) -> Result<bool, DashboardError> {
        let updated = self
            .store
            .update_schedule(schedule_id, &patch)
            .inspect_err(|err| error!(%err, %schedule_id, "failed to persist schedule"))?;
        self.reload_schedules()?;
        Ok(updated.is_some())
    }
}

fn reject(rejection: Rejection) -> DashboardError {
    warn!(%rejection, "schedule change rejected");
    DashboardError::Rejected(rejection)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::assembly::is_contiguous;
    use crate::db::{LocalStore, PersistenceGateway};
    use crate::error::Result as StoreResult;
    use crate::models::AvailabilityRecord;

    /// Local store whose member updates fail while the flag is set.
    struct FlakyGateway {
        inner: LocalStore,
        fail_member_updates: Rc<Cell<bool>>,
    }

    impl PersistenceGateway for FlakyGateway {
        fn list_songs(&self) -> StoreResult<Vec<Song>> {
            self.inner.list_songs()
        }
        fn insert_song(&mut self, song: &Song) -> StoreResult<()> {
            self.inner.insert_song(song)
        }
        fn update_song(&mut self, id: &str, patch: &SongPatch) -> StoreResult<Option<Song>> {
            self.inner.update_song(id, patch)
        }
        fn delete_song(&mut self, id: &str) -> StoreResult<bool> {
            self.inner.delete_song(id)
        }
        fn list_members(&self) -> StoreResult<Vec<BandMember>> {
            self.inner.list_members()
        }
        fn insert_member(&mut self, member: &BandMember) -> StoreResult<()> {
            self.inner.insert_member(member)
        }
        fn update_member(
            &mut self,
            id: &str,
            patch: &MemberPatch,
        ) -> StoreResult<Option<BandMember>> {
            if self.fail_member_updates.get() {
                return Err(io::Error::other("disk full").into());
            }
            self.inner.update_member(id, patch)
        }
        fn delete_member(&mut self, id: &str) -> StoreResult<bool> {
            self.inner.delete_member(id)
        }
        fn list_schedules(&self) -> StoreResult<Vec<SundaySchedule>> {
            self.inner.list_schedules()
        }
        fn insert_schedule(&mut self, schedule: &SundaySchedule) -> StoreResult<()> {
            self.inner.insert_schedule(schedule)
        }
        fn update_schedule(
            &mut self,
            id: &str,
            patch: &SchedulePatch,
        ) -> StoreResult<Option<SundaySchedule>> {
            self.inner.update_schedule(id, patch)
        }
        fn delete_schedule(&mut self, id: &str) -> StoreResult<bool> {
            self.inner.delete_schedule(id)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 1)
    }

    fn dashboard() -> Dashboard {
        let store = EntityStore::new(Box::new(LocalStore::in_memory()));
        Dashboard::load(store, today(), 1).unwrap()
    }

    fn first_schedule(dashboard: &Dashboard) -> SundaySchedule {
        dashboard.schedules()[0].clone()
    }

    fn add_song(dashboard: &mut Dashboard, name: &str, key: &str) -> Song {
        dashboard
            .create_song(NewSong {
                name: name.into(),
                current_key: key.into(),
                ..NewSong::default()
            })
            .unwrap()
    }

    fn add_member(dashboard: &mut Dashboard, first: &str, available_on: &[NaiveDate]) -> BandMember {
        dashboard
            .create_member(NewMember {
                first_name: first.into(),
                last_name: "Pérez".into(),
                instruments: vec!["VOX1".into(), "AG".into()],
                availability: available_on
                    .iter()
                    .map(|date| AvailabilityRecord {
                        date: *date,
                        available: true,
                    })
                    .collect(),
                order: None,
            })
            .unwrap()
    }

    #[test]
    fn empty_store_is_seeded_with_sundays() {
        let dashboard = dashboard();
        let dates: Vec<_> = dashboard.schedules().iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 2),
                date(2024, 6, 9),
                date(2024, 6, 16),
                date(2024, 6, 23),
                date(2024, 6, 30),
            ]
        );
    }

    #[test]
    fn appending_a_song_twice_is_rejected() {
        let mut dashboard = dashboard();
        let song = add_song(&mut dashboard, "Hosanna", "E");
        let schedule = first_schedule(&dashboard);

        assert!(dashboard.append_song(&schedule.id, &song.id, None).unwrap());
        let err = dashboard
            .append_song(&schedule.id, &song.id, Some("D"))
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::DuplicateSong { .. })
        ));

        let songs = &dashboard.schedule(&schedule.id).unwrap().songs;
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].key, "E");
        assert_eq!(songs[0].order, 1);
    }

    #[test]
    fn members_need_explicit_availability() {
        let mut dashboard = dashboard();
        let schedule = first_schedule(&dashboard);
        let ana = add_member(&mut dashboard, "Ana", &[schedule.date]);
        let luis = add_member(&mut dashboard, "Luis", &[]);

        assert!(dashboard
            .append_band_member(&schedule.id, &ana.id, "VOX1")
            .unwrap());
        let err = dashboard
            .append_band_member(&schedule.id, &luis.id, "AG")
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::Unavailable { .. })
        ));
        let err = dashboard
            .append_band_member(&schedule.id, &ana.id, "VOX1")
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(Rejection::DuplicateAssignment { .. })
        ));
        assert!(dashboard
            .append_band_member(&schedule.id, &ana.id, "AG")
            .unwrap());

        let band = &dashboard.schedule(&schedule.id).unwrap().band;
        assert_eq!(band.len(), 2);
        assert_eq!(band[0].name, "Ana");

        let pickable = dashboard.members_for_schedule(&schedule.id, "", None);
        assert_eq!(pickable.len(), 1);
        assert_eq!(pickable[0].id, ana.id);
        assert!(dashboard
            .members_for_schedule(&schedule.id, "pér", Some("bass"))
            .is_empty());
    }

    #[test]
    fn moves_and_removals_keep_orders_contiguous() {
        let mut dashboard = dashboard();
        let schedule = first_schedule(&dashboard);
        let ids: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| add_song(&mut dashboard, name, "C").id)
            .collect();
        for id in &ids {
            dashboard.append_song(&schedule.id, id, None).unwrap();
        }

        let moved = dashboard
            .move_song(
                &DragLocation::new(schedule.id.clone(), 0),
                &DragLocation::new(schedule.id.clone(), 2),
            )
            .unwrap();
        assert!(moved);
        let names: Vec<_> = dashboard.schedule(&schedule.id).unwrap().songs
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        assert_eq!(names, vec!["B", "C", "A", "D"]);

        let item = dashboard.schedule(&schedule.id).unwrap().songs[1]
            .schedule_item_id
            .clone();
        assert!(dashboard.remove_song(&schedule.id, &item).unwrap());
        let songs = &dashboard.schedule(&schedule.id).unwrap().songs;
        assert_eq!(songs.len(), 3);
        assert!(is_contiguous(songs));
    }

    #[test]
    fn cross_schedule_moves_are_ignored() {
        let mut dashboard = dashboard();
        let first = dashboard.schedules()[0].clone();
        let second = dashboard.schedules()[1].clone();
        let song = add_song(&mut dashboard, "Hosanna", "E");
        dashboard.append_song(&first.id, &song.id, None).unwrap();

        let moved = dashboard
            .move_song(
                &DragLocation::new(first.id.clone(), 0),
                &DragLocation::new(second.id.clone(), 0),
            )
            .unwrap();
        assert!(!moved);
        assert_eq!(dashboard.schedule(&first.id).unwrap().songs.len(), 1);
        assert!(dashboard.schedule(&second.id).unwrap().songs.is_empty());
    }

    #[test]
    fn singers_come_from_vocal_placements() {
        let mut dashboard = dashboard();
        let schedule = first_schedule(&dashboard);
        let ana = add_member(&mut dashboard, "Ana", &[schedule.date]);
        let song = add_song(&mut dashboard, "Hosanna", "E");
        dashboard.append_song(&schedule.id, &song.id, None).unwrap();
        dashboard.append_band_member(&schedule.id, &ana.id, "VOX1").unwrap();
        dashboard.append_band_member(&schedule.id, &ana.id, "AG").unwrap();

        let candidates = dashboard.singer_candidates(&schedule.id);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].instrument, "VOX1");

        let item = dashboard.schedule(&schedule.id).unwrap().songs[0]
            .schedule_item_id
            .clone();
        assert!(dashboard.update_singer(&schedule.id, &item, "Ana").unwrap());
        assert!(dashboard
            .update_leader(&schedule.id, LeaderRole::Dm1, "Luis")
            .unwrap());
        let updated = dashboard.schedule(&schedule.id).unwrap();
        assert_eq!(updated.songs[0].singer, "Ana");
        assert_eq!(updated.leaders.dm1, "Luis");
        assert_eq!(updated.leaders.talkback, "");
    }

    #[test]
    fn next_sunday_follows_the_last_schedule() {
        let mut dashboard = dashboard();
        let created = dashboard.add_next_sunday(today()).unwrap();
        assert_eq!(created.date, date(2024, 7, 7));
        assert_eq!(dashboard.schedules().last().unwrap().id, created.id);
    }

    #[test]
    fn deleting_unknown_schedule_changes_nothing() {
        let mut dashboard = dashboard();
        let before = dashboard.schedules().to_vec();
        assert!(!dashboard.delete_schedule("ghost").unwrap());
        assert_eq!(dashboard.schedules(), before.as_slice());
    }

    #[test]
    fn song_filter_matches_name_singer_and_category() {
        let mut dashboard = dashboard();
        dashboard
            .create_song(NewSong {
                name: "Cuán Grande".into(),
                original_singer: "Marcos Witt".into(),
                category: Category::Hymn,
                ..NewSong::default()
            })
            .unwrap();
        add_song(&mut dashboard, "Hosanna", "E");

        assert_eq!(dashboard.filter_songs("witt", None).len(), 1);
        assert_eq!(dashboard.filter_songs("", Some(Category::Hymn)).len(), 1);
        assert_eq!(dashboard.filter_songs("", None).len(), 2);
        assert!(dashboard.filter_songs("hosanna", Some(Category::Hymn)).is_empty());
    }

    #[test]
    fn toggle_flips_from_implied_available() {
        let mut dashboard = dashboard();
        let ana = add_member(&mut dashboard, "Ana", &[]);
        let sunday = date(2024, 6, 9);

        assert!(dashboard.toggle_availability(&ana.id, sunday).unwrap());
        let member = dashboard.member(&ana.id).unwrap();
        assert_eq!(
            member.availability,
            vec![AvailabilityRecord {
                date: sunday,
                available: false
            }]
        );

        dashboard.toggle_availability(&ana.id, sunday).unwrap();
        let member = dashboard.member(&ana.id).unwrap();
        assert_eq!(member.availability.len(), 1);
        assert!(member.availability[0].available);
    }

    #[test]
    fn failed_toggle_is_reverted() {
        let fail = Rc::new(Cell::new(false));
        let gateway = FlakyGateway {
            inner: LocalStore::in_memory(),
            fail_member_updates: Rc::clone(&fail),
        };
        let mut dashboard = Dashboard::load(EntityStore::new(Box::new(gateway)), today(), 1).unwrap();
        let ana = add_member(&mut dashboard, "Ana", &[]);

        fail.set(true);
        let err = dashboard
            .toggle_availability(&ana.id, date(2024, 6, 9))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Store(StoreError::Io(_))));
        assert!(dashboard.member(&ana.id).unwrap().availability.is_empty());
    }

    #[test]
    fn deleting_a_song_drops_its_placements() {
        let mut dashboard = dashboard();
        let schedule = first_schedule(&dashboard);
        let keep = add_song(&mut dashboard, "Keep", "C");
        let gone = add_song(&mut dashboard, "Gone", "C");
        dashboard.append_song(&schedule.id, &gone.id, None).unwrap();
        dashboard.append_song(&schedule.id, &keep.id, None).unwrap();

        assert!(dashboard.delete_song(&gone.id).unwrap());
        let songs = &dashboard.schedule(&schedule.id).unwrap().songs;
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_id, keep.id);
        assert_eq!(songs[0].order, 1);
    }
}
