//! Entity store: the song, member, and schedule repositories. Each repository
//! sits on top of the injected [`PersistenceGateway`] and adds what the
//! gateways deliberately leave out: identifier generation, display ordering,
//! manual reordering, and the availability upsert.

mod members;
mod ordering;
mod schedules;
mod songs;

pub use ordering::{compare_for_display, reorder_plan, sort_for_display, Orderable};

use crate::db::PersistenceGateway;

pub struct EntityStore {
    gateway: Box<dyn PersistenceGateway>,
}

impl EntityStore {
    pub fn new(gateway: Box<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::{LocalStore, SqliteGateway};
    use crate::models::{NewMember, NewSchedule, NewSong, SongPatch};

    fn backends() -> Vec<EntityStore> {
        vec![
            EntityStore::new(Box::new(LocalStore::in_memory())),
            EntityStore::new(Box::new(
                SqliteGateway::in_memory().expect("in-memory sqlite"),
            )),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn named_song(name: &str) -> NewSong {
        NewSong {
            name: name.into(),
            ..NewSong::default()
        }
    }

    #[test]
    fn created_entities_get_distinct_ids() {
        for mut store in backends() {
            let first = store.create_song(named_song("Hosanna")).unwrap();
            let second = store.create_song(named_song("Hosanna")).unwrap();
            assert_ne!(first.id, second.id);
            assert_eq!(store.songs().unwrap().len(), 2);
        }
    }

    #[test]
    fn missing_ids_answer_none_or_false() {
        for mut store in backends() {
            let patch = SongPatch {
                name: Some("x".into()),
                ..SongPatch::default()
            };
            assert!(store.update_song("ghost", &patch).unwrap().is_none());
            assert!(!store.delete_song("ghost").unwrap());
            assert!(!store.delete_member("ghost").unwrap());
            assert!(!store.delete_schedule("ghost").unwrap());
            assert!(store
                .set_availability("ghost", date(2024, 6, 2), true)
                .unwrap()
                .is_none());
        }
    }

    #[test]
    fn reorder_puts_named_songs_first() {
        for mut store in backends() {
            let a = store.create_song(named_song("A")).unwrap();
            let b = store.create_song(named_song("B")).unwrap();
            let c = store.create_song(named_song("C")).unwrap();

            let reordered = store.reorder_songs(&[c.id.clone(), b.id.clone()]).unwrap();
            let ids: Vec<_> = reordered.iter().map(|song| song.id.clone()).collect();
            assert_eq!(ids, vec![c.id.clone(), b.id.clone(), a.id.clone()]);
            assert_eq!(reordered[0].order, Some(0));
            assert_eq!(reordered[2].order, Some(2));
        }
    }

    #[test]
    fn availability_upsert_keeps_one_record_per_date() {
        for mut store in backends() {
            let member = store
                .create_member(NewMember {
                    first_name: "Ana".into(),
                    ..NewMember::default()
                })
                .unwrap();
            let sunday = date(2024, 6, 2);

            store.set_availability(&member.id, sunday, true).unwrap();
            let updated = store
                .set_availability(&member.id, sunday, false)
                .unwrap()
                .unwrap();
            assert_eq!(updated.availability.len(), 1);
            assert!(!updated.availability[0].available);

            let reloaded = store.member(&member.id).unwrap().unwrap();
            assert_eq!(reloaded.availability, updated.availability);
        }
    }

    #[test]
    fn schedules_come_back_by_date() {
        for mut store in backends() {
            store
                .create_schedule(NewSchedule::empty(date(2024, 6, 16)))
                .unwrap();
            store
                .create_schedule(NewSchedule::empty(date(2024, 6, 2)))
                .unwrap();
            store
                .create_schedule(NewSchedule::empty(date(2024, 6, 9)))
                .unwrap();
            let dates: Vec<_> = store
                .schedules()
                .unwrap()
                .into_iter()
                .map(|schedule| schedule.date)
                .collect();
            assert_eq!(
                dates,
                vec![date(2024, 6, 2), date(2024, 6, 9), date(2024, 6, 16)]
            );
        }
    }
}
