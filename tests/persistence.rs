use std::path::Path;

use band_schedule_manager::config::{StorageBackend, StorageConfig};
use band_schedule_manager::models::{Category, NewMember, NewSong};
use band_schedule_manager::{open_gateway, Dashboard, DragLocation, EntityStore, Rejection};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(backend: StorageBackend, path: &Path) -> Dashboard {
    let config = StorageConfig {
        backend,
        path: Some(path.to_path_buf()),
    };
    let store = EntityStore::new(open_gateway(&config).unwrap());
    Dashboard::load(store, date(2024, 6, 1), 1).unwrap()
}

/// Builds a Sunday with two songs and a singer, closes the store, and checks
/// everything survives a reopen.
fn schedule_survives_reopen(backend: StorageBackend, file_name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);

    let schedule_id = {
        let mut dashboard = open(backend, &path);
        assert_eq!(dashboard.schedules().len(), 5);

        let hosanna = dashboard
            .create_song(NewSong {
                name: "Hosanna".into(),
                current_key: "E".into(),
                category: Category::Praise,
                ..NewSong::default()
            })
            .unwrap();
        let oceans = dashboard
            .create_song(NewSong {
                name: "Oceans".into(),
                current_key: "D".into(),
                ..NewSong::default()
            })
            .unwrap();
        let ana = dashboard
            .create_member(NewMember {
                first_name: "Ana".into(),
                last_name: "Ruiz".into(),
                instruments: vec!["VOX".into()],
                ..NewMember::default()
            })
            .unwrap();

        let schedule_id = dashboard.schedules()[0].id.clone();
        let sunday = dashboard.schedules()[0].date;
        assert_eq!(sunday, date(2024, 6, 2));

        assert!(dashboard.append_song(&schedule_id, &hosanna.id, None).unwrap());
        assert!(dashboard.append_song(&schedule_id, &oceans.id, Some("C")).unwrap());
        let err = dashboard
            .append_song(&schedule_id, &hosanna.id, None)
            .unwrap_err();
        assert!(matches!(err.rejection(), Some(Rejection::DuplicateSong { .. })));

        // No availability answer yet counts as unavailable for scheduling.
        let err = dashboard
            .append_band_member(&schedule_id, &ana.id, "VOX")
            .unwrap_err();
        assert!(matches!(err.rejection(), Some(Rejection::Unavailable { .. })));
        assert!(dashboard.toggle_availability(&ana.id, sunday).unwrap());
        assert!(dashboard.toggle_availability(&ana.id, sunday).unwrap());
        assert!(dashboard.append_band_member(&schedule_id, &ana.id, "VOX").unwrap());

        let oceans_item = dashboard.schedules()[0].songs[1].schedule_item_id.clone();
        assert!(dashboard.update_singer(&schedule_id, &oceans_item, "Ana").unwrap());
        assert!(dashboard
            .move_song(
                &DragLocation::new(schedule_id.clone(), 1),
                &DragLocation::new(schedule_id.clone(), 0),
            )
            .unwrap());
        schedule_id
    };

    let dashboard = open(backend, &path);
    assert_eq!(dashboard.schedules().len(), 5, "no reseeding on reopen");
    let schedule = dashboard.schedule(&schedule_id).unwrap();
    let songs: Vec<_> = schedule
        .songs
        .iter()
        .map(|entry| (entry.name.as_str(), entry.key.as_str(), entry.singer.as_str(), entry.order))
        .collect();
    assert_eq!(songs, vec![("Oceans", "C", "Ana", 1), ("Hosanna", "E", "", 2)]);
    assert_eq!(schedule.band.len(), 1);
    assert_eq!(schedule.band[0].name, "Ana");
    assert_eq!(schedule.band[0].instrument, "VOX");

    let ana = &dashboard.members()[0];
    assert_eq!(ana.availability.len(), 1);
    assert!(ana.availability[0].available);
}

#[test]
fn sqlite_schedule_survives_reopen() {
    schedule_survives_reopen(StorageBackend::Sqlite, "band.db");
}

#[test]
fn local_schedule_survives_reopen() {
    schedule_survives_reopen(StorageBackend::Local, "band.json");
}

#[test]
fn deleting_a_song_clears_it_from_every_sunday() {
    for (backend, file_name) in [
        (StorageBackend::Sqlite, "band.db"),
        (StorageBackend::Local, "band.json"),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name);
        let mut dashboard = open(backend, &path);

        let first = dashboard
            .create_song(NewSong {
                name: "Way Maker".into(),
                ..NewSong::default()
            })
            .unwrap();
        let second = dashboard
            .create_song(NewSong {
                name: "Yes I Will".into(),
                ..NewSong::default()
            })
            .unwrap();
        let ids: Vec<String> = dashboard.schedules().iter().take(2).map(|s| s.id.clone()).collect();
        for id in &ids {
            dashboard.append_song(id, &first.id, None).unwrap();
            dashboard.append_song(id, &second.id, None).unwrap();
        }

        assert!(dashboard.delete_song(&first.id).unwrap());
        drop(dashboard);

        let dashboard = open(backend, &path);
        for id in &ids {
            let songs = &dashboard.schedule(id).unwrap().songs;
            assert_eq!(songs.len(), 1, "{backend:?}");
            assert_eq!(songs[0].name, "Yes I Will");
            assert_eq!(songs[0].order, 1);
        }
    }
}

#[test]
fn manual_order_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("band.db");
    let mut dashboard = open(StorageBackend::Sqlite, &path);
    for name in ["Cornerstone", "Agnus Dei", "Build My Life"] {
        dashboard
            .create_song(NewSong {
                name: name.into(),
                ..NewSong::default()
            })
            .unwrap();
    }
    let names: Vec<_> = dashboard.songs().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, ["Agnus Dei", "Build My Life", "Cornerstone"]);

    let cornerstone = dashboard.songs()[2].id.clone();
    dashboard.reorder_songs(&[cornerstone]).unwrap();
    drop(dashboard);

    let dashboard = open(StorageBackend::Sqlite, &path);
    let names: Vec<_> = dashboard.songs().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Cornerstone", "Agnus Dei", "Build My Life"]);
}
