//! Core library surface for the band schedule manager.
//!
//! Persistence lives behind [`db::PersistenceGateway`]; [`store::EntityStore`]
//! adds ids and display ordering on top of it, and [`dashboard::Dashboard`]
//! applies the schedule assembly rules. The `bin` target only wires config,
//! logging, and the TUI around these pieces.
pub mod assembly;
pub mod availability;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod ui;

pub use config::AppConfig;
pub use dashboard::{Dashboard, DragLocation};
pub use db::{open_gateway, LocalStore, PersistenceGateway, SqliteGateway};
pub use error::{DashboardError, Rejection, StoreError};
pub use models::{BandMember, Song, SundaySchedule};
pub use store::EntityStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
