//! Ratatui front-end: three tabs (Sundays, songs, band) over one
//! [`Dashboard`](crate::dashboard::Dashboard), with modal forms and pickers
//! layered on top.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
