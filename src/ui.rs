//! Ratatui front-end: a login screen, then the loan table with form, catalog,
//! search and export overlays.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
