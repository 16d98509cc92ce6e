//! Library loan tracker: credential and loan stores backed by SQLite, a fixed
//! book catalog, the form/session controller and a Ratatui front-end.
//!
//! The binary only wires configuration, logging and the two stores together.
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod ui;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{CatalogEntry, Loan, LoanRecord};
pub use session::{LoanDesk, LoanForm};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
