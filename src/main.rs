//! Binary entry point: load configuration, start file logging, open both
//! stores and hand control to the TUI.
use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::Context;
use env_logger::{Env, Target};
use log::info;

use library_loan_manager::config;
use library_loan_manager::db::{open_loan_store, open_user_store};
use library_loan_manager::{run_app, App, LoanDesk};

fn main() -> anyhow::Result<()> {
    let config = config::load().context("failed to load configuration")?;
    init_logging(&config.log_path())?;

    let users = open_user_store(&config.users_db_path())?;
    let loans = open_loan_store(&config.loans_db_path())?;
    info!(
        "stores ready: users={} loans={}",
        config.users_db_path().display(),
        config.loans_db_path().display()
    );

    let desk = LoanDesk::new(loans, config.default_days_on_loan);
    let mut app = App::new(users, desk, config.export_dir());
    let result = run_app(&mut app);
    info!("shutting down");
    result
}

/// The terminal belongs to the TUI, so log lines go to a file instead.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
