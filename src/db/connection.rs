use std::fs;
use std::path::Path;

use log::debug;
use rusqlite::Connection;

use crate::error::{Error, Result};

/// Open (creating if needed) the credential database and make sure the
/// `users` table exists.
pub fn open_user_store(path: &Path) -> Result<Connection> {
    let conn = open_database(path)?;
    ensure_user_schema(&conn)?;
    Ok(conn)
}

/// Open (creating if needed) the loan database and make sure the
/// `borrow_records` table exists.
pub fn open_loan_store(path: &Path) -> Result<Connection> {
    let conn = open_database(path)?;
    ensure_loan_schema(&conn)?;
    Ok(conn)
}

fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path).map_err(|source| Error::DatabaseOpen {
        path: path.to_owned(),
        source,
    })?;
    debug!("opened database at {}", path.display());
    Ok(conn)
}

/// Credentials live in their own file, separate from the loan records.
pub fn ensure_user_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// `id` is a plain `INTEGER PRIMARY KEY` (no AUTOINCREMENT) because the loan
/// layer assigns ids itself and shifts them on delete.
pub fn ensure_loan_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS borrow_records (
            id INTEGER PRIMARY KEY,
            member_type TEXT,
            reference_no TEXT,
            title TEXT,
            firstname TEXT,
            surname TEXT,
            mobile TEXT,
            address1 TEXT,
            address2 TEXT,
            postcode TEXT,
            book_id TEXT,
            book_title TEXT,
            author TEXT,
            date_borrowed TEXT,
            date_due TEXT,
            days_on_loan INTEGER,
            late_return_fine TEXT,
            selling_price TEXT,
            date_overdue TEXT,
            created_at TEXT
        )",
        [],
    )?;
    Ok(())
}
