//! CSV export of the loan table.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::fetch_loans;
use crate::error::{Error, Result};
use crate::models::LOAN_COLUMNS;

/// Write a header row plus one row per record (id order) to `path` and
/// return the number of records written. An empty store yields
/// `Error::NoData` and leaves the filesystem untouched. A failure part way
/// through leaves whatever was written so far; re-run the export.
pub fn export_csv(conn: &Connection, path: &Path) -> Result<usize> {
    let records = fetch_loans(conn, None)?;
    if records.is_empty() {
        return Err(Error::NoData);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(LOAN_COLUMNS)?;
    for record in &records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;

    Ok(records.len())
}

/// Timestamped file name inside `dir`, e.g.
/// `library_records_20240501_093000.csv`.
pub fn default_export_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "library_records_{}.csv",
        now.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_path_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let path = default_export_path(Path::new("/tmp/exports"), now);
        assert_eq!(
            path,
            PathBuf::from("/tmp/exports/library_records_20240501_093000.csv")
        );
    }
}
