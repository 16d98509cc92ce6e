use chrono::Local;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Loan, LoanRecord};

const SELECT_LOANS: &str = "SELECT id, member_type, reference_no, title, firstname, surname,
        mobile, address1, address2, postcode, book_id, book_title, author,
        date_borrowed, date_due, days_on_loan, late_return_fine, selling_price,
        date_overdue, created_at
     FROM borrow_records";

/// Format used for `created_at` stamps.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The id the next insert will receive: `MAX(id) + 1`, or 1 for an empty
/// table. Always read fresh because deletes shift ids down.
pub fn next_loan_id(conn: &Connection) -> Result<i64> {
    let max: Option<i64> =
        conn.query_row("SELECT MAX(id) FROM borrow_records", [], |row| row.get(0))?;
    Ok(max.map_or(1, |id| id + 1))
}

pub fn count_loans(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM borrow_records", [], |row| row.get(0))?;
    Ok(count)
}

/// Append a loan at the end of the table and return its id. `created_at` is
/// stamped with the current local time when not supplied. Callers validate
/// the loan beforehand.
pub fn insert_loan(conn: &Connection, loan: &Loan, created_at: Option<&str>) -> Result<i64> {
    let id = next_loan_id(conn)?;
    let created_at = match created_at {
        Some(stamp) => stamp.to_string(),
        None => Local::now().format(CREATED_AT_FORMAT).to_string(),
    };

    conn.execute(
        "INSERT INTO borrow_records (
            id, member_type, reference_no, title, firstname, surname, mobile,
            address1, address2, postcode, book_id, book_title, author,
            date_borrowed, date_due, days_on_loan, late_return_fine,
            selling_price, date_overdue, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                   ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            id,
            loan.member_type,
            loan.reference_no,
            loan.title,
            loan.firstname,
            loan.surname,
            loan.mobile,
            loan.address1,
            loan.address2,
            loan.postcode,
            loan.book_id,
            loan.book_title,
            loan.author,
            loan.date_borrowed,
            loan.date_due,
            loan.days_on_loan,
            loan.late_return_fine,
            loan.selling_price,
            loan.date_overdue,
            created_at,
        ],
    )?;

    debug!("inserted loan record {id}");
    Ok(id)
}

/// Every loan in id order, or only those whose first name, surname, book
/// title or reference number contain `filter`. Matching uses SQLite `LIKE`,
/// so it ignores ASCII case; wildcard characters in the filter are literal.
pub fn fetch_loans(conn: &Connection, filter: Option<&str>) -> Result<Vec<LoanRecord>> {
    let loans = match filter {
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_LOANS} ORDER BY id ASC"))?;
            let rows = stmt.query_map([], loan_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        Some(query) => {
            let pattern = format!("%{}%", escape_like(query));
            let mut stmt = conn.prepare(&format!(
                "{SELECT_LOANS}
                 WHERE firstname LIKE ?1 ESCAPE '\\'
                    OR surname LIKE ?1 ESCAPE '\\'
                    OR book_title LIKE ?1 ESCAPE '\\'
                    OR reference_no LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([pattern], loan_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(loans)
}

pub fn fetch_loan(conn: &Connection, id: i64) -> Result<Option<LoanRecord>> {
    let loan = conn
        .query_row(
            &format!("{SELECT_LOANS} WHERE id = ?1"),
            [id],
            loan_from_row,
        )
        .optional()?;
    Ok(loan)
}

/// Delete one loan and close the gap it leaves: every id above it moves down
/// by one. Both steps share a transaction. Returns the number of rows
/// deleted (0 when `id` does not exist, in which case nothing is renumbered).
pub fn delete_loan(conn: &Connection, id: i64) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;

    let deleted = tx.execute("DELETE FROM borrow_records WHERE id = ?1", [id])?;
    if deleted > 0 {
        // Flip to negative first so no intermediate id collides with a
        // neighbour regardless of the order SQLite visits the rows.
        tx.execute("UPDATE borrow_records SET id = -id WHERE id > ?1", [id])?;
        let shifted = tx.execute("UPDATE borrow_records SET id = -id - 1 WHERE id < 0", [])?;
        debug!("deleted loan record {id}, renumbered {shifted} records");
    }

    tx.commit()?;
    Ok(deleted)
}

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<LoanRecord> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };

    Ok(LoanRecord {
        id: row.get(0)?,
        loan: Loan {
            member_type: text(1)?,
            reference_no: text(2)?,
            title: text(3)?,
            firstname: text(4)?,
            surname: text(5)?,
            mobile: text(6)?,
            address1: text(7)?,
            address2: text(8)?,
            postcode: text(9)?,
            book_id: text(10)?,
            book_title: text(11)?,
            author: text(12)?,
            date_borrowed: text(13)?,
            date_due: text(14)?,
            days_on_loan: row.get::<_, Option<i64>>(15)?.unwrap_or_default(),
            late_return_fine: text(16)?,
            selling_price: text(17)?,
            date_overdue: text(18)?,
        },
        created_at: text(19)?,
    })
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Achebe"), "Achebe");
    }
}
