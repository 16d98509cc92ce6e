//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These stay plain data holders so the persistence and presentation
//! layers can focus on their own concerns.

use std::fmt;

/// Column names of `borrow_records` in persisted order. Also used as the CSV
/// header row.
pub const LOAN_COLUMNS: [&str; 20] = [
    "id",
    "member_type",
    "reference_no",
    "title",
    "firstname",
    "surname",
    "mobile",
    "address1",
    "address2",
    "postcode",
    "book_id",
    "book_title",
    "author",
    "date_borrowed",
    "date_due",
    "days_on_loan",
    "late_return_fine",
    "selling_price",
    "date_overdue",
    "created_at",
];

/// Member categories offered by the form. Free text is still accepted.
pub const MEMBER_TYPES: &[&str] = &["", "Student", "Lecturer", "Admin Staff"];

/// Honorifics offered by the form. Free text is still accepted.
pub const MEMBER_TITLES: &[&str] = &["", "Miss", "Mrs", "Mr", "Dr", "Ms", "Cant"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The user-editable part of a borrow transaction: who borrowed what, when it
/// is due, and what it costs if it never comes back.
pub struct Loan {
    pub member_type: String,
    pub reference_no: String,
    pub title: String,
    pub firstname: String,
    pub surname: String,
    pub mobile: String,
    pub address1: String,
    pub address2: String,
    pub postcode: String,
    pub book_id: String,
    pub book_title: String,
    pub author: String,
    /// `YYYY-MM-DD`.
    pub date_borrowed: String,
    /// `YYYY-MM-DD`.
    pub date_due: String,
    pub days_on_loan: i64,
    pub late_return_fine: String,
    pub selling_price: String,
    pub date_overdue: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A persisted loan. The `id` is dense: it always equals the row's 1-based
/// position, so it shifts down when an earlier record is deleted.
pub struct LoanRecord {
    pub id: i64,
    pub loan: Loan,
    pub created_at: String,
}

impl LoanRecord {
    /// `Firstname Surname`, skipping whichever half is blank.
    pub fn member_name(&self) -> String {
        let first = self.loan.firstname.trim();
        let last = self.loan.surname.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Values in `LOAN_COLUMNS` order, ready for a CSV writer.
    pub fn to_row(&self) -> [String; 20] {
        let loan = &self.loan;
        [
            self.id.to_string(),
            loan.member_type.clone(),
            loan.reference_no.clone(),
            loan.title.clone(),
            loan.firstname.clone(),
            loan.surname.clone(),
            loan.mobile.clone(),
            loan.address1.clone(),
            loan.address2.clone(),
            loan.postcode.clone(),
            loan.book_id.clone(),
            loan.book_title.clone(),
            loan.author.clone(),
            loan.date_borrowed.clone(),
            loan.date_due.clone(),
            loan.days_on_loan.to_string(),
            loan.late_return_fine.clone(),
            loan.selling_price.clone(),
            loan.date_overdue.clone(),
            self.created_at.clone(),
        ]
    }
}

impl fmt::Display for LoanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.loan.book_title)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Static reference metadata for a known title, used to pre-fill the form.
pub struct CatalogEntry {
    pub title: &'static str,
    pub book_id: &'static str,
    pub author: &'static str,
    pub late_return_fine: &'static str,
    pub selling_price: &'static str,
    pub days_on_loan: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(firstname: &str, surname: &str) -> LoanRecord {
        LoanRecord {
            id: 3,
            loan: Loan {
                firstname: firstname.into(),
                surname: surname.into(),
                book_title: "Arrow of God".into(),
                days_on_loan: 14,
                ..Default::default()
            },
            created_at: "2024-05-01T10:00:00.000000".into(),
        }
    }

    #[test]
    fn member_name_skips_blank_halves() {
        assert_eq!(record("Ama", "Mensah").member_name(), "Ama Mensah");
        assert_eq!(record("Ama", " ").member_name(), "Ama");
        assert_eq!(record("", "Mensah").member_name(), "Mensah");
        assert_eq!(record("", "").member_name(), "");
    }

    #[test]
    fn row_follows_column_order() {
        let row = record("Ama", "Mensah").to_row();
        assert_eq!(row.len(), LOAN_COLUMNS.len());
        assert_eq!(row[0], "3");
        assert_eq!(row[4], "Ama");
        assert_eq!(row[11], "Arrow of God");
        assert_eq!(row[15], "14");
        assert_eq!(row[19], "2024-05-01T10:00:00.000000");
    }
}
