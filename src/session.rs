//! Form state and the controller that turns it into loan records.
//!
//! `LoanForm` is the command object: the UI edits it field by field and hands
//! it to `LoanDesk` when the user saves, searches or picks a catalog title.
//! Nothing here is global; each screen owns its form.

use std::path::Path;

use chrono::{Days, Local, NaiveDate};
use log::info;
use rusqlite::Connection;

use crate::catalog;
use crate::db::{count_loans, delete_loan, fetch_loan, fetch_loans, insert_loan, next_loan_id};
use crate::error::{Error, Result};
use crate::export::export_csv;
use crate::models::{Loan, LoanRecord};

/// Loan length used when the form holds nothing usable.
pub const DEFAULT_DAYS_ON_LOAN: i64 = 14;
/// Storage and display format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw field values exactly as typed. `days_on_loan` stays text so a half
/// typed or cleared number can be represented.
pub struct LoanForm {
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
    pub date_borrowed: String,
    pub date_due: String,
    pub days_on_loan: String,
    pub late_return_fine: String,
    pub selling_price: String,
    pub date_overdue: String,
}

impl Default for LoanForm {
    fn default() -> Self {
        Self::new(DEFAULT_DAYS_ON_LOAN)
    }
}

impl LoanForm {
    /// Empty form with the given default loan length.
    pub fn new(default_days: i64) -> Self {
        Self {
            member_type: String::new(),
            reference_no: String::new(),
            title: String::new(),
            firstname: String::new(),
            surname: String::new(),
            mobile: String::new(),
            address1: String::new(),
            address2: String::new(),
            postcode: String::new(),
            book_id: String::new(),
            book_title: String::new(),
            author: String::new(),
            date_borrowed: String::new(),
            date_due: String::new(),
            days_on_loan: default_days.to_string(),
            late_return_fine: String::new(),
            selling_price: String::new(),
            date_overdue: String::new(),
        }
    }

    /// Copy every field of a stored record into a fresh form.
    pub fn from_record(record: &LoanRecord, default_days: i64) -> Self {
        let loan = &record.loan;
        let days = if loan.days_on_loan > 0 {
            loan.days_on_loan
        } else {
            default_days
        };
        Self {
            member_type: loan.member_type.clone(),
            reference_no: loan.reference_no.clone(),
            title: loan.title.clone(),
            firstname: loan.firstname.clone(),
            surname: loan.surname.clone(),
            mobile: loan.mobile.clone(),
            address1: loan.address1.clone(),
            address2: loan.address2.clone(),
            postcode: loan.postcode.clone(),
            book_id: loan.book_id.clone(),
            book_title: loan.book_title.clone(),
            author: loan.author.clone(),
            date_borrowed: loan.date_borrowed.clone(),
            date_due: loan.date_due.clone(),
            days_on_loan: days.to_string(),
            late_return_fine: loan.late_return_fine.clone(),
            selling_price: loan.selling_price.clone(),
            date_overdue: loan.date_overdue.clone(),
        }
    }

    /// Clear every text field and restore the default loan length.
    pub fn reset(&mut self, default_days: i64) {
        *self = Self::new(default_days);
    }

    /// Days on loan if the field holds a whole number of at least one.
    pub fn parsed_days(&self) -> Option<i64> {
        self.days_on_loan
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| *days >= 1)
    }

    /// Fill in whichever of the borrowed/due dates is still empty. The due
    /// date counts from `today`, not from a typed borrow date. Fields that
    /// already hold a value are left alone, so calling this twice is a no-op.
    pub fn ensure_dates(&mut self, today: NaiveDate, default_days: i64) {
        if self.date_borrowed.trim().is_empty() {
            self.date_borrowed = today.format(DATE_FORMAT).to_string();
        }
        if self.date_due.trim().is_empty() {
            let days = self.parsed_days().unwrap_or(default_days);
            let due = today
                .checked_add_days(Days::new(days.max(1) as u64))
                .unwrap_or(today);
            self.date_due = due.format(DATE_FORMAT).to_string();
        }
    }

    /// Set the book title and, when the catalog knows it, the book id,
    /// author, fine, price and loan length. Returns whether it matched.
    pub fn apply_catalog(&mut self, title: &str) -> bool {
        self.book_title = title.to_string();
        match catalog::lookup(title) {
            Some(entry) => {
                self.book_id = entry.book_id.to_string();
                self.author = entry.author.to_string();
                self.late_return_fine = entry.late_return_fine.to_string();
                self.selling_price = entry.selling_price.to_string();
                self.days_on_loan = entry.days_on_loan.to_string();
                true
            }
            None => false,
        }
    }

    fn check_required(&self) -> Result<()> {
        if self.firstname.trim().is_empty() || self.book_title.trim().is_empty() {
            return Err(Error::Validation(
                "Please enter at least a firstname and book title.".to_string(),
            ));
        }
        if self.parsed_days().is_none() {
            return Err(Error::Validation(
                "Days on loan must be a whole number of at least 1.".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and trim the form into a `Loan` ready for insertion.
    pub fn to_loan(&self) -> Result<Loan> {
        self.check_required()?;
        let days_on_loan = self.parsed_days().unwrap_or(DEFAULT_DAYS_ON_LOAN);
        Ok(Loan {
            member_type: self.member_type.trim().to_string(),
            reference_no: self.reference_no.trim().to_string(),
            title: self.title.trim().to_string(),
            firstname: self.firstname.trim().to_string(),
            surname: self.surname.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            address1: self.address1.trim().to_string(),
            address2: self.address2.trim().to_string(),
            postcode: self.postcode.trim().to_string(),
            book_id: self.book_id.trim().to_string(),
            book_title: self.book_title.trim().to_string(),
            author: self.author.trim().to_string(),
            date_borrowed: self.date_borrowed.trim().to_string(),
            date_due: self.date_due.trim().to_string(),
            days_on_loan,
            late_return_fine: self.late_return_fine.trim().to_string(),
            selling_price: self.selling_price.trim().to_string(),
            date_overdue: self.date_overdue.trim().to_string(),
        })
    }
}

/// Session controller over the loan store. Every user action goes through
/// one of these methods.
pub struct LoanDesk {
    conn: Connection,
    default_days: i64,
}

impl LoanDesk {
    pub fn new(conn: Connection, default_days: i64) -> Self {
        Self { conn, default_days }
    }

    /// A form in its reset state.
    pub fn blank_form(&self) -> LoanForm {
        LoanForm::new(self.default_days)
    }

    /// Persist the form as a new record using today's date for any missing
    /// dates, then clear it. See `save_as_of`.
    pub fn save(&self, form: &mut LoanForm) -> Result<i64> {
        self.save_as_of(form, Local::now().date_naive())
    }

    /// Validate, default the dates against `today`, insert, then reset the
    /// form. On a validation error the form is left untouched.
    ///
    /// A form filled via `load_into_form` is saved as a brand new record.
    pub fn save_as_of(&self, form: &mut LoanForm, today: NaiveDate) -> Result<i64> {
        form.check_required()?;
        form.ensure_dates(today, self.default_days);
        let loan = form.to_loan()?;
        let id = insert_loan(&self.conn, &loan, None)?;
        info!("saved loan record {id} ({})", loan.book_title);
        form.reset(self.default_days);
        Ok(id)
    }

    /// Blank queries return everything; anything else is a substring search
    /// over names, book title and reference number.
    pub fn search(&self, query: &str) -> Result<Vec<LoanRecord>> {
        let query = query.trim();
        if query.is_empty() {
            fetch_loans(&self.conn, None)
        } else {
            fetch_loans(&self.conn, Some(query))
        }
    }

    pub fn records(&self) -> Result<Vec<LoanRecord>> {
        fetch_loans(&self.conn, None)
    }

    pub fn record(&self, id: i64) -> Result<Option<LoanRecord>> {
        fetch_loan(&self.conn, id)
    }

    /// Replace the form contents with a stored record for review.
    pub fn load_into_form(&self, id: i64, form: &mut LoanForm) -> Result<()> {
        let record = fetch_loan(&self.conn, id)?.ok_or(Error::RecordNotFound(id))?;
        *form = LoanForm::from_record(&record, self.default_days);
        Ok(())
    }

    /// Apply a picked catalog title and default the dates.
    pub fn select_catalog(&self, title: &str, form: &mut LoanForm, today: NaiveDate) -> bool {
        let matched = form.apply_catalog(title);
        form.ensure_dates(today, self.default_days);
        matched
    }

    /// Delete by id; later ids shift down by one.
    pub fn delete(&self, id: i64) -> Result<()> {
        if delete_loan(&self.conn, id)? == 0 {
            return Err(Error::RecordNotFound(id));
        }
        info!("deleted loan record {id}");
        Ok(())
    }

    /// Delete the selected record, reporting a missing selection as an error.
    pub fn delete_selected(&self, selection: Option<i64>) -> Result<i64> {
        let id = selection.ok_or(Error::NoSelection)?;
        self.delete(id)?;
        Ok(id)
    }

    pub fn next_id(&self) -> Result<i64> {
        next_loan_id(&self.conn)
    }

    pub fn count(&self) -> Result<i64> {
        count_loans(&self.conn)
    }

    /// Write every record to `path` as CSV; see `export::export_csv`.
    pub fn export(&self, path: &Path) -> Result<usize> {
        let rows = export_csv(&self.conn, path)?;
        info!("exported {rows} loan records to {}", path.display());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_form_is_blank_with_default_days() {
        let form = LoanForm::default();
        assert_eq!(form.days_on_loan, "14");
        assert!(form.firstname.is_empty());
        assert!(form.date_due.is_empty());
    }

    #[test]
    fn ensure_dates_fills_empty_fields_from_days_on_loan() {
        let mut form = LoanForm::new(14);
        form.days_on_loan = "10".into();
        form.ensure_dates(day(2024, 2, 25), 14);
        assert_eq!(form.date_borrowed, "2024-02-25");
        assert_eq!(form.date_due, "2024-03-06");
    }

    #[test]
    fn ensure_dates_honours_long_loans() {
        let mut form = LoanForm::new(14);
        form.days_on_loan = "400".into();
        form.ensure_dates(day(2024, 1, 1), 14);
        assert_eq!(form.date_due, "2025-02-04");

        let mut form = LoanForm::new(14);
        form.days_on_loan = i64::MAX.to_string();
        form.ensure_dates(day(2024, 1, 1), 14);
        assert_eq!(form.date_due, "2024-01-01");
    }

    #[test]
    fn ensure_dates_falls_back_to_default_days() {
        let mut form = LoanForm::new(14);
        form.days_on_loan = "soon".into();
        form.ensure_dates(day(2024, 1, 1), 14);
        assert_eq!(form.date_due, "2024-01-15");

        let mut form = LoanForm::new(14);
        form.days_on_loan = "0".into();
        form.ensure_dates(day(2024, 1, 1), 7);
        assert_eq!(form.date_due, "2024-01-08");
    }

    #[test]
    fn ensure_dates_never_overwrites() {
        let mut form = LoanForm::new(14);
        form.date_borrowed = "2023-12-01".into();
        form.date_due = "2023-12-20".into();
        form.ensure_dates(day(2024, 1, 1), 14);
        assert_eq!(form.date_borrowed, "2023-12-01");
        assert_eq!(form.date_due, "2023-12-20");

        let mut form = LoanForm::new(14);
        form.ensure_dates(day(2024, 1, 1), 14);
        let once = form.clone();
        form.ensure_dates(day(2024, 6, 1), 14);
        assert_eq!(form, once);
    }

    #[test]
    fn apply_catalog_fills_known_titles_only() {
        let mut form = LoanForm::new(14);
        assert!(form.apply_catalog("Game Design"));
        assert_eq!(form.book_title, "Game Design");
        assert_eq!(form.book_id, "ISBN-102");
        assert_eq!(form.author, "James Ford");
        assert_eq!(form.days_on_loan, "12");

        let mut form = LoanForm::new(14);
        form.author = "typed by hand".into();
        assert!(!form.apply_catalog("Some Local Pamphlet"));
        assert_eq!(form.book_title, "Some Local Pamphlet");
        assert_eq!(form.author, "typed by hand");
        assert!(form.book_id.is_empty());
    }

    #[test]
    fn to_loan_requires_firstname_and_book_title() {
        let mut form = LoanForm::new(14);
        form.firstname = "  ".into();
        form.book_title = "Arrow of God".into();
        assert!(matches!(form.to_loan(), Err(Error::Validation(_))));

        form.firstname = "Ama".into();
        form.book_title.clear();
        assert!(matches!(form.to_loan(), Err(Error::Validation(_))));
    }

    #[test]
    fn to_loan_rejects_out_of_range_days() {
        let mut form = LoanForm::new(14);
        form.firstname = "Ama".into();
        form.book_title = "Arrow of God".into();
        for bad in ["", "0", "-4", "two"] {
            form.days_on_loan = bad.into();
            assert!(matches!(form.to_loan(), Err(Error::Validation(_))), "{bad}");
        }
        form.days_on_loan = " 21 ".into();
        assert_eq!(form.to_loan().unwrap().days_on_loan, 21);
        form.days_on_loan = "400".into();
        assert_eq!(form.to_loan().unwrap().days_on_loan, 400);
    }

    #[test]
    fn to_loan_trims_values() {
        let mut form = LoanForm::new(14);
        form.firstname = " Ama ".into();
        form.book_title = "Purple Hibiscus\t".into();
        form.postcode = " 1000 ".into();
        let loan = form.to_loan().unwrap();
        assert_eq!(loan.firstname, "Ama");
        assert_eq!(loan.book_title, "Purple Hibiscus");
        assert_eq!(loan.postcode, "1000");
    }

    #[test]
    fn from_record_restores_default_for_missing_days() {
        let record = LoanRecord {
            id: 1,
            loan: Loan {
                firstname: "Kofi".into(),
                days_on_loan: 0,
                ..Default::default()
            },
            created_at: String::new(),
        };
        let form = LoanForm::from_record(&record, 14);
        assert_eq!(form.firstname, "Kofi");
        assert_eq!(form.days_on_loan, "14");
    }
}
