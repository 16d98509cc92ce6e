use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{LoanRecord, MEMBER_TITLES, MEMBER_TYPES};
use crate::session::LoanForm;

/// Username/password fields on the login screen.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) active: LoginField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoginField {
    #[default]
    Username,
    Password,
}

impl LoginForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoginField::Username => self.username.push(ch),
            LoginField::Password => self.password.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoginField::Username => {
                self.username.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    /// Both fields are trimmed and required before the credential store is
    /// consulted.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(anyhow!("Enter username and password."));
        }
        Ok((username.to_string(), password.to_string()))
    }

    /// Render one field. The password is masked.
    pub(crate) fn build_line(&self, field: LoginField) -> Line<'static> {
        let (label, display, is_active) = match field {
            LoginField::Username => (
                "Username",
                self.username.clone(),
                self.active == LoginField::Username,
            ),
            LoginField::Password => (
                "Password",
                "*".repeat(self.password.chars().count()),
                self.active == LoginField::Password,
            ),
        };
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: LoginField) -> usize {
        match field {
            LoginField::Username => self.username.chars().count(),
            LoginField::Password => self.password.chars().count(),
        }
    }
}

/// Every field of the loan form, in tab order: the member column first, then
/// the book column.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LoanField {
    MemberType,
    ReferenceNo,
    Title,
    Firstname,
    Surname,
    Address1,
    Address2,
    Postcode,
    Mobile,
    BookId,
    BookTitle,
    Author,
    DaysOnLoan,
    LateReturnFine,
    SellingPrice,
    DateBorrowed,
    DateDue,
    DateOverdue,
}

pub(crate) const MEMBER_FIELDS: [LoanField; 9] = [
    LoanField::MemberType,
    LoanField::ReferenceNo,
    LoanField::Title,
    LoanField::Firstname,
    LoanField::Surname,
    LoanField::Address1,
    LoanField::Address2,
    LoanField::Postcode,
    LoanField::Mobile,
];

pub(crate) const BOOK_FIELDS: [LoanField; 9] = [
    LoanField::BookId,
    LoanField::BookTitle,
    LoanField::Author,
    LoanField::DaysOnLoan,
    LoanField::LateReturnFine,
    LoanField::SellingPrice,
    LoanField::DateBorrowed,
    LoanField::DateDue,
    LoanField::DateOverdue,
];

/// Width reserved for labels so values line up in each column.
pub(crate) const LABEL_WIDTH: usize = 18;

impl LoanField {
    fn all() -> impl Iterator<Item = LoanField> {
        MEMBER_FIELDS.into_iter().chain(BOOK_FIELDS)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            LoanField::MemberType => "Member Type",
            LoanField::ReferenceNo => "Reference No",
            LoanField::Title => "Title",
            LoanField::Firstname => "Firstname",
            LoanField::Surname => "Surname",
            LoanField::Address1 => "Address 1",
            LoanField::Address2 => "Address 2",
            LoanField::Postcode => "Post Code",
            LoanField::Mobile => "Mobile No",
            LoanField::BookId => "Book ID",
            LoanField::BookTitle => "Book Title",
            LoanField::Author => "Author",
            LoanField::DaysOnLoan => "Days On Loan",
            LoanField::LateReturnFine => "Late Return Fine",
            LoanField::SellingPrice => "Selling Price",
            LoanField::DateBorrowed => "Date Borrowed",
            LoanField::DateDue => "Date Due",
            LoanField::DateOverdue => "Date Over Due",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            LoanField::Firstname | LoanField::BookTitle => "<required>",
            LoanField::MemberType | LoanField::Title => "<←/→ to choose>",
            LoanField::DateBorrowed => "<today>",
            LoanField::DateDue => "<today + days>",
            _ => "",
        }
    }

    /// Preset values cycled with Left/Right, if this field has any.
    fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            LoanField::MemberType => Some(MEMBER_TYPES),
            LoanField::Title => Some(MEMBER_TITLES),
            _ => None,
        }
    }

    /// Column (0 = member, 1 = book) and row inside that column.
    pub(crate) fn position(self) -> (usize, usize) {
        if let Some(row) = MEMBER_FIELDS.iter().position(|f| *f == self) {
            (0, row)
        } else {
            let row = BOOK_FIELDS.iter().position(|f| *f == self).unwrap_or(0);
            (1, row)
        }
    }
}

/// Loan form plus the UI-only bits: focus, the last error, which record (if
/// any) was loaded into it and the id the next save will receive.
#[derive(Clone)]
pub(crate) struct LoanFormState {
    pub(crate) form: LoanForm,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
    pub(crate) loaded_from: Option<i64>,
    pub(crate) next_id: Option<i64>,
}

impl LoanFormState {
    pub(crate) fn new(form: LoanForm) -> Self {
        Self {
            form,
            active: LoanField::MemberType,
            error: None,
            loaded_from: None,
            next_id: None,
        }
    }

    /// Load a stored record for review. Saving afterwards still appends.
    pub(crate) fn load(&mut self, id: i64, form: LoanForm) {
        self.form = form;
        self.loaded_from = Some(id);
        self.error = None;
        self.active = LoanField::MemberType;
    }

    /// Clear the form. The noted next id is kept until the form is reopened.
    pub(crate) fn reset(&mut self, form: LoanForm) {
        let next_id = self.next_id;
        *self = Self::new(form);
        self.next_id = next_id;
    }

    pub(crate) fn next_field(&mut self) {
        self.step_field(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, offset: isize) {
        let fields: Vec<LoanField> = LoanField::all().collect();
        let len = fields.len() as isize;
        let current = fields.iter().position(|f| *f == self.active).unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.active = fields[next];
    }

    pub(crate) fn value(&self, field: LoanField) -> &String {
        let form = &self.form;
        match field {
            LoanField::MemberType => &form.member_type,
            LoanField::ReferenceNo => &form.reference_no,
            LoanField::Title => &form.title,
            LoanField::Firstname => &form.firstname,
            LoanField::Surname => &form.surname,
            LoanField::Address1 => &form.address1,
            LoanField::Address2 => &form.address2,
            LoanField::Postcode => &form.postcode,
            LoanField::Mobile => &form.mobile,
            LoanField::BookId => &form.book_id,
            LoanField::BookTitle => &form.book_title,
            LoanField::Author => &form.author,
            LoanField::DaysOnLoan => &form.days_on_loan,
            LoanField::LateReturnFine => &form.late_return_fine,
            LoanField::SellingPrice => &form.selling_price,
            LoanField::DateBorrowed => &form.date_borrowed,
            LoanField::DateDue => &form.date_due,
            LoanField::DateOverdue => &form.date_overdue,
        }
    }

    fn value_mut(&mut self, field: LoanField) -> &mut String {
        let form = &mut self.form;
        match field {
            LoanField::MemberType => &mut form.member_type,
            LoanField::ReferenceNo => &mut form.reference_no,
            LoanField::Title => &mut form.title,
            LoanField::Firstname => &mut form.firstname,
            LoanField::Surname => &mut form.surname,
            LoanField::Address1 => &mut form.address1,
            LoanField::Address2 => &mut form.address2,
            LoanField::Postcode => &mut form.postcode,
            LoanField::Mobile => &mut form.mobile,
            LoanField::BookId => &mut form.book_id,
            LoanField::BookTitle => &mut form.book_title,
            LoanField::Author => &mut form.author,
            LoanField::DaysOnLoan => &mut form.days_on_loan,
            LoanField::LateReturnFine => &mut form.late_return_fine,
            LoanField::SellingPrice => &mut form.selling_price,
            LoanField::DateBorrowed => &mut form.date_borrowed,
            LoanField::DateDue => &mut form.date_due,
            LoanField::DateOverdue => &mut form.date_overdue,
        }
    }

    /// Append to the active field. Days on loan only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == LoanField::DaysOnLoan && !ch.is_ascii_digit() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Step through the preset values of a choice field. Returns false for
    /// plain text fields.
    pub(crate) fn cycle_choice(&mut self, offset: isize) -> bool {
        let field = self.active;
        let Some(choices) = field.choices() else {
            return false;
        };
        let current = self.value(field).trim().to_string();
        let len = choices.len() as isize;
        let next = match choices.iter().position(|c| *c == current) {
            Some(idx) => (idx as isize + offset).rem_euclid(len),
            None if offset >= 0 => 1 % len,
            None => len - 1,
        };
        *self.value_mut(field) = choices[next as usize].to_string();
        true
    }

    pub(crate) fn build_line(&self, field: LoanField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:<width$}", format!("{}:", field.label()), width = LABEL_WIDTH)),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: LoanField) -> usize {
        self.value(field).chars().count()
    }
}

/// Record awaiting a delete confirmation.
#[derive(Clone)]
pub(crate) struct ConfirmLoanDelete {
    pub(crate) id: i64,
    pub(crate) summary: String,
}

impl From<&LoanRecord> for ConfirmLoanDelete {
    fn from(record: &LoanRecord) -> Self {
        let name = record.member_name();
        let summary = if name.is_empty() {
            record.to_string()
        } else {
            format!("{record} ({name})")
        };
        Self {
            id: record.id,
            summary,
        }
    }
}

/// Editable destination path for a CSV export.
pub(crate) struct ExportPrompt {
    pub(crate) path: String,
}

impl ExportPrompt {
    pub(crate) fn new(default_path: PathBuf) -> Self {
        Self {
            path: default_path.display().to_string(),
        }
    }

    pub(crate) fn target(&self) -> Result<PathBuf> {
        let trimmed = self.path.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Enter a file path for the export."));
        }
        Ok(PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let mut form = LoginForm::default();
        form.username = " alice ".into();
        assert!(form.parse_inputs().is_err());
        form.password = " pw1 ".into();
        assert_eq!(
            form.parse_inputs().unwrap(),
            ("alice".to_string(), "pw1".to_string())
        );
    }

    #[test]
    fn tab_order_wraps_across_columns() {
        let mut state = LoanFormState::new(LoanForm::default());
        for _ in 0..9 {
            state.next_field();
        }
        assert_eq!(state.active, LoanField::BookId);
        state.previous_field();
        assert_eq!(state.active, LoanField::Mobile);

        state.active = LoanField::DateOverdue;
        state.next_field();
        assert_eq!(state.active, LoanField::MemberType);
        state.previous_field();
        assert_eq!(state.active, LoanField::DateOverdue);
    }

    #[test]
    fn reset_clears_fields_but_keeps_next_id() {
        let mut state = LoanFormState::new(LoanForm::default());
        state.next_id = Some(3);
        state.form.firstname = "Ama".into();
        state.load(2, LoanForm::default());
        assert_eq!(state.loaded_from, Some(2));

        state.reset(LoanForm::default());
        assert_eq!(state.loaded_from, None);
        assert_eq!(state.next_id, Some(3));
        assert!(state.form.firstname.is_empty());
    }

    #[test]
    fn days_on_loan_only_accepts_digits() {
        let mut state = LoanFormState::new(LoanForm::default());
        state.active = LoanField::DaysOnLoan;
        state.backspace();
        state.backspace();
        assert!(!state.push_char('x'));
        assert!(state.push_char('7'));
        assert_eq!(state.form.days_on_loan, "7");
    }

    #[test]
    fn choice_fields_cycle_presets() {
        let mut state = LoanFormState::new(LoanForm::default());
        assert!(state.cycle_choice(1));
        assert_eq!(state.form.member_type, "Student");
        assert!(state.cycle_choice(1));
        assert_eq!(state.form.member_type, "Lecturer");
        assert!(state.cycle_choice(-1));
        assert!(state.cycle_choice(-1));
        assert_eq!(state.form.member_type, "");
        assert!(state.cycle_choice(-1));
        assert_eq!(state.form.member_type, "Admin Staff");

        state.active = LoanField::Firstname;
        assert!(!state.cycle_choice(1));
    }

    #[test]
    fn field_positions_match_columns() {
        assert_eq!(LoanField::MemberType.position(), (0, 0));
        assert_eq!(LoanField::Mobile.position(), (0, 8));
        assert_eq!(LoanField::BookId.position(), (1, 0));
        assert_eq!(LoanField::DateOverdue.position(), (1, 8));
    }

    #[test]
    fn delete_summary_names_book_and_member() {
        let mut record = LoanRecord {
            id: 4,
            loan: crate::models::Loan {
                firstname: "Ama".into(),
                surname: "Owusu".into(),
                book_title: "Arrow of God".into(),
                ..Default::default()
            },
            created_at: String::new(),
        };
        let confirm = ConfirmLoanDelete::from(&record);
        assert_eq!(confirm.id, 4);
        assert_eq!(confirm.summary, "#4 Arrow of God (Ama Owusu)");

        record.loan.firstname.clear();
        record.loan.surname.clear();
        assert_eq!(ConfirmLoanDelete::from(&record).summary, "#4 Arrow of God");
    }

    #[test]
    fn export_prompt_rejects_blank_path() {
        let mut prompt = ExportPrompt::new(PathBuf::from("/tmp/out.csv"));
        assert_eq!(prompt.target().unwrap(), PathBuf::from("/tmp/out.csv"));
        prompt.path = "   ".into();
        assert!(prompt.target().is_err());
    }
}
