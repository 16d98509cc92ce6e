use std::fs;
use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use log::{error, info, warn};
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::catalog;
use crate::db::{authenticate, register_user};
use crate::error::Error as LoanError;
use crate::export::default_export_path;
use crate::session::LoanDesk;

use super::forms::{
    ConfirmLoanDelete, ExportPrompt, LoanField, LoanFormState, LoginField, LoginForm, BOOK_FIELDS,
    LABEL_WIDTH, MEMBER_FIELDS,
};
use super::helpers::{centered_rect, clip, surface_error};
use super::screens::{CatalogPicker, RecordTable};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Title block above the record table.
const HEADER_HEIGHT: u16 = 4;

/// Top-level screens. The login screen gates everything else.
enum Screen {
    Login(LoginForm),
    Loans(RecordTable),
}

/// Overlays and input modes on top of the current screen.
enum Mode {
    Normal,
    EditingLoan,
    PickingBook(CatalogPicker),
    ConfirmDelete(ConfirmLoanDelete),
    ConfirmExit,
    Exporting(ExportPrompt),
    Searching(SearchState),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

enum LoginAction {
    SignIn,
    SignUp,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    users: Connection,
    desk: LoanDesk,
    export_dir: PathBuf,
    username: Option<String>,
    screen: Screen,
    mode: Mode,
    loan_form: LoanFormState,
    status: Option<StatusMessage>,
    last_export: Option<PathBuf>,
}

impl App {
    /// `users` is the credential store; `desk` wraps the loan store.
    pub fn new(users: Connection, desk: LoanDesk, export_dir: PathBuf) -> Self {
        let loan_form = LoanFormState::new(desk.blank_form());
        Self {
            users,
            desk,
            export_dir,
            username: None,
            screen: Screen::Login(LoginForm::default()),
            mode: Mode::Normal,
            loan_form,
            status: None,
            last_export: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingLoan => self.handle_loan_form(code),
            Mode::PickingBook(picker) => self.handle_pick_book(code, picker),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmExit => self.handle_confirm_exit(code, &mut exit),
            Mode::Exporting(prompt) => self.handle_export_prompt(code, prompt),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        Ok(exit)
    }

    /// Ctrl-R: clear the loan form back to its defaults.
    pub(crate) fn handle_ctrl_r(&mut self) {
        if matches!(self.screen, Screen::Loans(_))
            && matches!(self.mode, Mode::Normal | Mode::EditingLoan)
        {
            self.loan_form.reset(self.desk.blank_form());
            self.set_status("Form fields reset.", StatusKind::Info);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Login(ref mut form) => {
                let mut action = None;
                match code {
                    KeyCode::Esc => *exit = true,
                    KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                        form.toggle_field()
                    }
                    KeyCode::Backspace => form.backspace(),
                    KeyCode::Enter => action = Some(LoginAction::SignIn),
                    KeyCode::F(2) => action = Some(LoginAction::SignUp),
                    KeyCode::Char(ch) => {
                        if form.push_char(ch) {
                            form.error = None;
                        }
                    }
                    _ => {}
                }

                match action {
                    Some(LoginAction::SignIn) => self.sign_in()?,
                    Some(LoginAction::SignUp) => self.sign_up(),
                    None => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Loans(_) => Ok(self.handle_loans_key(code)),
        }
    }

    fn handle_loans_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Mode::ConfirmExit,
            KeyCode::Up => self.with_table(|t| t.move_selection(-1)),
            KeyCode::Down => self.with_table(|t| t.move_selection(1)),
            KeyCode::PageUp => self.with_table(|t| t.move_selection(-10)),
            KeyCode::PageDown => self.with_table(|t| t.move_selection(10)),
            KeyCode::Home => self.with_table(|t| t.select_first()),
            KeyCode::End => self.with_table(|t| t.select_last()),
            KeyCode::Enter => match self.selected_id() {
                Some(id) => return self.open_record(id),
                None => self.set_status("No record selected.", StatusKind::Error),
            },
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                return self.open_form();
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                let confirm = self
                    .table()
                    .and_then(|t| t.current_record())
                    .map(ConfirmLoanDelete::from);
                match confirm {
                    Some(confirm) => {
                        self.clear_status();
                        return Mode::ConfirmDelete(confirm);
                    }
                    None => self.set_status(LoanError::NoSelection.to_string(), StatusKind::Error),
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                let query = self
                    .table()
                    .map(|t| t.filter_query().to_string())
                    .unwrap_or_default();
                return Mode::Searching(SearchState { query });
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.apply_filter(None) {
                    self.set_status("Records reloaded.", StatusKind::Info);
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => return self.start_export(),
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_last_export(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_loan_form(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Form hidden; entered values are kept.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => self.loan_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.loan_form.previous_field(),
            KeyCode::Left => {
                self.loan_form.cycle_choice(-1);
            }
            KeyCode::Right => {
                self.loan_form.cycle_choice(1);
            }
            KeyCode::Backspace => {
                self.loan_form.backspace();
                self.loan_form.error = None;
            }
            KeyCode::F(2) => {
                let picker = CatalogPicker::new(&self.loan_form.form.book_title);
                return Mode::PickingBook(picker);
            }
            KeyCode::Enter => return self.save_loan(),
            KeyCode::Char(ch) => {
                if self.loan_form.push_char(ch) {
                    self.loan_form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingLoan
    }

    fn handle_pick_book(&mut self, code: KeyCode, mut picker: CatalogPicker) -> Mode {
        match code {
            KeyCode::Esc => return Mode::EditingLoan,
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                if let Some(entry) = picker.current_entry() {
                    let today = Local::now().date_naive();
                    self.desk
                        .select_catalog(entry.title, &mut self.loan_form.form, today);
                    self.loan_form.active = LoanField::BookTitle;
                    self.loan_form.error = None;
                    self.set_status(
                        format!("Filled book details for {}.", entry.title),
                        StatusKind::Info,
                    );
                }
                return Mode::EditingLoan;
            }
            _ => {}
        }
        Mode::PickingBook(picker)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmLoanDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_delete(&confirm);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_exit(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Mode::Normal,
            _ => Mode::ConfirmExit,
        }
    }

    fn handle_export_prompt(&mut self, code: KeyCode, mut prompt: ExportPrompt) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Export cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                prompt.path.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => prompt.path.push(ch),
            KeyCode::Enter => {
                return match self.perform_export(&prompt) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Mode::Exporting(prompt)
                    }
                };
            }
            _ => {}
        }
        Mode::Exporting(prompt)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.apply_filter(None);
                self.clear_status();
                return Mode::Normal;
            }
            KeyCode::Enter => {
                let shown = self.table().map_or(0, |t| t.records.len());
                self.set_status(format!("{shown} matching records."), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Up => {
                self.with_table(|t| t.move_selection(-1));
                return Mode::Searching(state);
            }
            KeyCode::Down => {
                self.with_table(|t| t.move_selection(1));
                return Mode::Searching(state);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Mode::Searching(state),
        }

        let filter = if state.query.trim().is_empty() {
            None
        } else {
            Some(state.query.clone())
        };
        self.apply_filter(filter);
        Mode::Searching(state)
    }

    fn sign_in(&mut self) -> Result<()> {
        let Screen::Login(form) = &mut self.screen else {
            return Ok(());
        };
        let (username, password) = match form.parse_inputs() {
            Ok(inputs) => inputs,
            Err(err) => {
                form.error = Some(surface_error(&err));
                return Ok(());
            }
        };

        match authenticate(&self.users, &username, &password) {
            Ok(true) => {
                info!("user '{username}' signed in");
                self.enter_loans(username)?;
            }
            Ok(false) => {
                warn!("failed login attempt for '{username}'");
                form.password.clear();
                form.error = Some("Invalid username or password.".to_string());
            }
            Err(err) => {
                error!("credential lookup failed: {err}");
                form.error = Some(err.to_string());
            }
        }
        Ok(())
    }

    fn sign_up(&mut self) {
        let Screen::Login(form) = &mut self.screen else {
            return;
        };
        let (username, password) = match form.parse_inputs() {
            Ok(inputs) => inputs,
            Err(err) => {
                form.error = Some(surface_error(&err));
                return;
            }
        };

        match register_user(&self.users, &username, &password) {
            Ok(()) => {
                info!("registered user '{username}'");
                form.error = None;
                form.password.clear();
                self.set_status(
                    "Sign up successful! You can now log in.",
                    StatusKind::Info,
                );
            }
            Err(err) => {
                if !err.is_user_error() {
                    error!("sign up failed: {err}");
                }
                form.error = Some(err.to_string());
            }
        }
    }

    fn enter_loans(&mut self, username: String) -> Result<()> {
        let records = self
            .desk
            .records()
            .context("failed to load loan records")?;
        let count = records.len();
        self.screen = Screen::Loans(RecordTable::new(records));
        self.set_status(
            format!("Welcome, {username}. {count} records loaded."),
            StatusKind::Info,
        );
        self.username = Some(username);
        Ok(())
    }

    /// Show the form, noting the id the next save will receive.
    fn open_form(&mut self) -> Mode {
        match self.desk.next_id() {
            Ok(id) => {
                self.loan_form.next_id = Some(id);
                self.clear_status();
                Mode::EditingLoan
            }
            Err(err) => {
                self.report_error(err);
                Mode::Normal
            }
        }
    }

    fn open_record(&mut self, id: i64) -> Mode {
        let mut form = self.desk.blank_form();
        match self.desk.load_into_form(id, &mut form) {
            Ok(()) => {
                self.loan_form.load(id, form);
                self.set_status(
                    format!("Loaded record {id} into the form; saving creates a new record."),
                    StatusKind::Info,
                );
                Mode::EditingLoan
            }
            Err(err) => {
                self.report_error(err);
                Mode::Normal
            }
        }
    }

    fn save_loan(&mut self) -> Mode {
        match self.desk.save(&mut self.loan_form.form) {
            Ok(id) => {
                self.loan_form.reset(self.desk.blank_form());
                self.refresh_records(Some(id));
                self.set_status(format!("Record saved (ID {id})."), StatusKind::Info);
                Mode::Normal
            }
            Err(err) => {
                if !err.is_user_error() {
                    error!("saving loan failed: {err}");
                }
                let message = err.to_string();
                self.loan_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Mode::EditingLoan
            }
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmLoanDelete) {
        match self.desk.delete_selected(Some(confirm.id)) {
            Ok(id) => {
                // Ids above the deleted one just moved down.
                self.loan_form.loaded_from = match self.loan_form.loaded_from {
                    Some(loaded) if loaded == id => None,
                    Some(loaded) if loaded > id => Some(loaded - 1),
                    other => other,
                };
                self.refresh_records(None);
                self.set_status(
                    format!("Deleted record {id}; later records renumbered."),
                    StatusKind::Info,
                );
            }
            Err(err) => self.report_error(err),
        }
    }

    fn start_export(&mut self) -> Mode {
        match self.desk.count() {
            Ok(0) => {
                self.set_status(LoanError::NoData.to_string(), StatusKind::Error);
                Mode::Normal
            }
            Ok(_) => {
                self.clear_status();
                let path = default_export_path(&self.export_dir, Local::now().naive_local());
                Mode::Exporting(ExportPrompt::new(path))
            }
            Err(err) => {
                self.report_error(err);
                Mode::Normal
            }
        }
    }

    fn perform_export(&mut self, prompt: &ExportPrompt) -> Result<()> {
        let path = prompt.target()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let rows = self.desk.export(&path).map_err(|err| {
            if !err.is_user_error() {
                error!("export to {} failed: {err}", path.display());
            }
            err
        })?;
        self.set_status(
            format!(
                "Exported {rows} records to {}. Press 'o' to open it.",
                path.display()
            ),
            StatusKind::Info,
        );
        self.last_export = Some(path);
        Ok(())
    }

    fn open_last_export(&mut self) {
        match &self.last_export {
            Some(path) => {
                if let Err(err) = open_path(path) {
                    self.set_status(format!("Failed to open export: {err}"), StatusKind::Error);
                } else {
                    let message = format!("Opened {}.", path.display());
                    self.set_status(message, StatusKind::Info);
                }
            }
            None => self.set_status("Nothing exported yet.", StatusKind::Error),
        }
    }

    /// Set (or clear) the table filter and re-query. Returns false when the
    /// query failed; the error is already in the footer.
    fn apply_filter(&mut self, filter: Option<String>) -> bool {
        self.with_table(|t| t.filter = filter);
        self.refresh_records(None)
    }

    /// Re-run the current search against the store.
    fn refresh_records(&mut self, focus_id: Option<i64>) -> bool {
        let Screen::Loans(table) = &mut self.screen else {
            return true;
        };
        match self.desk.search(table.filter_query()) {
            Ok(records) => {
                table.set_records(records, focus_id);
                true
            }
            Err(err) => {
                self.report_error(err);
                false
            }
        }
    }

    fn report_error(&mut self, err: LoanError) {
        if !err.is_user_error() {
            error!("{err}");
        }
        self.set_status(err.to_string(), StatusKind::Error);
    }

    fn table(&self) -> Option<&RecordTable> {
        match &self.screen {
            Screen::Loans(table) => Some(table),
            Screen::Login(_) => None,
        }
    }

    fn with_table(&mut self, f: impl FnOnce(&mut RecordTable)) {
        if let Screen::Loans(table) = &mut self.screen {
            f(table);
        }
    }

    fn selected_id(&self) -> Option<i64> {
        self.table().and_then(|t| t.current_id())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Login(form) => self.draw_login(frame, content_area, form),
            Screen::Loans(table) => self.draw_loans(frame, content_area, table),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::EditingLoan => self.draw_loan_form(frame, area, true),
            Mode::PickingBook(picker) => {
                self.draw_loan_form(frame, area, false);
                self.draw_catalog_picker(frame, area, picker);
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmExit => self.draw_confirm_exit(frame, area),
            Mode::Exporting(prompt) => self.draw_export_prompt(frame, area, prompt),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let popup_area = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Library Management System")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(LoginField::Username),
            form.build_line(LoginField::Password),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to log in • F2 to sign up • Esc to quit",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            LoginField::Username => ("Username: ".len() as u16, 0),
            LoginField::Password => ("Password: ".len() as u16, 1),
        };
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_loans(&self, frame: &mut Frame, area: Rect, table: &RecordTable) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(area);

        let user = self.username.as_deref().unwrap_or("?");
        let mut summary = format!(
            "Signed in as {user}  •  {} records shown",
            table.records.len()
        );
        if let Some(filter) = &table.filter {
            summary.push_str(&format!("  •  Search: \"{filter}\""));
        }
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "Library Management System",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(summary),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Loans"));
        frame.render_widget(header, chunks[0]);

        if table.records.is_empty() {
            let text = match &table.filter {
                Some(filter) => format!("No records match \"{filter}\"."),
                None => "No loan records yet. Press '+' to add one.".to_string(),
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let header_row = Row::new([
            "ID",
            "Member Type",
            "Ref No",
            "Name",
            "Mobile",
            "Book Title",
            "Author",
            "Date Borrowed",
            "Date Due",
            "Days",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = table
            .records
            .iter()
            .map(|record| {
                let loan = &record.loan;
                Row::new(vec![
                    record.id.to_string(),
                    clip(&loan.member_type, 12),
                    clip(&loan.reference_no, 10),
                    clip(&record.member_name(), 24),
                    clip(&loan.mobile, 12),
                    clip(&loan.book_title, 36),
                    clip(&loan.author, 24),
                    loan.date_borrowed.clone(),
                    loan.date_due.clone(),
                    loan.days_on_loan.to_string(),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(13),
            Constraint::Length(10),
            Constraint::Length(4),
        ];

        let widget = Table::new(rows, widths)
            .header(header_row)
            .block(Block::default().borders(Borders::ALL))
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(table.selected));
        frame.render_stateful_widget(widget, chunks[1], &mut state);
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, show_cursor: bool) {
        let popup_area = centered_rect(90, 70, area);
        frame.render_widget(Clear, popup_area);

        let title = match self.loan_form.loaded_from {
            Some(id) => format!("Loan Form (loaded from record {id})"),
            None => match self.loan_form.next_id {
                Some(id) => format!("Loan Form (new record {id})"),
                None => "Loan Form".to_string(),
            },
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        let member_lines: Vec<Line> = MEMBER_FIELDS
            .iter()
            .map(|field| self.loan_form.build_line(*field))
            .collect();
        let book_lines: Vec<Line> = BOOK_FIELDS
            .iter()
            .map(|field| self.loan_form.build_line(*field))
            .collect();
        frame.render_widget(Paragraph::new(member_lines), columns[0]);
        frame.render_widget(Paragraph::new(book_lines), columns[1]);

        let hint = match &self.loan_form.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(
                "Enter to save • Tab/↑↓ to move • ←/→ to choose • F2 for catalog • Ctrl-R to reset • Esc to hide",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(hint).wrap(Wrap { trim: true }), rows[1]);

        if show_cursor {
            let (column, row) = self.loan_form.active.position();
            let rect = columns[column];
            let offset = (LABEL_WIDTH + self.loan_form.value_len(self.loan_form.active)) as u16;
            let cursor_x = (rect.x + offset).min(rect.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, rect.y + row as u16));
        }
    }

    fn draw_catalog_picker(&self, frame: &mut Frame, area: Rect, picker: &CatalogPicker) {
        let popup_area = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Books (Enter to auto-fill)")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = catalog::entries()
            .iter()
            .map(|entry| ListItem::new(format!("{}  ({})", entry.title, entry.author)))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmLoanDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete record {}?", confirm.summary)),
            Line::from("Every later record moves up one ID."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_exit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(40, 20, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Exit").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Are you sure you want to quit?"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to quit or N / Esc to stay.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn draw_export_prompt(&self, frame: &mut Frame, area: Rect, prompt: &ExportPrompt) {
        let popup_area = centered_rect(80, 20, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Export CSV").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("File: {}", prompt.path)),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to export • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_x = inner.x + "File: ".len() as u16 + prompt.path.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (Screen::Login(_), _) => &[
                ("[Tab]", " Switch field   "),
                ("[Enter]", " Log in   "),
                ("[F2]", " Sign up   "),
                ("[Esc]", " Quit"),
            ],
            (_, Mode::EditingLoan) => &[
                ("[Enter]", " Save   "),
                ("[F2]", " Catalog   "),
                ("[Ctrl-R]", " Reset   "),
                ("[Esc]", " Hide form"),
            ],
            (_, Mode::PickingBook(_)) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Auto-fill   "),
                ("[Esc]", " Back"),
            ],
            (_, Mode::Searching(_)) => &[
                ("[Type]", " Filter   "),
                ("[Enter]", " Keep results   "),
                ("[Esc]", " Clear search"),
            ],
            (_, Mode::ConfirmDelete(_)) | (_, Mode::ConfirmExit) => {
                &[("[Y]", " Confirm   "), ("[N/Esc]", " Cancel")]
            }
            (_, Mode::Exporting(_)) => &[("[Enter]", " Export   "), ("[Esc]", " Cancel")],
            (Screen::Loans(_), Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Load   "),
                ("[+]", " Form   "),
                ("[-]", " Delete   "),
                ("[f]", " Search   "),
                ("[r]", " Reload   "),
                ("[x]", " Export   "),
                ("[o]", " Open export   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }
}
