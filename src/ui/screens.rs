use crate::catalog;
use crate::models::{CatalogEntry, LoanRecord};

/// Rows shown in the main table plus the active search filter.
pub(crate) struct RecordTable {
    pub(crate) records: Vec<LoanRecord>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl RecordTable {
    pub(crate) fn new(records: Vec<LoanRecord>) -> Self {
        Self {
            records,
            filter: None,
            selected: 0,
        }
    }

    /// Swap in freshly fetched rows, keeping the cursor on `focus_id` when it
    /// is still visible and otherwise clamping it into range.
    pub(crate) fn set_records(&mut self, records: Vec<LoanRecord>, focus_id: Option<i64>) {
        self.records = records;
        if let Some(id) = focus_id {
            if let Some(idx) = self.records.iter().position(|r| r.id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current_record(&self) -> Option<&LoanRecord> {
        self.records.get(self.selected)
    }

    pub(crate) fn current_id(&self) -> Option<i64> {
        self.current_record().map(|r| r.id)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let len = self.records.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.records.len().saturating_sub(1);
    }

    pub(crate) fn filter_query(&self) -> &str {
        self.filter.as_deref().unwrap_or("")
    }

    fn ensure_in_bounds(&mut self) {
        if self.records.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.records.len() {
            self.selected = self.records.len() - 1;
        }
    }
}

/// Cursor over the built-in catalog.
pub(crate) struct CatalogPicker {
    pub(crate) selected: usize,
}

impl CatalogPicker {
    /// Start on `current_title` when it is in the catalog.
    pub(crate) fn new(current_title: &str) -> Self {
        let selected = catalog::titles()
            .position(|title| title == current_title.trim())
            .unwrap_or(0);
        Self { selected }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = catalog::entries().len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = catalog::entries().len().saturating_sub(1);
    }

    pub(crate) fn current_entry(&self) -> Option<&'static CatalogEntry> {
        catalog::entries().get(self.selected)
    }
}
