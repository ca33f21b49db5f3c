//! Filter/sort pipeline and the stateful list view model.
//!
//! # Responsibility
//! - Turn a store snapshot plus filter text and sort spec into ordered rows.
//! - Hold the table's filter/sort state and recompute on every change.

use crate::model::agreement::Agreement;
use crate::view::row::{AgreementRow, DisplayLocale};
use crate::view::sort::{sort_rows, SortSpec};

/// Projects every record into a display row, preserving input order.
pub fn project_rows(records: &[Agreement], locale: DisplayLocale) -> Vec<AgreementRow> {
    records
        .iter()
        .map(|agreement| AgreementRow::project(agreement, locale))
        .collect()
}

/// Keeps rows whose raw EGRPOU contains `filter_text` (case-sensitive).
///
/// An empty filter keeps every row in its original order.
pub fn filter_rows(rows: Vec<AgreementRow>, filter_text: &str) -> Vec<AgreementRow> {
    if filter_text.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| row.egrpou.contains(filter_text))
        .collect()
}

/// Full pipeline: project, filter, then stable sort.
pub fn build_rows(
    records: &[Agreement],
    filter_text: &str,
    sort: SortSpec,
    locale: DisplayLocale,
) -> Vec<AgreementRow> {
    let mut rows = filter_rows(project_rows(records, locale), filter_text);
    sort_rows(&mut rows, sort, locale);
    rows
}

/// Table state: latest snapshot, filter text, sort spec and derived rows.
#[derive(Debug, Clone)]
pub struct ListViewModel {
    locale: DisplayLocale,
    filter_text: String,
    sort: SortSpec,
    records: Vec<Agreement>,
    rows: Vec<AgreementRow>,
}

impl ListViewModel {
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            locale,
            filter_text: String::new(),
            sort: SortSpec::default(),
            records: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Replaces the record snapshot and recomputes rows.
    pub fn apply_snapshot(&mut self, records: Vec<Agreement>) {
        self.records = records;
        self.recompute();
    }

    pub fn set_filter(&mut self, filter_text: impl Into<String>) {
        self.filter_text = filter_text.into();
        self.recompute();
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.recompute();
    }

    pub fn rows(&self) -> &[AgreementRow] {
        &self.rows
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn locale(&self) -> DisplayLocale {
        self.locale
    }

    fn recompute(&mut self) {
        self.rows = build_rows(&self.records, &self.filter_text, self.sort, self.locale);
    }
}
