//! Column sorting for agreement rows.
//!
//! # Invariants
//! - Sorting is stable in both directions: descending reverses the
//!   comparator, never the row order, so equal keys keep input order.
//! - Date columns compare parsed dates; a missing date sorts before any date.

use crate::view::collation::collate;
use crate::view::row::{AgreementRow, DisplayLocale};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    No,
    DateReg,
    RegNumber,
    ContrAgent,
    Egrpou,
    Subject,
    AddOns,
    Responsible,
    DateExp,
    Annotations,
}

impl SortColumn {
    pub const ALL: [SortColumn; 10] = [
        Self::No,
        Self::DateReg,
        Self::RegNumber,
        Self::ContrAgent,
        Self::Egrpou,
        Self::Subject,
        Self::AddOns,
        Self::Responsible,
        Self::DateExp,
        Self::Annotations,
    ];

    /// Stable column key shared with the table surface.
    pub fn key(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::DateReg => "dateReg",
            Self::RegNumber => "regNumber",
            Self::ContrAgent => "contrAgent",
            Self::Egrpou => "egrpou",
            Self::Subject => "subject",
            Self::AddOns => "addOns",
            Self::Responsible => "responsible",
            Self::DateExp => "dateExp",
            Self::Annotations => "annotations",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }

    fn text(self, row: &AgreementRow) -> &str {
        match self {
            Self::No => &row.no,
            Self::DateReg => &row.date_reg,
            Self::RegNumber => &row.reg_number,
            Self::ContrAgent => &row.contr_agent,
            Self::Egrpou => &row.egrpou,
            Self::Subject => &row.subject,
            Self::AddOns => &row.add_ons,
            Self::Responsible => &row.responsible,
            Self::DateExp => &row.date_exp,
            Self::Annotations => &row.annotations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn ascending(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn descending(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

impl Default for SortSpec {
    /// Registration date, oldest first.
    fn default() -> Self {
        Self::ascending(SortColumn::DateReg)
    }
}

/// Ascending comparison of two rows on `column`.
pub fn compare_rows(
    left: &AgreementRow,
    right: &AgreementRow,
    column: SortColumn,
    locale: DisplayLocale,
) -> Ordering {
    match column {
        SortColumn::DateReg => left.date_reg_value.cmp(&right.date_reg_value),
        SortColumn::DateExp => left.date_exp_value.cmp(&right.date_exp_value),
        other => collate(other.text(left), other.text(right), locale),
    }
}

/// Stable in-place sort of `rows` by `spec`.
pub fn sort_rows(rows: &mut [AgreementRow], spec: SortSpec, locale: DisplayLocale) {
    rows.sort_by(|left, right| {
        let ord = compare_rows(left, right, spec.column, locale);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
