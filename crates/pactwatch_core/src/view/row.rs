//! Display-row projection.

use crate::model::agreement::{Agreement, AgreementId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Locale used for date display and text collation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLocale {
    #[default]
    Ru,
    En,
}

impl DisplayLocale {
    fn date_pattern(self) -> &'static str {
        match self {
            Self::Ru => "%d.%m.%Y",
            Self::En => "%m/%d/%Y",
        }
    }

    /// Label shown in place of an expiration date for auto-renewed agreements.
    pub fn auto_renew_label(self) -> &'static str {
        match self {
            Self::Ru => "Автопролонгация",
            Self::En => "Auto-renewal",
        }
    }

    pub fn format_date(self, date: NaiveDate) -> String {
        date.format(self.date_pattern()).to_string()
    }
}

/// One table row.
///
/// Text fields hold display strings; `date_reg_value`/`date_exp_value` keep
/// the parsed dates for sorting. `egrpou` is the raw stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementRow {
    pub id: AgreementId,
    pub no: String,
    pub date_reg: String,
    pub reg_number: String,
    pub contr_agent: String,
    pub egrpou: String,
    pub subject: String,
    pub add_ons: String,
    pub responsible: String,
    pub date_exp: String,
    pub annotations: String,
    /// Highlight marker passed through from the stored flag.
    pub expired: bool,
    pub date_reg_value: NaiveDate,
    /// `None` for auto-renewed agreements.
    pub date_exp_value: Option<NaiveDate>,
}

impl AgreementRow {
    pub fn project(agreement: &Agreement, locale: DisplayLocale) -> Self {
        let date_exp = match agreement.date_exp {
            Some(date) if !agreement.auto_renew => locale.format_date(date),
            _ => locale.auto_renew_label().to_string(),
        };

        Self {
            id: agreement.id,
            no: agreement.no.to_string(),
            date_reg: locale.format_date(agreement.date_reg),
            reg_number: agreement.reg_number.clone(),
            contr_agent: agreement.contr_agent.clone(),
            egrpou: agreement.egrpou.clone(),
            subject: agreement.subject.clone().unwrap_or_default(),
            add_ons: agreement.add_ons.clone().unwrap_or_default(),
            responsible: agreement.responsible.clone().unwrap_or_default(),
            date_exp,
            annotations: agreement.annotations.clone().unwrap_or_default(),
            expired: agreement.expired,
            date_reg_value: agreement.date_reg,
            date_exp_value: agreement.date_exp,
        }
    }
}
