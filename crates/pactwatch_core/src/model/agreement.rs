//! Agreement record, draft input and validation.
//!
//! # Responsibility
//! - Define the persisted agreement shape and its external (JSON) field names.
//! - Turn user submissions (`AgreementDraft`) into validated records.
//!
//! # Invariants
//! - `egrpou` is exactly 8 ASCII digits.
//! - `date_exp.is_none() == auto_renew`.
//! - `expired` is a cached classification; only the expiry scanner rewrites it.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EGRPOU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("valid egrpou regex"));

/// Stable identifier minted when an agreement is created.
pub type AgreementId = Uuid;

/// Validation failures for agreement records and drafts.
///
/// Raised before any storage call so a rejected submission leaves no partial
/// state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementValidationError {
    /// `id` is the nil UUID.
    NilId,
    /// `no` must start at 1.
    ZeroSequenceNumber,
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    /// `egrpou` is not exactly 8 ASCII digits.
    InvalidEgrpou(String),
    /// `auto_renew` is off but no expiration date was given.
    MissingExpirationDate,
    /// `auto_renew` is on but an expiration date is stored.
    UnexpectedExpirationDate,
}

impl AgreementValidationError {
    /// Name of the input field this error should be displayed next to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NilId => "id",
            Self::ZeroSequenceNumber => "no",
            Self::BlankField(field) => field,
            Self::InvalidEgrpou(_) => "egrpou",
            Self::MissingExpirationDate | Self::UnexpectedExpirationDate => "dateExp",
        }
    }
}

impl Display for AgreementValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "agreement id must not be nil"),
            Self::ZeroSequenceNumber => write!(f, "sequence number must be at least 1"),
            Self::BlankField(field) => write!(f, "field `{field}` must not be blank"),
            Self::InvalidEgrpou(value) => write!(
                f,
                "EGRPOU must consist of exactly 8 digits, got {} characters",
                value.chars().count()
            ),
            Self::MissingExpirationDate => {
                write!(f, "expiration date is required unless auto-renewal is enabled")
            }
            Self::UnexpectedExpirationDate => {
                write!(f, "auto-renewed agreements must not carry an expiration date")
            }
        }
    }
}

impl Error for AgreementValidationError {}

/// Returns whether `value` is a well-formed EGRPOU code.
pub fn is_valid_egrpou(value: &str) -> bool {
    EGRPOU_RE.is_match(value)
}

/// Persisted agreement record.
///
/// Field names on the wire match the historical store schema
/// (`dateReg`, `contrAgent`, `autoRenew`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: AgreementId,
    /// User-assigned display sequence number; not unique.
    pub no: u32,
    pub date_reg: NaiveDate,
    pub reg_number: String,
    pub contr_agent: String,
    pub egrpou: String,
    pub subject: Option<String>,
    pub add_ons: Option<String>,
    pub responsible: Option<String>,
    /// `None` exactly when `auto_renew` is set.
    pub date_exp: Option<NaiveDate>,
    pub annotations: Option<String>,
    /// Cached "expired or expiring soon" flag.
    pub expired: bool,
    pub auto_renew: bool,
}

impl Agreement {
    /// Builds a new record from a submission, minting a fresh id.
    ///
    /// The cached `expired` flag starts as `false`; the next scan settles it.
    pub fn new(draft: AgreementDraft) -> Result<Self, AgreementValidationError> {
        Self::from_draft(Uuid::new_v4(), draft, false)
    }

    /// Builds a record with a caller-provided id and cached flag.
    ///
    /// Used by edits, which replace every user field but keep identity and
    /// the scanner-owned `expired` flag.
    pub fn from_draft(
        id: AgreementId,
        draft: AgreementDraft,
        expired: bool,
    ) -> Result<Self, AgreementValidationError> {
        let draft = draft.normalized();
        let agreement = Self {
            id,
            no: draft.no,
            date_reg: draft.date_reg,
            reg_number: draft.reg_number,
            contr_agent: draft.contr_agent,
            egrpou: draft.egrpou,
            subject: draft.subject,
            add_ons: draft.add_ons,
            responsible: draft.responsible,
            date_exp: draft.date_exp,
            annotations: draft.annotations,
            expired,
            auto_renew: draft.auto_renew,
        };
        agreement.validate()?;
        Ok(agreement)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), AgreementValidationError> {
        if self.id.is_nil() {
            return Err(AgreementValidationError::NilId);
        }
        if self.no == 0 {
            return Err(AgreementValidationError::ZeroSequenceNumber);
        }
        if self.reg_number.trim().is_empty() {
            return Err(AgreementValidationError::BlankField("regNumber"));
        }
        if self.contr_agent.trim().is_empty() {
            return Err(AgreementValidationError::BlankField("contrAgent"));
        }
        if !is_valid_egrpou(&self.egrpou) {
            return Err(AgreementValidationError::InvalidEgrpou(self.egrpou.clone()));
        }
        match (self.auto_renew, self.date_exp) {
            (false, None) => Err(AgreementValidationError::MissingExpirationDate),
            (true, Some(_)) => Err(AgreementValidationError::UnexpectedExpirationDate),
            _ => Ok(()),
        }
    }
}

/// User submission for creating or editing an agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementDraft {
    pub no: u32,
    pub date_reg: NaiveDate,
    pub reg_number: String,
    pub contr_agent: String,
    pub egrpou: String,
    pub subject: Option<String>,
    pub add_ons: Option<String>,
    pub responsible: Option<String>,
    pub annotations: Option<String>,
    pub auto_renew: bool,
    /// Ignored when `auto_renew` is set.
    pub date_exp: Option<NaiveDate>,
}

impl AgreementDraft {
    /// Creates a draft with required fields and a fixed expiration date.
    pub fn new(
        no: u32,
        date_reg: NaiveDate,
        reg_number: impl Into<String>,
        contr_agent: impl Into<String>,
        egrpou: impl Into<String>,
        date_exp: NaiveDate,
    ) -> Self {
        Self {
            no,
            date_reg,
            reg_number: reg_number.into(),
            contr_agent: contr_agent.into(),
            egrpou: egrpou.into(),
            subject: None,
            add_ons: None,
            responsible: None,
            annotations: None,
            auto_renew: false,
            date_exp: Some(date_exp),
        }
    }

    /// Switches the draft to auto-renewal, dropping the expiration date.
    pub fn with_auto_renew(mut self) -> Self {
        self.auto_renew = true;
        self.date_exp = None;
        self
    }

    fn normalized(mut self) -> Self {
        if self.auto_renew {
            self.date_exp = None;
        }
        self.subject = non_blank(self.subject);
        self.add_ons = non_blank(self.add_ons);
        self.responsible = non_blank(self.responsible);
        self.annotations = non_blank(self.annotations);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Partial update applied by key.
///
/// Only the fields set to `Some` are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementPatch {
    pub expired: Option<bool>,
}

impl AgreementPatch {
    /// Patch that rewrites only the cached classification flag.
    pub fn expired(flag: bool) -> Self {
        Self {
            expired: Some(flag),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expired.is_none()
    }
}
