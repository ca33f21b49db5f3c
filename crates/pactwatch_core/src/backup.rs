//! JSON backup and restore of the agreements store.
//!
//! # Responsibility
//! - Export every agreement, every field included, into a versioned document.
//! - Restore such a document by upserting records by id.
//!
//! # Invariants
//! - Export then restore reproduces every user field, a `null` `dateExp`
//!   included. The cached `expired` flag is not restored: new records start
//!   unflagged, replaced ones keep their stored flag, and the next expiry
//!   scan settles both.
//! - Restore validates the whole document before the first write; an invalid
//!   or duplicated record aborts the restore with nothing written.

use crate::model::agreement::{Agreement, AgreementId, AgreementValidationError};
use crate::repo::agreement_repo::{AgreementRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const BACKUP_FORMAT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum BackupError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    InvalidRecord {
        id: AgreementId,
        source: AgreementValidationError,
    },
    DuplicateId(AgreementId),
    Repo(RepoError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "backup file `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "malformed backup document: {err}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "backup format version {version} is not supported (expected {BACKUP_FORMAT_VERSION})"
            ),
            Self::InvalidRecord { id, source } => {
                write!(f, "backup record {id} is invalid: {source}")
            }
            Self::DuplicateId(id) => write!(f, "backup contains agreement {id} more than once"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidRecord { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::UnsupportedVersion(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<RepoError> for BackupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub format_version: u32,
    pub exported_on: NaiveDate,
    pub agreements: Vec<Agreement>,
}

impl BackupDocument {
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document and checks its format version.
    pub fn from_json(source: &str) -> Result<Self, BackupError> {
        let document: Self = serde_json::from_str(source)?;
        if document.format_version != BACKUP_FORMAT_VERSION {
            return Err(BackupError::UnsupportedVersion(document.format_version));
        }
        Ok(document)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Captures every stored agreement.
pub fn export_backup<R: AgreementRepository>(
    repo: &R,
    today: NaiveDate,
) -> RepoResult<BackupDocument> {
    let agreements = repo.list_agreements()?;
    info!(
        "event=backup_export module=backup status=ok records={}",
        agreements.len()
    );
    Ok(BackupDocument {
        format_version: BACKUP_FORMAT_VERSION,
        exported_on: today,
        agreements,
    })
}

pub fn write_backup(document: &BackupDocument, path: impl AsRef<Path>) -> Result<(), BackupError> {
    let path = path.as_ref();
    std::fs::write(path, document.to_json()?).map_err(|source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_backup(path: impl AsRef<Path>) -> Result<BackupDocument, BackupError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    BackupDocument::from_json(&source)
}

/// Upserts every agreement of `document` into `repo`.
///
/// Records already present (same id) are replaced; others are inserted.
/// The document's `expired` values are ignored.
pub fn restore_backup<R: AgreementRepository>(
    repo: &R,
    document: &BackupDocument,
) -> Result<RestoreSummary, BackupError> {
    let mut seen = HashSet::new();
    for agreement in &document.agreements {
        agreement
            .validate()
            .map_err(|source| BackupError::InvalidRecord {
                id: agreement.id,
                source,
            })?;
        if !seen.insert(agreement.id) {
            return Err(BackupError::DuplicateId(agreement.id));
        }
    }

    let mut summary = RestoreSummary::default();
    for agreement in &document.agreements {
        let mut record = agreement.clone();
        match repo.get_agreement(agreement.id)? {
            Some(stored) => {
                record.expired = stored.expired;
                repo.update_agreement(&record)?;
                summary.updated += 1;
            }
            None => {
                record.expired = false;
                repo.insert_agreement(&record)?;
                summary.inserted += 1;
            }
        }
    }

    info!(
        "event=backup_restore module=backup status=ok inserted={} updated={}",
        summary.inserted, summary.updated
    );
    Ok(summary)
}
