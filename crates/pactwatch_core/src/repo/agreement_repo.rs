//! Agreement repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed get/list/insert/update/patch/delete over `agreements`.
//! - Map rows to validated `Agreement` values.
//!
//! # Invariants
//! - Read paths reject invalid persisted rows instead of masking them.
//! - One connection lock serializes every statement, so per-key writes
//!   never interleave.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::agreement::{Agreement, AgreementId, AgreementPatch, AgreementValidationError};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const AGREEMENT_SELECT_SQL: &str = "SELECT
    id,
    no,
    date_reg,
    reg_number,
    contr_agent,
    egrpou,
    subject,
    add_ons,
    responsible,
    date_exp,
    annotations,
    expired,
    auto_renew
FROM agreements";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error taxonomy.
///
/// `Validation` is raised before storage is touched, `NotFound` targets an
/// unknown id, and `Db`/`Concurrency` are underlying persistence failures.
#[derive(Debug)]
pub enum RepoError {
    Validation(AgreementValidationError),
    NotFound(AgreementId),
    Db(DbError),
    InvalidData(String),
    Concurrency(String),
}

impl RepoError {
    /// Whether this error is a persistence fault rather than a caller mistake.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Db(_) | Self::InvalidData(_) | Self::Concurrency(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "agreement not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted agreement data: {message}")
            }
            Self::Concurrency(message) => write!(f, "agreement store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Concurrency(_) => None,
        }
    }
}

impl From<AgreementValidationError> for RepoError {
    fn from(value: AgreementValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed agreement store.
///
/// `list_agreements` makes no ordering promise; callers sort for display.
pub trait AgreementRepository {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>>;
    fn list_agreements(&self) -> RepoResult<Vec<Agreement>>;
    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId>;
    /// Replaces every stored field of the record with the same id.
    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()>;
    /// Writes only the fields set in `patch`.
    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()>;
    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()>;
}

impl<R: AgreementRepository + ?Sized> AgreementRepository for &R {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        (**self).get_agreement(id)
    }

    fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        (**self).list_agreements()
    }

    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId> {
        (**self).insert_agreement(agreement)
    }

    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()> {
        (**self).update_agreement(agreement)
    }

    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()> {
        (**self).patch_agreement(id, patch)
    }

    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        (**self).delete_agreement(id)
    }
}

impl<R: AgreementRepository + ?Sized> AgreementRepository for Arc<R> {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        (**self).get_agreement(id)
    }

    fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        (**self).list_agreements()
    }

    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId> {
        (**self).insert_agreement(agreement)
    }

    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()> {
        (**self).update_agreement(agreement)
    }

    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()> {
        (**self).patch_agreement(id, patch)
    }

    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        (**self).delete_agreement(id)
    }
}

/// SQLite-backed agreement repository owning one migrated connection.
pub struct SqliteAgreementRepository {
    conn: Mutex<Connection>,
}

impl SqliteAgreementRepository {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// Rejects connections whose schema is not at the latest migration.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the underlying connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let guard = self.conn.lock().map_err(|_| {
            RepoError::Concurrency("agreements connection lock poisoned".to_string())
        })?;
        f(&guard)
    }
}

impl AgreementRepository for SqliteAgreementRepository {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{AGREEMENT_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id.to_string()])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(parse_agreement_row(row)?));
            }
            Ok(None)
        })
    }

    fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{AGREEMENT_SELECT_SQL} ORDER BY rowid;"))?;
            let mut rows = stmt.query([])?;
            let mut agreements = Vec::new();
            while let Some(row) = rows.next()? {
                agreements.push(parse_agreement_row(row)?);
            }
            Ok(agreements)
        })
    }

    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId> {
        agreement.validate()?;

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO agreements (
                    id,
                    no,
                    date_reg,
                    reg_number,
                    contr_agent,
                    egrpou,
                    subject,
                    add_ons,
                    responsible,
                    date_exp,
                    annotations,
                    expired,
                    auto_renew
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
                params![
                    agreement.id.to_string(),
                    agreement.no,
                    date_to_db(agreement.date_reg),
                    agreement.reg_number.as_str(),
                    agreement.contr_agent.as_str(),
                    agreement.egrpou.as_str(),
                    agreement.subject.as_deref(),
                    agreement.add_ons.as_deref(),
                    agreement.responsible.as_deref(),
                    agreement.date_exp.map(date_to_db),
                    agreement.annotations.as_deref(),
                    bool_to_int(agreement.expired),
                    bool_to_int(agreement.auto_renew),
                ],
            )?;
            Ok(agreement.id)
        })
    }

    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()> {
        agreement.validate()?;

        let changed = self.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE agreements
                 SET
                    no = ?1,
                    date_reg = ?2,
                    reg_number = ?3,
                    contr_agent = ?4,
                    egrpou = ?5,
                    subject = ?6,
                    add_ons = ?7,
                    responsible = ?8,
                    date_exp = ?9,
                    annotations = ?10,
                    expired = ?11,
                    auto_renew = ?12,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?13;",
                params![
                    agreement.no,
                    date_to_db(agreement.date_reg),
                    agreement.reg_number.as_str(),
                    agreement.contr_agent.as_str(),
                    agreement.egrpou.as_str(),
                    agreement.subject.as_deref(),
                    agreement.add_ons.as_deref(),
                    agreement.responsible.as_deref(),
                    agreement.date_exp.map(date_to_db),
                    agreement.annotations.as_deref(),
                    bool_to_int(agreement.expired),
                    bool_to_int(agreement.auto_renew),
                    agreement.id.to_string(),
                ],
            )?)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound(agreement.id));
        }
        Ok(())
    }

    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()> {
        let found = self.with_connection(|conn| {
            if patch.is_empty() {
                let exists = conn
                    .query_row(
                        "SELECT 1 FROM agreements WHERE id = ?1;",
                        [id.to_string()],
                        |_| Ok(()),
                    )
                    .optional()?;
                return Ok(exists.is_some());
            }

            let mut assignments = Vec::new();
            let mut bind_values: Vec<Value> = Vec::new();
            if let Some(expired) = patch.expired {
                assignments.push("expired = ?");
                bind_values.push(Value::Integer(bool_to_int(expired)));
            }
            bind_values.push(Value::Text(id.to_string()));

            let sql = format!(
                "UPDATE agreements
                 SET {}, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?;",
                assignments.join(", ")
            );
            let changed = conn.execute(&sql, params_from_iter(bind_values))?;
            Ok(changed > 0)
        })?;

        if !found {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        let changed = self.with_connection(|conn| {
            Ok(conn.execute(
                "DELETE FROM agreements WHERE id = ?1;",
                [id.to_string()],
            )?)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let latest = latest_version();
    if version != latest {
        return Err(RepoError::InvalidData(format!(
            "connection schema version {version} does not match expected {latest}; open it with open_db"
        )));
    }
    Ok(())
}

fn parse_agreement_row(row: &Row<'_>) -> RepoResult<Agreement> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in agreements.id"))
    })?;

    let date_exp = match row.get::<_, Option<String>>("date_exp")? {
        Some(value) => Some(parse_date(&value, "date_exp")?),
        None => None,
    };

    let agreement = Agreement {
        id,
        no: row.get("no")?,
        date_reg: parse_date(&row.get::<_, String>("date_reg")?, "date_reg")?,
        reg_number: row.get("reg_number")?,
        contr_agent: row.get("contr_agent")?,
        egrpou: row.get("egrpou")?,
        subject: row.get("subject")?,
        add_ons: row.get("add_ons")?,
        responsible: row.get("responsible")?,
        date_exp,
        annotations: row.get("annotations")?,
        expired: parse_flag(row.get("expired")?, "expired")?,
        auto_renew: parse_flag(row.get("auto_renew")?, "auto_renew")?,
    };
    agreement
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("agreement {id}: {err}")))?;
    Ok(agreement)
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in agreements.{column}"))
    })
}

fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in agreements.{column}"
        ))),
    }
}

fn date_to_db(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
