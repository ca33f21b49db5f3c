//! Agreement use-case service.
//!
//! # Responsibility
//! - Turn user submissions into validated records and persist them.
//! - Keep callers independent from the concrete store.
//!
//! # Invariants
//! - Validation happens before the store is called; rejected drafts leave
//!   no partial state.
//! - Edits replace every user field but keep the id and the stored
//!   `expired` flag, which only the expiry scanner recomputes.

use crate::model::agreement::{Agreement, AgreementDraft, AgreementId};
use crate::repo::agreement_repo::{AgreementRepository, RepoError, RepoResult};
use log::{info, warn};

/// Use-case facade over an agreement repository.
pub struct AgreementService<R: AgreementRepository> {
    repo: R,
}

impl<R: AgreementRepository> AgreementService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates `draft`, mints a new id and inserts the record.
    pub fn create_agreement(&self, draft: AgreementDraft) -> RepoResult<Agreement> {
        let agreement = Agreement::new(draft).inspect_err(|err| {
            warn!(
                "event=agreement_create module=service status=rejected field={}",
                err.field()
            )
        })?;
        self.repo.insert_agreement(&agreement)?;
        info!(
            "event=agreement_create module=service status=ok id={} auto_renew={}",
            agreement.id, agreement.auto_renew
        );
        Ok(agreement)
    }

    /// Replaces the agreement `id` with the contents of `draft`.
    ///
    /// Returns `RepoError::NotFound` when `id` is unknown.
    pub fn edit_agreement(&self, id: AgreementId, draft: AgreementDraft) -> RepoResult<Agreement> {
        let current = self
            .repo
            .get_agreement(id)?
            .ok_or(RepoError::NotFound(id))?;
        let agreement = Agreement::from_draft(id, draft, current.expired).inspect_err(|err| {
            warn!(
                "event=agreement_edit module=service status=rejected id={id} field={}",
                err.field()
            )
        })?;
        self.repo.update_agreement(&agreement)?;
        info!("event=agreement_edit module=service status=ok id={id}");
        Ok(agreement)
    }

    pub fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        self.repo.delete_agreement(id)?;
        info!("event=agreement_delete module=service status=ok id={id}");
        Ok(())
    }

    pub fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        self.repo.get_agreement(id)
    }

    pub fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        self.repo.list_agreements()
    }
}
