//! Session runtime: the reactive loop between store, scanner and view.
//!
//! # Responsibility
//! - Subscribe to the store feed and react to each snapshot by rescanning
//!   expiry flags, feeding the alert gate and recomputing list rows.
//! - Expose user-facing mutations with success/failure notifications.
//!
//! # Invariants
//! - Snapshots are consumed only through `pump`/`start`; a mutation never
//!   updates rows synchronously.
//! - `pump` returns once the feed is quiet. Each scan publishes at most one
//!   snapshot; a settled snapshot produces no flag writes and therefore no
//!   further snapshots.
//! - The alert gate lives and dies with the session.

use crate::clock::Clock;
use crate::expiry::scanner::scan_expirations;
use crate::model::agreement::{Agreement, AgreementDraft, AgreementId};
use crate::notify::gate::ExpiryAlertGate;
use crate::notify::text::Notice;
use crate::notify::Notifier;
use crate::repo::agreement_repo::{AgreementRepository, RepoError, RepoResult};
use crate::repo::observable::{ObservableStore, Subscription};
use crate::service::agreement_service::AgreementService;
use crate::view::list_view::ListViewModel;
use crate::view::row::{AgreementRow, DisplayLocale};
use crate::view::sort::SortSpec;
use log::debug;

/// Work done by one `pump`/`start` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Snapshots processed after coalescing.
    pub snapshots: usize,
    /// Expiry flags rewritten across those snapshots.
    pub flag_writes: usize,
}

pub struct AgreementSession<R, N, C>
where
    R: AgreementRepository + Sync,
    N: Notifier,
    C: Clock,
{
    store: ObservableStore<R>,
    subscription: Subscription,
    gate: ExpiryAlertGate,
    view: ListViewModel,
    notifier: N,
    clock: C,
    locale: DisplayLocale,
    expiring_count: usize,
}

impl<R, N, C> AgreementSession<R, N, C>
where
    R: AgreementRepository + Sync,
    N: Notifier,
    C: Clock,
{
    /// Opens a session over `repo` with a fresh alert gate.
    pub fn new(repo: R, notifier: N, clock: C, locale: DisplayLocale) -> Self {
        let store = ObservableStore::new(repo);
        let subscription = store.subscribe();
        Self {
            store,
            subscription,
            gate: ExpiryAlertGate::new(locale),
            view: ListViewModel::new(locale),
            notifier,
            clock,
            locale,
            expiring_count: 0,
        }
    }

    /// Loads the current store contents, then drains the feed.
    pub fn start(&mut self) -> RepoResult<PumpReport> {
        let snapshot = self.store.list_agreements().inspect_err(|err| {
            self.notify(Notice::LoadFailed(err.to_string()));
        })?;
        let mut report = PumpReport::default();
        self.process_snapshot(snapshot, &mut report)?;
        let drained = self.pump()?;
        report.snapshots += drained.snapshots;
        report.flag_writes += drained.flag_writes;
        Ok(report)
    }

    /// Processes queued store snapshots until the feed is quiet.
    ///
    /// A scan failure is reported once through the notifier and returned;
    /// nothing is retried.
    pub fn pump(&mut self) -> RepoResult<PumpReport> {
        let mut report = PumpReport::default();
        while let Some(snapshot) = self.subscription.latest() {
            self.process_snapshot(snapshot, &mut report)?;
        }
        Ok(report)
    }

    fn process_snapshot(
        &mut self,
        snapshot: Vec<Agreement>,
        report: &mut PumpReport,
    ) -> RepoResult<()> {
        let today = self.clock.today();
        let outcome = self
            .store
            .batch(|store| scan_expirations(store, &snapshot, today));
        self.view.apply_snapshot(snapshot);
        report.snapshots += 1;

        match outcome {
            Ok(outcome) => {
                report.flag_writes += outcome.updated;
                self.expiring_count = outcome.expiring_count;
                if let Some(alert) = self.gate.observe(outcome.expiring_count) {
                    self.notifier.notify(&alert);
                }
                debug!(
                    "event=session_snapshot module=session status=ok rows={} expiring={} updated={}",
                    self.view.rows().len(),
                    outcome.expiring_count,
                    outcome.updated
                );
                Ok(())
            }
            Err(err) => {
                self.notify(Notice::ScanFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Creates an agreement from a form submission.
    ///
    /// Validation errors are returned without a notification so the caller
    /// can show them next to the offending field.
    pub fn submit_new(&self, draft: AgreementDraft) -> RepoResult<Agreement> {
        let result = self.service().create_agreement(draft);
        self.report(&result, |_| Notice::Created, Notice::CreateFailed);
        result
    }

    /// Replaces agreement `id` with a form submission.
    pub fn submit_edit(&self, id: AgreementId, draft: AgreementDraft) -> RepoResult<Agreement> {
        let result = self.service().edit_agreement(id, draft);
        self.report(
            &result,
            |agreement| Notice::Edited { no: agreement.no },
            Notice::EditFailed,
        );
        result
    }

    /// Deletes agreement `id`.
    pub fn remove(&self, id: AgreementId) -> RepoResult<()> {
        let result = self.service().delete_agreement(id);
        self.report(&result, |_| Notice::Deleted, Notice::DeleteFailed);
        result
    }

    pub fn set_filter(&mut self, filter_text: impl Into<String>) {
        self.view.set_filter(filter_text);
    }

    pub fn clear_filter(&mut self) {
        self.view.clear_filter();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.view.set_sort(sort);
    }

    pub fn rows(&self) -> &[AgreementRow] {
        self.view.rows()
    }

    /// Agreements flagged by the most recent successful scan.
    pub fn expiring_count(&self) -> usize {
        self.expiring_count
    }

    pub fn alert_fired(&self) -> bool {
        self.gate.has_fired()
    }

    pub fn store(&self) -> &ObservableStore<R> {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn service(&self) -> AgreementService<&ObservableStore<R>> {
        AgreementService::new(&self.store)
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notify(&notice.to_notification(self.locale));
    }

    fn report<T>(
        &self,
        result: &RepoResult<T>,
        success: impl FnOnce(&T) -> Notice,
        failure: impl FnOnce(String) -> Notice,
    ) {
        match result {
            Ok(value) => self.notify(success(value)),
            Err(RepoError::Validation(_)) => {}
            Err(err) => self.notify(failure(err.to_string())),
        }
    }
}
