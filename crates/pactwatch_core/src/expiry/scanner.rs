//! Batch recomputation of cached expiry flags.
//!
//! # Responsibility
//! - Reclassify a full agreement snapshot for one day.
//! - Write back only the flags that changed, concurrently, as one unit.
//!
//! # Invariants
//! - An empty snapshot performs no writes and reports zero.
//! - A second scan over a settled snapshot performs no writes.
//! - Failed writes are not rolled back; the first error is returned once
//!   every writer has finished.

use crate::expiry::classifier::effective_flag;
use crate::model::agreement::{Agreement, AgreementId, AgreementPatch};
use crate::repo::agreement_repo::{AgreementRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{error, info};
use std::thread;
use std::time::Instant;

/// Upper bound on concurrent flag writers per scan.
const MAX_FLAG_WRITERS: usize = 8;

/// One queued flag-only write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagUpdate {
    pub id: AgreementId,
    pub expired: bool,
}

/// Classification result for a snapshot, before any write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPlan {
    pub updates: Vec<FlagUpdate>,
    /// Agreements flagged after recomputation, changed or not.
    pub expiring_count: usize,
}

/// Result of one applied scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub expiring_count: usize,
    /// Flags rewritten during this scan.
    pub updated: usize,
}

/// Classifies `agreements` as of `today` without touching storage.
pub fn plan_scan(agreements: &[Agreement], today: NaiveDate) -> ScanPlan {
    let mut plan = ScanPlan::default();
    for agreement in agreements {
        let flag = effective_flag(agreement, today);
        if flag != agreement.expired {
            plan.updates.push(FlagUpdate {
                id: agreement.id,
                expired: flag,
            });
        }
        if flag {
            plan.expiring_count += 1;
        }
    }
    plan
}

/// Reclassifies `agreements` and persists changed flags through `store`.
///
/// Returns the number of agreements currently flagged.
pub fn scan_expirations<R>(
    store: &R,
    agreements: &[Agreement],
    today: NaiveDate,
) -> RepoResult<ScanOutcome>
where
    R: AgreementRepository + Sync,
{
    if agreements.is_empty() {
        return Ok(ScanOutcome::default());
    }

    let started_at = Instant::now();
    let plan = plan_scan(agreements, today);
    let updated = plan.updates.len();

    if let Err(err) = apply_flag_updates(store, &plan.updates) {
        error!(
            "event=expiry_scan module=expiry status=error records={} queued={updated} duration_ms={} error={err}",
            agreements.len(),
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=expiry_scan module=expiry status=ok today={today} records={} expiring={} updated={updated} duration_ms={}",
        agreements.len(),
        plan.expiring_count,
        started_at.elapsed().as_millis()
    );
    Ok(ScanOutcome {
        expiring_count: plan.expiring_count,
        updated,
    })
}

fn apply_flag_updates<R>(store: &R, updates: &[FlagUpdate]) -> RepoResult<()>
where
    R: AgreementRepository + Sync,
{
    if updates.is_empty() {
        return Ok(());
    }

    let chunk_size = updates.len().div_ceil(MAX_FLAG_WRITERS);
    let results: Vec<RepoResult<()>> = thread::scope(|scope| {
        let writers: Vec<_> = updates
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|update| {
                            store.patch_agreement(update.id, &AgreementPatch::expired(update.expired))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        writers
            .into_iter()
            .flat_map(|writer| {
                writer.join().unwrap_or_else(|_| {
                    vec![Err(RepoError::Concurrency(
                        "expiry flag writer panicked".to_string(),
                    ))]
                })
            })
            .collect()
    });

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{plan_scan, FlagUpdate};
    use crate::model::agreement::{Agreement, AgreementDraft};
    use chrono::{NaiveDate, TimeDelta};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn agreement(days_left: i64, expired: bool) -> Agreement {
        let draft = AgreementDraft::new(
            1,
            today(),
            "R-1",
            "Acme",
            "12345678",
            today() + TimeDelta::days(days_left),
        );
        let mut agreement = Agreement::new(draft).unwrap();
        agreement.expired = expired;
        agreement
    }

    #[test]
    fn plan_queues_only_changed_flags_and_counts_all_flagged() {
        let stale_current = agreement(5, false);
        let settled_expiring = agreement(-3, true);
        let stale_expiring = agreement(90, true);
        let settled_current = agreement(31, false);

        let plan = plan_scan(
            &[
                stale_current.clone(),
                settled_expiring,
                stale_expiring.clone(),
                settled_current,
            ],
            today(),
        );

        assert_eq!(plan.expiring_count, 2);
        assert_eq!(
            plan.updates,
            vec![
                FlagUpdate {
                    id: stale_current.id,
                    expired: true
                },
                FlagUpdate {
                    id: stale_expiring.id,
                    expired: false
                },
            ]
        );
    }

    #[test]
    fn plan_counts_stored_flag_when_classifier_has_no_opinion() {
        let mut orphan = agreement(100, true);
        orphan.date_exp = None;

        let plan = plan_scan(&[orphan], today());
        assert!(plan.updates.is_empty());
        assert_eq!(plan.expiring_count, 1);
    }
}
