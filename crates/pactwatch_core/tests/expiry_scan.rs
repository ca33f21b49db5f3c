use chrono::{NaiveDate, TimeDelta};
use pactwatch_core::db::open_db_in_memory;
use pactwatch_core::{
    scan_expirations, Agreement, AgreementDraft, AgreementId, AgreementPatch, AgreementRepository,
    ObservableStore, RepoError, RepoResult, SqliteAgreementRepository,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn repo() -> SqliteAgreementRepository {
    SqliteAgreementRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn insert_expiring_in(repo: &impl AgreementRepository, days_left: i64) -> Agreement {
    let draft = AgreementDraft::new(
        1,
        today() - TimeDelta::days(365),
        "R-1",
        "Acme",
        "12345678",
        today() + TimeDelta::days(days_left),
    );
    let agreement = Agreement::new(draft).unwrap();
    repo.insert_agreement(&agreement).unwrap();
    agreement
}

fn stored_flag(repo: &impl AgreementRepository, id: AgreementId) -> bool {
    repo.get_agreement(id).unwrap().unwrap().expired
}

#[test]
fn empty_snapshot_is_a_no_op() {
    let store = ObservableStore::new(repo());
    let outcome = scan_expirations(&store, &[], today()).unwrap();

    assert_eq!(outcome.expiring_count, 0);
    assert_eq!(outcome.updated, 0);
    assert_eq!(store.revision(), 0);
}

#[test]
fn scan_persists_changed_flags_and_counts_flagged_agreements() {
    let repo = repo();
    let soon = insert_expiring_in(&repo, 29);
    let boundary = insert_expiring_in(&repo, 30);
    let past = insert_expiring_in(&repo, -10);

    let snapshot = repo.list_agreements().unwrap();
    let outcome = scan_expirations(&repo, &snapshot, today()).unwrap();

    assert_eq!(outcome.expiring_count, 2);
    assert_eq!(outcome.updated, 2);
    assert!(stored_flag(&repo, soon.id));
    assert!(!stored_flag(&repo, boundary.id));
    assert!(stored_flag(&repo, past.id));
}

#[test]
fn second_scan_on_settled_set_writes_nothing() {
    let store = ObservableStore::new(repo());
    insert_expiring_in(&store, 3);
    insert_expiring_in(&store, 90);

    let first = scan_expirations(&store, &store.list_agreements().unwrap(), today()).unwrap();
    assert_eq!(first.updated, 1);
    let revision = store.revision();

    let second = scan_expirations(&store, &store.list_agreements().unwrap(), today()).unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.expiring_count, 1);
    assert_eq!(store.revision(), revision);
}

#[test]
fn count_includes_flags_that_did_not_change() {
    let repo = repo();
    let agreement = insert_expiring_in(&repo, 1);
    repo.patch_agreement(agreement.id, &AgreementPatch::expired(true))
        .unwrap();

    let outcome = scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap();
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.expiring_count, 1);
}

#[test]
fn auto_renewal_clears_a_stale_flag() {
    let repo = repo();
    let mut agreement = insert_expiring_in(&repo, -1);
    scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap();
    assert!(stored_flag(&repo, agreement.id));

    agreement.expired = true;
    agreement.auto_renew = true;
    agreement.date_exp = None;
    repo.update_agreement(&agreement).unwrap();

    let outcome = scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap();
    assert_eq!(outcome.expiring_count, 0);
    assert!(!stored_flag(&repo, agreement.id));
}

#[test]
fn flags_roll_forward_with_the_scan_day() {
    let repo = repo();
    let agreement = insert_expiring_in(&repo, 40);

    scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap();
    assert!(!stored_flag(&repo, agreement.id));

    let later = today() + TimeDelta::days(11);
    let outcome = scan_expirations(&repo, &repo.list_agreements().unwrap(), later).unwrap();
    assert_eq!(outcome.updated, 1);
    assert!(stored_flag(&repo, agreement.id));
}

#[test]
fn overlapping_scans_converge_without_corruption() {
    let repo = repo();
    let ids: Vec<_> = (0..20)
        .map(|i| insert_expiring_in(&repo, i * 3 - 10).id)
        .collect();
    let snapshot = repo.list_agreements().unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| scan_expirations(&repo, &snapshot, today())))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for result in results {
        assert_eq!(result.unwrap().expiring_count, 14);
    }
    let settled = scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap();
    assert_eq!(settled.updated, 0);
    assert_eq!(settled.expiring_count, 14);
    assert_eq!(repo.list_agreements().unwrap().len(), ids.len());
}

struct FailingPatchRepo {
    inner: SqliteAgreementRepository,
    fail_on: AgreementId,
}

impl AgreementRepository for FailingPatchRepo {
    fn get_agreement(&self, id: AgreementId) -> RepoResult<Option<Agreement>> {
        self.inner.get_agreement(id)
    }

    fn list_agreements(&self) -> RepoResult<Vec<Agreement>> {
        self.inner.list_agreements()
    }

    fn insert_agreement(&self, agreement: &Agreement) -> RepoResult<AgreementId> {
        self.inner.insert_agreement(agreement)
    }

    fn update_agreement(&self, agreement: &Agreement) -> RepoResult<()> {
        self.inner.update_agreement(agreement)
    }

    fn patch_agreement(&self, id: AgreementId, patch: &AgreementPatch) -> RepoResult<()> {
        if id == self.fail_on {
            return Err(RepoError::Concurrency("injected write failure".to_string()));
        }
        self.inner.patch_agreement(id, patch)
    }

    fn delete_agreement(&self, id: AgreementId) -> RepoResult<()> {
        self.inner.delete_agreement(id)
    }
}

#[test]
fn failed_write_propagates_without_rolling_back_siblings() {
    let inner = repo();
    let doomed = insert_expiring_in(&inner, 2);
    let sibling = insert_expiring_in(&inner, 5);
    let repo = FailingPatchRepo {
        inner,
        fail_on: doomed.id,
    };

    let err = scan_expirations(&repo, &repo.list_agreements().unwrap(), today()).unwrap_err();
    assert!(err.is_store_failure());
    assert!(matches!(err, RepoError::Concurrency(message) if message.contains("injected")));
    assert!(stored_flag(&repo.inner, sibling.id));
    assert!(!stored_flag(&repo.inner, doomed.id));
}
