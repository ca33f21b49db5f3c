use chrono::NaiveDate;
use pactwatch_core::db::open_db_in_memory;
use pactwatch_core::{
    export_backup, read_backup, restore_backup, scan_expirations, write_backup, Agreement,
    AgreementDraft, AgreementRepository, BackupDocument, BackupError, RestoreSummary,
    SqliteAgreementRepository,
};
use tempfile::tempdir;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn repo() -> SqliteAgreementRepository {
    SqliteAgreementRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn seeded() -> (SqliteAgreementRepository, Vec<Agreement>) {
    let repo = repo();
    let mut dated = AgreementDraft::new(
        7,
        date(2024, 2, 1),
        "R-7/24",
        "ТОВ Ромашка",
        "12345678",
        date(2025, 2, 1),
    );
    dated.subject = Some("Поставка".to_string());
    dated.annotations = Some("signed twice".to_string());
    let renewing =
        AgreementDraft::new(8, date(2024, 3, 1), "R-8", "Acme", "87654321", date(2025, 1, 1))
            .with_auto_renew();

    let mut records = vec![
        Agreement::new(dated).unwrap(),
        Agreement::new(renewing).unwrap(),
    ];
    records[0].expired = true;
    for record in &records {
        repo.insert_agreement(record).unwrap();
    }
    (repo, records)
}

#[test]
fn export_restore_round_trip_keeps_user_fields() {
    let (source, records) = seeded();
    let document = export_backup(&source, date(2025, 1, 15)).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("agreements.json");
    write_backup(&document, &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"formatVersion\": 1"));
    assert!(raw.contains("\"dateExp\": null"));

    let target = repo();
    let summary = restore_backup(&target, &read_backup(&path).unwrap()).unwrap();
    assert_eq!(
        summary,
        RestoreSummary {
            inserted: 2,
            updated: 0
        }
    );
    let restored = target.list_agreements().unwrap();
    assert!(restored.iter().all(|agreement| !agreement.expired));
    let expected: Vec<_> = records
        .into_iter()
        .map(|mut agreement| {
            agreement.expired = false;
            agreement
        })
        .collect();
    assert_eq!(restored, expected);
}

#[test]
fn restored_flags_are_settled_by_the_next_scan() {
    let (source, records) = seeded();
    let document = export_backup(&source, date(2025, 1, 15)).unwrap();
    let target = repo();
    restore_backup(&target, &document).unwrap();

    let snapshot = target.list_agreements().unwrap();
    let outcome = scan_expirations(&target, &snapshot, date(2025, 1, 15)).unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.expiring_count, 1);
    assert!(target.get_agreement(records[0].id).unwrap().unwrap().expired);
    assert!(!target.get_agreement(records[1].id).unwrap().unwrap().expired);
}

#[test]
fn restore_replaces_existing_records_by_id() {
    let (repo, records) = seeded();
    let mut document = export_backup(&repo, date(2025, 1, 15)).unwrap();
    document.agreements[1].contr_agent = "Acme Holdings".to_string();
    document.agreements[0].expired = false;
    document.agreements[1].expired = true;

    let summary = restore_backup(&repo, &document).unwrap();
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.inserted, 0);

    let stored = repo.get_agreement(records[1].id).unwrap().unwrap();
    assert_eq!(stored.contr_agent, "Acme Holdings");
    assert!(!stored.expired);
    assert!(repo.get_agreement(records[0].id).unwrap().unwrap().expired);
    assert_eq!(repo.list_agreements().unwrap().len(), 2);
}

#[test]
fn unsupported_format_version_is_rejected() {
    let (repo, _) = seeded();
    let mut document = export_backup(&repo, date(2025, 1, 15)).unwrap();
    document.format_version = 99;
    let json = document.to_json().unwrap();

    let err = BackupDocument::from_json(&json).unwrap_err();
    assert!(matches!(err, BackupError::UnsupportedVersion(99)));
}

#[test]
fn malformed_json_is_rejected() {
    let err = BackupDocument::from_json("{\"formatVersion\": 1").unwrap_err();
    assert!(matches!(err, BackupError::Json(_)));
}

#[test]
fn invalid_record_aborts_restore_before_any_write() {
    let (source, _) = seeded();
    let mut document = export_backup(&source, date(2025, 1, 15)).unwrap();
    document.agreements[1].egrpou = "1234".to_string();

    let target = repo();
    let err = restore_backup(&target, &document).unwrap_err();
    assert!(
        matches!(err, BackupError::InvalidRecord { id, .. } if id == document.agreements[1].id)
    );
    assert!(target.list_agreements().unwrap().is_empty());
}

#[test]
fn duplicate_id_aborts_restore_before_any_write() {
    let (source, _) = seeded();
    let mut document = export_backup(&source, date(2025, 1, 15)).unwrap();
    let duplicate = document.agreements[0].clone();
    document.agreements.push(duplicate);

    let target = repo();
    let err = restore_backup(&target, &document).unwrap_err();
    assert!(matches!(err, BackupError::DuplicateId(_)));
    assert!(target.list_agreements().unwrap().is_empty());
}

#[test]
fn missing_backup_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = read_backup(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
