//! Core domain logic for PactWatch, the agreements expiry tracker.
//! This crate is the single source of truth for agreement invariants.

pub mod backup;
pub mod clock;
pub mod config;
pub mod db;
pub mod expiry;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod session;
pub mod view;

pub use backup::{
    export_backup, read_backup, restore_backup, write_backup, BackupDocument, BackupError,
    RestoreSummary,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use expiry::classifier::{classify, EXPIRING_WINDOW_DAYS};
pub use expiry::scanner::{scan_expirations, ScanOutcome};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::agreement::{
    Agreement, AgreementDraft, AgreementId, AgreementPatch, AgreementValidationError,
};
pub use notify::gate::ExpiryAlertGate;
pub use notify::text::Notice;
pub use notify::{LogNotifier, Notification, NotificationKind, NotificationQueue, Notifier};
pub use repo::agreement_repo::{
    AgreementRepository, RepoError, RepoResult, SqliteAgreementRepository,
};
pub use repo::observable::{ObservableStore, Subscription};
pub use service::agreement_service::AgreementService;
pub use session::{AgreementSession, PumpReport};
pub use view::list_view::{build_rows, ListViewModel};
pub use view::row::{AgreementRow, DisplayLocale};
pub use view::sort::{SortColumn, SortDirection, SortSpec};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
