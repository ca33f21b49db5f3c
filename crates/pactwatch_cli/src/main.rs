//! CLI probe entry point.
//!
//! # Responsibility
//! - Open the configured agreements store and run one session pass.
//! - Print the resulting rows and notifications for quick local checks.
//!
//! Usage: `pactwatch_cli [config.toml]`

use pactwatch_core::db::{open_db, open_db_in_memory};
use pactwatch_core::{
    init_logging_from_config, AgreementSession, CoreConfig, LogNotifier, NotificationQueue,
    Notifier, SqliteAgreementRepository, SystemClock,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("pactwatch_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => CoreConfig::load(&path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config)?;

    let conn = match &config.database_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let repo = SqliteAgreementRepository::try_new(conn).map_err(|err| err.to_string())?;

    let mut session = AgreementSession::new(
        repo,
        NotificationQueue::new(),
        SystemClock,
        config.locale,
    );
    let report = session.start().map_err(|err| err.to_string())?;
    log::info!(
        "event=cli_probe module=cli status=ok snapshots={} flag_writes={}",
        report.snapshots,
        report.flag_writes
    );

    println!("pactwatch_core version={}", pactwatch_core::core_version());
    println!(
        "agreements={} expiring={}",
        session.rows().len(),
        session.expiring_count()
    );
    for row in session.rows() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            if row.expired { "!" } else { " " },
            row.no,
            row.date_reg,
            row.contr_agent,
            row.egrpou,
            row.date_exp
        );
    }
    for notification in session.notifier().drain() {
        LogNotifier.notify(&notification);
        println!(
            "[{}] {}: {}",
            notification.kind.as_str(),
            notification.title,
            notification.message
        );
    }
    Ok(())
}
