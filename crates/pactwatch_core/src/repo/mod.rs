//! Store collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the keyed agreement store consumed by services and the scanner.
//! - Keep SQLite details behind `AgreementRepository`.
//! - Publish post-mutation snapshots to subscribers (`observable`).
//!
//! # Invariants
//! - Write paths call `Agreement::validate()` before touching SQL.
//! - Mutations of unknown ids return `RepoError::NotFound`.

pub mod agreement_repo;
pub mod observable;
