//! Expiration classification and flag maintenance.
//!
//! # Responsibility
//! - Classify agreements against a rolling expiry window (`classifier`).
//! - Recompute and persist cached `expired` flags in batches (`scanner`).
//!
//! # Invariants
//! - Classification is a pure function of the record and the given day.
//! - `scanner` is the only writer of `Agreement::expired`.

pub mod classifier;
pub mod scanner;
