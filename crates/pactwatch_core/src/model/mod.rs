//! Agreement domain model.
//!
//! # Responsibility
//! - Define the canonical agreement record and its form-input shape.
//! - Own the record-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every agreement is identified by a stable, non-nil `AgreementId`.
//! - `date_exp` is absent exactly when `auto_renew` is set.

pub mod agreement;
