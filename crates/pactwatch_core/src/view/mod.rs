//! List view model for the agreements table.
//!
//! # Responsibility
//! - Project stored agreements into display rows (`row`).
//! - Filter rows by EGRPOU substring and sort them (`list_view`, `sort`).
//! - Provide numeric-aware, locale-ordered text comparison (`collation`).
//!
//! # Invariants
//! - Every function here is pure and synchronous; nothing performs I/O.
//! - Inputs are never mutated; each recompute yields a fresh row list.

pub mod collation;
pub mod list_view;
pub mod row;
pub mod sort;
