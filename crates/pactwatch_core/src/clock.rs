//! Source of "today" for expiry classification.
//!
//! The classifier never reads a wall clock; sessions ask a `Clock` once per
//! scan and pass the resulting day down explicitly.

use chrono::{Local, NaiveDate};

/// Provides the current calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
