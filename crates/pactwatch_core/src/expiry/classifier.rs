//! Rolling-window expiry classifier.
//!
//! "Expiring soon" and "already expired" share one flag: anything ending in
//! fewer than `EXPIRING_WINDOW_DAYS` days, past dates included, is flagged.

use crate::model::agreement::Agreement;
use chrono::NaiveDate;

/// Agreements ending within this many days are flagged.
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Signed whole days from `today` until `date_exp` (negative when past).
pub fn days_until(date_exp: NaiveDate, today: NaiveDate) -> i64 {
    date_exp.signed_duration_since(today).num_days()
}

/// Computes the expiry flag for `agreement` as of `today`.
///
/// Returns `None` when there is no expiration date to judge; callers must
/// then keep the stored flag untouched.
pub fn classify(agreement: &Agreement, today: NaiveDate) -> Option<bool> {
    if agreement.auto_renew {
        return Some(false);
    }
    let date_exp = agreement.date_exp?;
    Some(days_until(date_exp, today) < EXPIRING_WINDOW_DAYS)
}

/// Flag the agreement should carry after classification.
pub fn effective_flag(agreement: &Agreement, today: NaiveDate) -> bool {
    classify(agreement, today).unwrap_or(agreement.expired)
}

#[cfg(test)]
mod tests {
    use super::{classify, days_until, effective_flag};
    use crate::model::agreement::{Agreement, AgreementDraft};
    use chrono::{Days, NaiveDate, TimeDelta};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    fn expiring_in(days: i64) -> Agreement {
        let date_exp = today() + TimeDelta::days(days);
        let draft = AgreementDraft::new(1, today(), "R-1", "Acme", "12345678", date_exp);
        Agreement::new(draft).unwrap()
    }

    #[test]
    fn window_boundary_is_closed_on_the_current_side() {
        assert_eq!(classify(&expiring_in(29), today()), Some(true));
        assert_eq!(classify(&expiring_in(30), today()), Some(false));
        assert_eq!(classify(&expiring_in(365), today()), Some(false));
    }

    #[test]
    fn past_and_same_day_expirations_are_flagged() {
        assert_eq!(classify(&expiring_in(0), today()), Some(true));
        assert_eq!(classify(&expiring_in(-400), today()), Some(true));
    }

    #[test]
    fn auto_renew_is_never_expiring() {
        let mut agreement = expiring_in(-5);
        agreement.auto_renew = true;
        assert_eq!(classify(&agreement, today()), Some(false));

        agreement.date_exp = None;
        agreement.expired = true;
        assert_eq!(classify(&agreement, today()), Some(false));
    }

    #[test]
    fn missing_expiration_date_keeps_stored_flag() {
        let mut agreement = expiring_in(10);
        agreement.date_exp = None;
        agreement.expired = true;

        assert_eq!(classify(&agreement, today()), None);
        assert!(effective_flag(&agreement, today()));
    }

    #[test]
    fn result_rolls_with_the_evaluation_day() {
        let agreement = expiring_in(45);
        let later = today().checked_add_days(Days::new(16)).unwrap();

        assert_eq!(classify(&agreement, today()), Some(false));
        assert_eq!(classify(&agreement, later), Some(true));
    }

    #[test]
    fn days_until_counts_leap_days() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(days_until(to, from), 29);
        assert_eq!(days_until(from, to), -29);
    }
}
