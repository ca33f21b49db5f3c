//! One-shot expiring-agreements alert.
//!
//! # Invariants
//! - At most one alert per gate. A gate lives exactly as long as its
//!   session; starting a new session is the only reset.
//! - The alert carries the first positive count observed; later counts,
//!   zero or not, are ignored.

use crate::notify::text::Notice;
use crate::notify::Notification;
use crate::view::row::DisplayLocale;
use log::info;

#[derive(Debug, Default)]
pub struct ExpiryAlertGate {
    locale: DisplayLocale,
    fired: bool,
}

impl ExpiryAlertGate {
    /// An armed gate wording its alert for `locale`.
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            locale,
            fired: false,
        }
    }

    /// Feeds the latest expiring count; returns the alert the first time it
    /// is positive.
    pub fn observe(&mut self, expiring_count: usize) -> Option<Notification> {
        if self.fired || expiring_count == 0 {
            return None;
        }
        self.fired = true;
        info!("event=expiry_alert module=notify status=ok expiring={expiring_count}");
        Some(
            Notice::ExpiringAlert {
                count: expiring_count,
            }
            .to_notification(self.locale),
        )
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::ExpiryAlertGate;
    use crate::notify::NotificationKind;
    use crate::view::row::DisplayLocale;

    #[test]
    fn fires_once_with_first_positive_count() {
        let mut gate = ExpiryAlertGate::new(DisplayLocale::En);

        let alerts: Vec<_> = [0, 3, 0, 5]
            .into_iter()
            .filter_map(|count| gate.observe(count))
            .collect();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, NotificationKind::Warning);
        assert!(alerts[0].message.contains('3'));
        assert!(!alerts[0].message.contains('5'));
        assert!(gate.has_fired());
    }

    #[test]
    fn zero_counts_keep_the_gate_armed() {
        let mut gate = ExpiryAlertGate::default();
        assert!(gate.observe(0).is_none());
        assert!(gate.observe(0).is_none());
        assert!(!gate.has_fired());
    }

    #[test]
    fn default_gate_alerts_in_russian() {
        let mut gate = ExpiryAlertGate::default();
        let alert = gate.observe(2).unwrap();
        assert_eq!(alert.title, "Внимание!");
        assert_eq!(alert.message, "У вас 2 просроченных договоров");
    }
}
