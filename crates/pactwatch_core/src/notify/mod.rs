//! Outbound user notifications.
//!
//! # Responsibility
//! - Define the toast-style notification shape emitted by the core.
//! - Provide sinks: an in-memory queue for UI polling/tests and a log sink.
//! - Gate the expiring-agreements alert to once per session (`gate`).
//! - Word every notice for the display locale (`text`).

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

pub mod gate;
pub mod text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
    Warning,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Receiver of user-facing notifications.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}

/// In-memory notification queue, drained by the presentation layer.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<Vec<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns queued notifications, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: &Notification) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}

/// Writes notifications to the log only (headless runs).
///
/// Only kind and title are logged; messages may carry record text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Danger => warn!(
                "event=notify module=notify status=ok kind={} title={:?}",
                notification.kind.as_str(),
                notification.title
            ),
            _ => info!(
                "event=notify module=notify status=ok kind={} title={:?}",
                notification.kind.as_str(),
                notification.title
            ),
        }
    }
}
