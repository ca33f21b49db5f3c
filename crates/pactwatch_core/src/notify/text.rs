//! Localized wording of user-facing notices.

use crate::notify::{Notification, NotificationKind};
use crate::view::row::DisplayLocale;

/// Every notice the core raises, with the values its text interpolates.
///
/// Failure variants carry the rendered error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ExpiringAlert { count: usize },
    Created,
    CreateFailed(String),
    Edited { no: u32 },
    EditFailed(String),
    Deleted,
    DeleteFailed(String),
    LoadFailed(String),
    ScanFailed(String),
}

impl Notice {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::ExpiringAlert { .. } => NotificationKind::Warning,
            Self::Created | Self::Edited { .. } | Self::Deleted => NotificationKind::Success,
            Self::CreateFailed(_)
            | Self::EditFailed(_)
            | Self::DeleteFailed(_)
            | Self::LoadFailed(_)
            | Self::ScanFailed(_) => NotificationKind::Danger,
        }
    }

    pub fn title(&self, locale: DisplayLocale) -> &'static str {
        match (self, locale) {
            (Self::ExpiringAlert { .. }, DisplayLocale::Ru) => "Внимание!",
            (Self::ExpiringAlert { .. }, DisplayLocale::En) => "Attention!",
            (Self::Created | Self::CreateFailed(_), DisplayLocale::Ru) => "Новый договор",
            (Self::Created | Self::CreateFailed(_), DisplayLocale::En) => "New agreement",
            (Self::LoadFailed(_) | Self::ScanFailed(_), DisplayLocale::Ru) => "Проверка сроков",
            (Self::LoadFailed(_) | Self::ScanFailed(_), DisplayLocale::En) => "Expiration check",
            (_, DisplayLocale::Ru) => "Договор",
            (_, DisplayLocale::En) => "Agreement",
        }
    }

    pub fn message(&self, locale: DisplayLocale) -> String {
        match locale {
            DisplayLocale::Ru => match self {
                Self::ExpiringAlert { count } => format!("У вас {count} просроченных договоров"),
                Self::Created => "Добавлен новый договор".to_string(),
                Self::CreateFailed(err) => format!("Ошибка добавления: {err}"),
                Self::Edited { no } => format!("Договор {no} был отредактирован!"),
                Self::EditFailed(err) => format!("Ошибка редактирования: {err}"),
                Self::Deleted => "Договор был удален!".to_string(),
                Self::DeleteFailed(err) => format!("Ошибка удаления: {err}"),
                Self::LoadFailed(err) => format!("Не удалось загрузить договоры: {err}"),
                Self::ScanFailed(err) => format!("Не удалось обновить сроки действия: {err}"),
            },
            DisplayLocale::En => match self {
                Self::ExpiringAlert { count } => {
                    format!("You have {count} expired or expiring agreements")
                }
                Self::Created => "New agreement added".to_string(),
                Self::CreateFailed(err) => format!("Failed to add: {err}"),
                Self::Edited { no } => format!("Agreement {no} was edited"),
                Self::EditFailed(err) => format!("Failed to edit: {err}"),
                Self::Deleted => "Agreement deleted".to_string(),
                Self::DeleteFailed(err) => format!("Failed to delete: {err}"),
                Self::LoadFailed(err) => format!("Failed to load agreements: {err}"),
                Self::ScanFailed(err) => format!("Failed to update expiration flags: {err}"),
            },
        }
    }

    pub fn to_notification(&self, locale: DisplayLocale) -> Notification {
        Notification::new(self.kind(), self.title(locale), self.message(locale))
    }
}

#[cfg(test)]
mod tests {
    use super::Notice;
    use crate::notify::NotificationKind;
    use crate::view::row::DisplayLocale;

    #[test]
    fn alert_is_worded_per_locale() {
        let alert = Notice::ExpiringAlert { count: 4 };

        let ru = alert.to_notification(DisplayLocale::Ru);
        assert_eq!(ru.kind, NotificationKind::Warning);
        assert_eq!(ru.title, "Внимание!");
        assert_eq!(ru.message, "У вас 4 просроченных договоров");

        let en = alert.to_notification(DisplayLocale::En);
        assert_eq!(en.title, "Attention!");
        assert_eq!(en.message, "You have 4 expired or expiring agreements");
    }

    #[test]
    fn failures_are_danger_and_quote_the_error() {
        let notice = Notice::DeleteFailed("agreement store unavailable".to_string());
        let notification = notice.to_notification(DisplayLocale::Ru);

        assert_eq!(notification.kind, NotificationKind::Danger);
        assert_eq!(notification.title, "Договор");
        assert_eq!(
            notification.message,
            "Ошибка удаления: agreement store unavailable"
        );
    }

    #[test]
    fn mutation_titles_group_by_form() {
        assert_eq!(Notice::Created.title(DisplayLocale::En), "New agreement");
        assert_eq!(Notice::Edited { no: 7 }.title(DisplayLocale::En), "Agreement");
        assert_eq!(
            Notice::ScanFailed(String::new()).title(DisplayLocale::Ru),
            "Проверка сроков"
        );
        assert_eq!(
            Notice::Edited { no: 7 }.message(DisplayLocale::Ru),
            "Договор 7 был отредактирован!"
        );
    }
}
