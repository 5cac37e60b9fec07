//! Generic user-facing feedback texts in both supported languages.

use crate::types::language::Language;

/// A feedback message shown after a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackMessage {
    /// Loading the notification list failed.
    FetchFailed,
    /// Marking one notification as read failed.
    MarkReadFailed,
    /// Marking every notification as read failed.
    MarkAllReadFailed,
    /// Deleting a notification failed.
    DeleteFailed,
    /// A notification was deleted.
    Deleted,
}

impl FeedbackMessage {
    /// Returns the text for `language`.
    pub fn text(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::FetchFailed, Language::Ar) => "تعذر تحميل الإشعارات",
            (Self::FetchFailed, Language::En) => "Failed to load notifications",
            (Self::MarkReadFailed, Language::Ar) => "تعذر تحديد الإشعار كمقروء",
            (Self::MarkReadFailed, Language::En) => "Failed to mark notification as read",
            (Self::MarkAllReadFailed, Language::Ar) => "تعذر تحديد جميع الإشعارات كمقروءة",
            (Self::MarkAllReadFailed, Language::En) => "Failed to mark all notifications as read",
            (Self::DeleteFailed, Language::Ar) => "تعذر حذف الإشعار",
            (Self::DeleteFailed, Language::En) => "Failed to delete notification",
            (Self::Deleted, Language::Ar) => "تم حذف الإشعار",
            (Self::Deleted, Language::En) => "Notification deleted",
        }
    }
}
