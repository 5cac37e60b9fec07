//! Relative "time ago" labels for notification lists.

use chrono::{DateTime, Utc};

use crate::types::language::Language;

/// Formats how long ago `created_at` was, relative to `now`.
///
/// Timestamps in the future (clock skew) read as "just now". Anything older
/// than 30 days is shown as a calendar date.
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>, language: Language) -> String {
    let seconds = (now - created_at).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    match language {
        Language::En => {
            if seconds < 60 {
                "just now".to_string()
            } else if minutes < 60 {
                format!("{minutes} min ago")
            } else if hours < 24 {
                format!("{hours} h ago")
            } else if days < 30 {
                format!("{days} d ago")
            } else {
                created_at.format("%Y-%m-%d").to_string()
            }
        }
        Language::Ar => {
            if seconds < 60 {
                "الآن".to_string()
            } else if minutes < 60 {
                format!("منذ {minutes} دقيقة")
            } else if hours < 24 {
                format!("منذ {hours} ساعة")
            } else if days < 30 {
                format!("منذ {days} يوم")
            } else {
                created_at.format("%Y-%m-%d").to_string()
            }
        }
    }
}
