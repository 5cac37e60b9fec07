//! Picks the display title and message for the current language.

use crate::types::language::Language;
use crate::types::notification::{LocalizedText, Notification};

/// Projects a record's base/alternate fields into `current`.
///
/// Base fields are used when `current` is the base language. Otherwise each
/// alternate field is used when present and non-blank, falling back to the
/// base field on its own.
pub fn project(record: &Notification, current: Language, base: Language) -> LocalizedText {
    if current == base {
        return LocalizedText {
            title: record.title.clone(),
            message: record.message.clone(),
        };
    }

    LocalizedText {
        title: pick(record.title_alt.as_deref(), &record.title),
        message: pick(record.message_alt.as_deref(), &record.message),
    }
}

fn pick(alternate: Option<&str>, base: &str) -> String {
    match alternate {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => base.to_string(),
    }
}
