//! Transient user-facing feedback produced by store operations.

use serde::Serialize;

use notihub_core::error::AppError;
use notihub_core::locale::FeedbackMessage;
use notihub_core::types::Language;

/// Severity of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// The operation went through.
    Success,
    /// The operation failed and was rolled back.
    Error,
}

/// A short message for the user, already localized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// Severity.
    pub level: FeedbackLevel,
    /// Localized text.
    pub message: String,
}

impl Feedback {
    /// A confirmation from the catalog.
    pub fn success(message: FeedbackMessage, language: Language) -> Self {
        Self {
            level: FeedbackLevel::Success,
            message: message.text(language).to_string(),
        }
    }

    /// An error message: the server's reason when it gave one, otherwise
    /// the localized `fallback`.
    pub fn from_error(err: &AppError, fallback: FeedbackMessage, language: Language) -> Self {
        let message = err
            .server_reason()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.text(language).to_string());
        Self {
            level: FeedbackLevel::Error,
            message,
        }
    }
}
