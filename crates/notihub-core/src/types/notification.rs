//! The notification record held by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::NotificationId;

/// Visual category of a notification. Affects icon and color only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// Something completed successfully.
    Success,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
}

impl NotificationKind {
    /// Short glyph used by terminal renderers.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }
}

/// Content type a notification points at. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedKind {
    /// A published article.
    Article,
    /// A playlist episode.
    Episode,
    /// A playlist season.
    Season,
    /// A playlist.
    Playlist,
    /// A team member page.
    Team,
    /// Any tag this client does not know yet.
    #[serde(other)]
    Other,
}

/// Title and message projected into the current display language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Display title.
    pub title: String,
    /// Display body.
    pub message: String,
}

/// A notification as received from the REST API or the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Server-issued identifier, stable across updates.
    #[serde(alias = "_id")]
    pub id: NotificationId,
    /// Base-language title.
    pub title: String,
    /// Base-language body.
    pub message: String,
    /// Secondary-language title.
    #[serde(default, alias = "titleEn", skip_serializing_if = "Option::is_none")]
    pub title_alt: Option<String>,
    /// Secondary-language body.
    #[serde(default, alias = "messageEn", skip_serializing_if = "Option::is_none")]
    pub message_alt: Option<String>,
    /// Visual category.
    #[serde(default, alias = "type")]
    pub kind: NotificationKind,
    /// Whether the user has read it.
    #[serde(default)]
    pub is_read: bool,
    /// Optional navigation target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Optional referenced content type.
    #[serde(default, alias = "relatedType", skip_serializing_if = "Option::is_none")]
    pub related_kind: Option<RelatedKind>,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Projection for the current language, recomputed by the store.
    #[serde(default, skip_deserializing)]
    pub localized: LocalizedText,
}

impl Notification {
    /// Creates an unread `info` notification with only base-language text.
    pub fn new(
        id: impl Into<NotificationId>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let message = message.into();
        Self {
            id: id.into(),
            localized: LocalizedText {
                title: title.clone(),
                message: message.clone(),
            },
            title,
            message,
            title_alt: None,
            message_alt: None,
            kind: NotificationKind::Info,
            is_read: false,
            action_url: None,
            related_kind: None,
            created_at: Utc::now(),
        }
    }

    /// Adds secondary-language text.
    #[must_use]
    pub fn with_alt(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.title_alt = Some(title.into());
        self.message_alt = Some(message.into());
        self
    }

    /// Sets the visual category.
    #[must_use]
    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the navigation target.
    #[must_use]
    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Marks the record as already read.
    #[must_use]
    pub fn read(mut self) -> Self {
        self.is_read = true;
        self
    }
}
