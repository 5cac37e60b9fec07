//! REST response shapes of the notification API.

use serde::{Deserialize, Serialize};

use super::notification::Notification;
use crate::error::AppError;
use crate::result::AppResult;

/// Body of `GET /notifications?language=…`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    /// Notifications, newest first.
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Server-side unread count.
    #[serde(default)]
    pub unread_count: usize,
}

/// Body returned by every mutating endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    /// Whether the server applied the change.
    #[serde(default)]
    pub success: bool,
    /// Reason given when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiAck {
    /// A successful acknowledgement.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A refusal carrying a reason.
    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }

    /// Converts the acknowledgement into a result for `operation`.
    ///
    /// A refusal with a reason becomes [`AppError::rejected`] so the reason
    /// can be shown to the user; one without becomes an external-service error.
    pub fn into_result(self, operation: &str) -> AppResult<()> {
        if self.success {
            return Ok(());
        }
        match self.error {
            Some(reason) if !reason.trim().is_empty() => Err(AppError::rejected(reason)),
            _ => Err(AppError::external_service(format!(
                "{operation} was not acknowledged by the server"
            ))),
        }
    }
}
