//! Native (OS or browser) notification surface.

use serde::{Deserialize, Serialize};

/// Permission state of the native notification surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The user has not decided yet.
    #[default]
    Default,
    /// Notifications may be shown.
    Granted,
    /// Notifications must not be shown.
    Denied,
}

/// A native notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeNotification {
    /// De-duplication tag; the surface shows at most one popup per tag.
    pub tag: String,
    /// Localized title.
    pub title: String,
    /// Localized body.
    pub body: String,
    /// Optional navigation target.
    pub action_url: Option<String>,
}

/// A surface able to display native notifications.
pub trait NativeNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Current permission state.
    fn permission(&self) -> Permission;

    /// Ask the user for permission and return the resulting state.
    fn request_permission(&self) -> Permission;

    /// Display a notification. Only called while permission is granted.
    fn show(&self, notification: &NativeNotification);
}
