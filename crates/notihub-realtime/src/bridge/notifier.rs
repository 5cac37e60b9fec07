//! Terminal and log implementations of [`NativeNotifier`].

use std::sync::Mutex;

use dashmap::DashSet;
use tracing::info;

use notihub_core::traits::notifier::{NativeNotification, NativeNotifier, Permission};

/// Prints notifications to stdout, at most once per tag.
///
/// Starts undecided; a permission request resolves to the configured answer.
#[derive(Debug)]
pub struct ConsoleNotifier {
    permission: Mutex<Permission>,
    answer: Permission,
    shown: DashSet<String>,
}

impl ConsoleNotifier {
    /// Create a notifier that answers permission requests with `answer`.
    pub fn new(answer: Permission) -> Self {
        Self {
            permission: Mutex::new(Permission::Default),
            answer,
            shown: DashSet::new(),
        }
    }

    /// Number of distinct tags printed so far.
    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }
}

impl NativeNotifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock().unwrap_or_else(|e| e.into_inner());
        if *permission == Permission::Default {
            *permission = self.answer;
        }
        *permission
    }

    fn show(&self, notification: &NativeNotification) {
        if !self.shown.insert(notification.tag.clone()) {
            return;
        }
        println!("🔔 {}: {}", notification.title, notification.body);
        if let Some(url) = &notification.action_url {
            println!("   {url}");
        }
    }
}

/// Logs notifications through `tracing`. Always permitted.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NativeNotifier for TracingNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, notification: &NativeNotification) {
        info!(
            tag = %notification.tag,
            title = %notification.title,
            body = %notification.body,
            action_url = ?notification.action_url,
            "Native notification"
        );
    }
}
