//! Mirrors newly ingested unread notifications to the native surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use notihub_core::traits::notifier::{NativeNotification, NativeNotifier, Permission};
use notihub_core::types::Notification;

use crate::notification::observer::StoreObserver;

/// Permission-gated bridge to a [`NativeNotifier`].
#[derive(Debug)]
pub struct NativeBridge {
    notifier: Arc<dyn NativeNotifier>,
    enabled: bool,
    requested: AtomicBool,
}

impl NativeBridge {
    /// Create a bridge. A disabled bridge never prompts and never shows.
    pub fn new(notifier: Arc<dyn NativeNotifier>, enabled: bool) -> Self {
        Self {
            notifier,
            enabled,
            requested: AtomicBool::new(false),
        }
    }

    /// Ask for permission if the user has not decided yet.
    ///
    /// Prompts at most once per bridge, and never when a decision exists.
    pub fn init(&self) -> Permission {
        let current = self.notifier.permission();
        if !self.enabled || current != Permission::Default {
            return current;
        }
        if self.requested.swap(true, Ordering::SeqCst) {
            return current;
        }
        let answer = self.notifier.request_permission();
        info!(permission = ?answer, "Native notification permission requested");
        answer
    }

    /// Show `record` natively if permission is granted.
    pub fn mirror(&self, record: &Notification) -> bool {
        if !self.enabled || record.is_read {
            return false;
        }
        if self.notifier.permission() != Permission::Granted {
            debug!(id = %record.id, "Native notifications not permitted");
            return false;
        }
        self.notifier.show(&NativeNotification {
            tag: record.id.to_string(),
            title: record.localized.title.clone(),
            body: record.localized.message.clone(),
            action_url: record.action_url.clone(),
        });
        true
    }
}

impl StoreObserver for NativeBridge {
    fn on_ingest(&self, record: &Notification) {
        self.mirror(record);
    }
}
